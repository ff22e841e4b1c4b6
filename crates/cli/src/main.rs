//! QueueGate CLI - Command-line interface for the QueueGate daemon
//! Connects a session, toggles queue membership and polls queue notices.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9530";

#[derive(Parser)]
#[command(name = "queuegate")]
#[command(about = "QueueGate admission queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "QUEUEGATE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

/// Identifies a live connection returned by `connect`
#[derive(Args)]
struct SessionArgs {
    /// Member ID
    #[arg(long = "member", env = "QUEUEGATE_MEMBER_ID")]
    member_id: String,

    /// Connection number
    #[arg(long = "connection", env = "QUEUEGATE_CONNECTION_ID")]
    connection_id: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a session (prints the IDs to export)
    Connect {
        /// Display name shown in queue listings
        name: String,

        /// Reuse an existing member ID (reconnect)
        #[arg(long = "member")]
        member_id: Option<String>,
    },

    /// Close a session
    Disconnect {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Join a queue, or leave it if already queued
    Join {
        /// Queue (destination server) name
        queue: String,

        /// Priority weight (higher = served sooner)
        #[arg(short, long, default_value = "0")]
        priority: i32,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Leave a queue
    Leave {
        queue: String,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Stop transfers out of a queue
    Pause { queue: String },

    /// Resume transfers out of a queue
    Resume { queue: String },

    /// Show a queue's current order
    Describe { queue: String },

    /// List every known queue
    List,

    /// Fetch pending notices for a session
    Poll {
        #[command(flatten)]
        session: SessionArgs,

        /// Keep polling until interrupted
        #[arg(short, long)]
        follow: bool,

        /// Seconds between polls with --follow
        #[arg(long, default_value = "2")]
        interval: u64,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct QueueRow {
    name: String,
    size: usize,
    state: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn session_params(session: &SessionArgs) -> serde_json::Value {
    json!({
        "member_id": session.member_id,
        "connection_id": session.connection_id,
    })
}

fn print_outcome(queue: &str, result: &serde_json::Value) {
    let outcome = &result["outcome"];
    match outcome["status"].as_str() {
        Some("JOINED") => println!(
            "{}",
            format!(
                "✓ Joined {} at position #{} of {}",
                queue, outcome["rank"], outcome["total"]
            )
            .green()
            .bold()
        ),
        Some("LEFT") => println!("{}", format!("✓ Left {}", queue).green().bold()),
        _ => println!("{}", format!("○ Not queued for {}", queue).yellow()),
    }
}

/// Print one polled frame; returns false if it was a transfer instruction
fn print_frame(frame: &serde_json::Value) -> bool {
    match frame["type"].as_str() {
        Some("message") => {
            println!("  {}", frame["text"].as_str().unwrap_or_default().cyan());
        }
        Some("queue_display") => {
            let queue = frame["queue"].as_str().unwrap_or_default();
            match frame["rank"].as_u64() {
                Some(rank) => println!(
                    "  {} {} #{} of {}",
                    "▌".bold(),
                    queue.bold(),
                    rank,
                    frame["total"]
                ),
                None => println!("  {} {} (cleared)", "▌".bold(), queue.bold()),
            }
        }
        Some("transfer") => {
            let destination = frame["destination"].as_str().unwrap_or_default();
            println!(
                "  {}",
                format!("→ Transferring to {}", destination).green().bold()
            );
            return false;
        }
        _ => println!("  {}", frame.to_string().dimmed()),
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Connect { name, member_id } => {
            let params = json!({
                "display_name": name,
                "member_id": member_id,
            });

            let result = call_rpc(&cli.rpc_url, "session.connect.v1", params).await?;

            println!("{}", "✓ Session connected".green().bold());
            println!();
            println!(
                "export QUEUEGATE_MEMBER_ID={}",
                result["member_id"].as_str().unwrap_or_default()
            );
            println!("export QUEUEGATE_CONNECTION_ID={}", result["connection_id"]);
        }

        Commands::Disconnect { session } => {
            let result =
                call_rpc(&cli.rpc_url, "session.disconnect.v1", session_params(&session)).await?;

            if result["disconnected"].as_bool().unwrap_or(false) {
                println!("{}", "✓ Session disconnected".green().bold());
            } else {
                println!("{}", "○ Session was not current".yellow());
            }
        }

        Commands::Join {
            queue,
            priority,
            session,
        } => {
            let mut params = session_params(&session);
            params["queue"] = json!(queue);
            params["priority_weight"] = json!(priority);

            let result = call_rpc(&cli.rpc_url, "queue.join.v1", params).await?;
            print_outcome(&queue, &result);
        }

        Commands::Leave { queue, session } => {
            let mut params = session_params(&session);
            params["queue"] = json!(queue);

            let result = call_rpc(&cli.rpc_url, "queue.leave.v1", params).await?;
            print_outcome(&queue, &result);
        }

        Commands::Pause { queue } => {
            let result = call_rpc(&cli.rpc_url, "queue.pause.v1", json!({ "queue": queue })).await?;

            if result["changed"].as_bool().unwrap_or(false) {
                println!("{}", format!("✓ Queue {} paused", queue).green().bold());
            } else {
                println!("{}", format!("○ Queue {} was already paused", queue).yellow());
            }
        }

        Commands::Resume { queue } => {
            let result =
                call_rpc(&cli.rpc_url, "queue.resume.v1", json!({ "queue": queue })).await?;

            if result["changed"].as_bool().unwrap_or(false) {
                println!("{}", format!("✓ Queue {} resumed", queue).green().bold());
            } else {
                println!("{}", format!("○ Queue {} was not paused", queue).yellow());
            }
        }

        Commands::Describe { queue } => {
            let result =
                call_rpc(&cli.rpc_url, "queue.describe.v1", json!({ "queue": queue })).await?;

            println!("{}", format!("Queue {}", queue).cyan().bold());
            println!();
            println!("{}", result["text"].as_str().unwrap_or_default());
        }

        Commands::List => {
            let result = call_rpc(&cli.rpc_url, "queue.list.v1", json!({})).await?;
            let rows: Vec<QueueRow> = serde_json::from_value(result["queues"].clone())?;

            if rows.is_empty() {
                println!("{}", "No queues".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::Poll {
            session,
            follow,
            interval,
        } => {
            let params = session_params(&session);
            let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

            loop {
                ticker.tick().await;
                let result = call_rpc(&cli.rpc_url, "session.poll.v1", params.clone()).await?;
                let frames = result["frames"].as_array().cloned().unwrap_or_default();

                let mut still_here = true;
                for frame in &frames {
                    still_here &= print_frame(frame);
                }

                if !follow || !still_here {
                    if frames.is_empty() && !follow {
                        println!("{}", "No pending notices".dimmed());
                    }
                    break;
                }
            }
        }
    }

    Ok(())
}
