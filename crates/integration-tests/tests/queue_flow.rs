//! End-to-end queue scenarios through the session adapter
//!
//! Every notice here is read back from a member's session inbox, the same
//! way a polling client would see it.

mod common;

use common::{displays, is_transfer, notices, texts, Harness, QUEUE};
use queuegate_core::application::{
    DrainOutcome, JoinOutcome, QueueServiceConfig, StaleHeadPolicy,
};
use queuegate_core::port::Notice;
use queuegate_infra_session::Outbound;
use std::time::Duration;
use tokio_test::assert_ok;

fn overtaken(frames: &[Outbound]) -> usize {
    notices(frames)
        .iter()
        .filter(|n| matches!(n, Notice::Overtaken { .. }))
        .count()
}

#[tokio::test]
async fn test_priority_join_reorders_and_warns_members_behind() {
    let h = Harness::new();
    assert_ok!(h.service.pause(QUEUE).await);

    let (_, alice) = h.join(QUEUE, "alice", 1).await;
    let (_, bob) = h.join(QUEUE, "bob", 1).await;
    h.frames(&alice);
    h.frames(&bob);

    let (_, carol) = h.join(QUEUE, "carol", 5).await;

    assert_eq!(h.order(QUEUE).await, vec!["carol", "alice", "bob"]);
    assert_eq!(
        h.service.describe(QUEUE).await,
        "1 - carol\n2 - alice\n3 - bob"
    );

    let alice_frames = h.frames(&alice);
    let bob_frames = h.frames(&bob);
    assert_eq!(overtaken(&alice_frames), 1);
    assert_eq!(overtaken(&bob_frames), 1);
    assert!(texts(&alice_frames)
        .contains(&"Someone with a higher rank has joined the survival queue.".to_string()));
    assert!(displays(&alice_frames).contains(&(Some(2), 3)));
    assert!(displays(&bob_frames).contains(&(Some(3), 3)));

    assert_eq!(overtaken(&h.frames(&carol)), 0);
}

#[tokio::test]
async fn test_join_into_active_queue_transfers_through_proxy() {
    let h = Harness::new();

    let (alice_member, alice) = h.connect("alice", 1);
    let outcome = assert_ok!(h.service.join(QUEUE, alice_member, &alice).await);
    assert_eq!(outcome, JoinOutcome::Joined { rank: 1, total: 1 });

    let frames = h.wait_for_frame(&alice, is_transfer).await;
    assert!(frames.contains(&Outbound::Transfer {
        destination: QUEUE.to_string()
    }));
    assert!(h.order(QUEUE).await.is_empty());
    assert!(!h.service.has_notifier(QUEUE, &alice.member_id));
}

#[tokio::test]
async fn test_resume_transfers_one_and_promotes_next() {
    let h = Harness::new();
    assert_ok!(h.service.pause(QUEUE).await);
    let (_, alice) = h.join(QUEUE, "alice", 1).await;
    let (_, bob) = h.join(QUEUE, "bob", 1).await;

    assert!(assert_ok!(h.service.resume(QUEUE).await));

    h.wait_for_frame(&alice, is_transfer).await;
    assert_eq!(h.order(QUEUE).await, vec!["bob"]);

    let bob_frames = h.frames(&bob);
    assert!(texts(&bob_frames).contains(&"The survival queue has been unpaused.".to_string()));
    assert!(texts(&bob_frames).contains(&"You are now first in line for survival.".to_string()));
    assert!(!bob_frames.iter().any(is_transfer));
}

#[tokio::test]
async fn test_pause_announcement_reaches_connected_members() {
    let h = Harness::with_policy(StaleHeadPolicy::Hold);
    assert_ok!(h.service.pause(QUEUE).await);
    let (_, dave) = h.join(QUEUE, "dave", 9).await;
    h.sessions.disconnect(&dave);

    // Offline head keeps the active queue from draining
    assert_ok!(h.service.resume(QUEUE).await);
    let (_, bob) = h.join(QUEUE, "bob", 1).await;
    let (_, carol) = h.join(QUEUE, "carol", 1).await;
    assert_eq!(h.order(QUEUE).await, vec!["dave", "bob", "carol"]);

    assert!(assert_ok!(h.service.pause(QUEUE).await));
    assert!(!assert_ok!(h.service.pause(QUEUE).await));

    for handle in [&bob, &carol] {
        let paused = texts(&h.frames(handle))
            .iter()
            .filter(|t| t.as_str() == "The survival queue has been paused.")
            .count();
        assert_eq!(paused, 2);
    }
}

#[tokio::test]
async fn test_disconnected_head_holds_until_reconnect() {
    let h = Harness::with_policy(StaleHeadPolicy::Hold);
    assert_ok!(h.service.pause(QUEUE).await);
    let (alice_member, alice) = h.join(QUEUE, "alice", 1).await;
    let (_, bob) = h.join(QUEUE, "bob", 1).await;

    assert!(h.sessions.disconnect(&alice));
    assert_ok!(h.service.resume(QUEUE).await);

    assert_eq!(h.order(QUEUE).await, vec!["alice", "bob"]);
    assert_eq!(
        h.service.drain(QUEUE).await,
        DrainOutcome::Stalled(alice_member.id)
    );
    assert!(!h.frames(&bob).iter().any(is_transfer));

    let alice_again = h.sessions.connect(alice_member.id, "alice");
    assert_eq!(
        h.service.drain(QUEUE).await,
        DrainOutcome::Transferred(alice_member)
    );
    h.wait_for_frame(&alice_again, is_transfer).await;
    assert_eq!(h.order(QUEUE).await, vec!["bob"]);
}

#[tokio::test]
async fn test_drop_policy_skips_disconnected_head() {
    let h = Harness::with_policy(StaleHeadPolicy::Drop);
    assert_ok!(h.service.pause(QUEUE).await);
    let (alice_member, alice) = h.join(QUEUE, "alice", 1).await;
    let (_, bob) = h.join(QUEUE, "bob", 1).await;

    h.sessions.disconnect(&alice);
    assert_ok!(h.service.resume(QUEUE).await);

    h.wait_for_frame(&bob, is_transfer).await;
    assert!(h.order(QUEUE).await.is_empty());
    assert!(!h.service.has_notifier(QUEUE, &alice_member.id));
}

#[tokio::test]
async fn test_leave_clears_display_and_moves_others_up() {
    let h = Harness::new();
    assert_ok!(h.service.pause(QUEUE).await);
    let (alice_member, alice) = h.join(QUEUE, "alice", 1).await;
    let (_, bob) = h.join(QUEUE, "bob", 1).await;
    h.frames(&alice);
    h.frames(&bob);

    let outcome = assert_ok!(h.service.leave(QUEUE, &alice_member.id, &alice).await);
    assert_eq!(outcome, JoinOutcome::Left);

    let alice_frames = h.frames(&alice);
    assert!(texts(&alice_frames)
        .contains(&"You have left your queue position for survival.".to_string()));
    assert_eq!(displays(&alice_frames).last(), Some(&(None, 1)));

    let bob_frames = h.frames(&bob);
    assert!(displays(&bob_frames).contains(&(Some(1), 1)));
    assert_eq!(overtaken(&bob_frames), 0);
}

#[tokio::test(start_paused = true)]
async fn test_position_reported_every_interval_until_leave() {
    let h = Harness::with_config(QueueServiceConfig {
        notify_interval: Duration::from_secs(30),
        ..Default::default()
    });
    assert_ok!(h.service.pause(QUEUE).await);
    let (alice_member, alice) = h.join(QUEUE, "alice", 1).await;

    tokio::time::sleep(Duration::from_secs(61)).await;

    let positions: Vec<String> = texts(&h.frames(&alice))
        .into_iter()
        .filter(|t| t.starts_with("You are currently position"))
        .collect();
    assert_eq!(positions.len(), 3);
    assert!(positions
        .iter()
        .all(|t| t == "You are currently position #1 out of 1."));

    assert_ok!(h.service.leave(QUEUE, &alice_member.id, &alice).await);
    h.frames(&alice);
    tokio::time::sleep(Duration::from_secs(90)).await;

    assert!(notices(&h.frames(&alice))
        .iter()
        .all(|n| !matches!(n, Notice::Position { .. })));
}
