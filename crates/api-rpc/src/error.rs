//! RPC Error Types
//!
//! Maps application and session errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use queuegate_core::domain::MemberId;
use queuegate_core::error::AppError;
use queuegate_infra_session::SessionError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const THROTTLED: i32 = 4003;
    pub const SESSION_INVALID: i32 = 4004;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
    }
}

/// Convert SessionError to JSON-RPC ErrorObject
pub fn session_error(err: SessionError) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::SESSION_INVALID, err.to_string(), None::<()>)
}

pub fn throttled(member_id: &MemberId) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        format!(
            "Member {} is toggling queues too fast. Please slow down.",
            member_id
        ),
        None::<()>,
    )
}
