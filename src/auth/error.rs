//! Authentication error types

use crate::client::ClientError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during login and guest migration
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Verification code must be {0} digits")]
    InvalidCode(usize),

    #[error("Verification code expired, request a new one")]
    CodeExpired,

    #[error("Please wait {seconds}s before requesting another code")]
    ResendCooldown { seconds: u64 },

    #[error("Not available at this step: {0}")]
    WrongStage(&'static str),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Backend error: {0}")]
    Client(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}
