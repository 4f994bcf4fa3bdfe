//! Localization error types

use crate::client::ClientError;
use thiserror::Error;

/// Errors that can occur while loading localized content
#[derive(Error, Debug)]
pub enum ContentError {
    /// Backend request failed
    #[error("Content request failed: {0}")]
    Client(#[from] ClientError),

    /// Source returned something unusable
    #[error("Invalid content: {0}")]
    Invalid(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unknown content type: {0}")]
    UnknownContentType(String),
}
