//! Error types
//!
//! `ProposalError` covers programmer and configuration mistakes and is
//! returned to the caller. `NotifyError` never leaves the notification
//! dispatcher: it is logged and dropped there.

use thiserror::Error;

/// Result type alias for proposal operations
pub type ProposalResult<T> = Result<T, ProposalError>;

/// Errors surfaced to callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    /// Reveal has no messages to show
    #[error("Message list is empty: no stage to reveal")]
    OutOfRange,

    /// Theme name not recognised
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// Decline threshold must allow at least one decline
    #[error("Invalid decline threshold {0}: must be at least 1")]
    InvalidThreshold(u32),
}

/// Errors raised while delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Sink lacks a required setting
    #[error("Notification sink not configured: {key} is missing")]
    ConfigurationMissing { key: &'static str },

    /// Network or client failure
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },
}

impl NotifyError {
    /// Create a configuration missing error
    pub fn missing(key: &'static str) -> Self {
        Self::ConfigurationMissing { key }
    }

    /// Unconfigured sinks are expected; everything else is a real failure
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationMissing { .. })
    }
}
