//! Notifier trait and error type

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while delivering a notification
///
/// Callers log these and carry on; a failed delivery never changes the
/// outcome of a check.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier is not configured: {0}")]
    NotConfigured(String),

    #[error("failed to send notification: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification endpoint returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Result type for notifier operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Delivers a plain-text message to a person
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in log events
    fn name(&self) -> &str;

    /// Sends `text`
    async fn notify(&self, text: &str) -> NotifyResult<()>;
}
