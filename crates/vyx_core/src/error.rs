use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::{TransportError, ValidationError};

/// User-facing failure taxonomy. Every terminal non-success state and every
/// handoff problem is expressed as one of these before it reaches a view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
        body: Option<Value>,
    },
    #[error("{message}")]
    Application { message: String },
    #[error("Request was cancelled.")]
    Cancelled,
    #[error(
        "Request timed out after {}. The video may be too long or the server is busy. Please try again.",
        describe_budget(.budget)
    )]
    TimedOut { budget: Duration },
    #[error("No data found. Please generate content first.")]
    StaleResult,
}

impl JobError {
    /// Whether the retained request may be resubmitted as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Application { .. } | Self::Cancelled | Self::TimedOut { .. }
        )
    }
}

impl From<TransportError> for JobError {
    fn from(err: TransportError) -> Self {
        let message = match err.status() {
            Some(code) => format!("Server error: {code}"),
            None => format!("Network error: {}", err.message),
        };
        Self::Transport {
            status: err.status(),
            message,
            body: err.body,
        }
    }
}

fn describe_budget(budget: &Duration) -> String {
    let secs = budget.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (minutes, 0) => format!("{minutes} minutes"),
        _ => format!("{secs} seconds"),
    }
}
