//! Results view: reads the mailbox once.

use serde_json::Value;
use vyx_core::JobError;
use vyx_engine::Mailbox;
use vyx_logging::{vyx_info, vyx_warn};

/// Takes the stored payload out of `mailbox`.
///
/// The slot is cleared by the read, so a second call reports
/// [`JobError::StaleResult`]. An unreadable slot is reported the same way.
pub fn open_results(mailbox: &dyn Mailbox) -> Result<Value, JobError> {
    match mailbox.take() {
        Ok(Some(payload)) => {
            vyx_info!("results: loaded stored payload");
            Ok(payload)
        }
        Ok(None) => Err(JobError::StaleResult),
        Err(err) => {
            vyx_warn!("results: could not read stored payload: {}", err);
            Err(JobError::StaleResult)
        }
    }
}

/// Pretty-printed payload for the terminal.
pub fn format_results(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}
