use serde_json::Value;

use crate::{CancelReason, ExecutionId, JobRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the request to the configured endpoint.
    Submit {
        execution_id: ExecutionId,
        request: JobRequest,
    },
    /// Fire the execution's cancellation token with `reason`.
    Abort {
        execution_id: ExecutionId,
        reason: CancelReason,
    },
    /// Put the payload in the result mailbox, replacing anything there.
    StoreResult { payload: Value },
    /// Show the results view.
    NavigateToResults,
}
