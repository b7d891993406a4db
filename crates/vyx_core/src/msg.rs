use std::time::Duration;

use crate::{ExecutionId, TransportOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input.
    UrlChanged(String),
    /// User toggled one content type.
    OptionToggled(String),
    /// User submitted the form. `now` is a clock reading, `seed` drives the
    /// new execution's animation shuffle.
    SubmitClicked { now: Duration, seed: u64 },
    /// User asked to resubmit the last request after a failure.
    RetryClicked { now: Duration, seed: u64 },
    /// User cancelled the running job.
    CancelClicked,
    /// Periodic clock reading.
    Tick { now: Duration },
    /// The engine finished a submission.
    TransportResolved {
        execution_id: ExecutionId,
        outcome: TransportOutcome,
    },
}
