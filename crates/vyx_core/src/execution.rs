use std::time::Duration;

use serde_json::Value;
use vyx_logging::{vyx_debug, vyx_warn};

use crate::schedule::{AnimationSlot, ProgressSnapshot, StagePlan};
use crate::{JobError, JobRequest, ResultPayload, TransportOutcome};

pub type ExecutionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
    Cancelled,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Why the shared cancellation token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    User,
    Timeout,
}

/// In-flight state of one submitted job.
///
/// Time only enters through [`JobExecution::observe`], so the same clock
/// readings drive elapsed seconds, stage selection and the timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct JobExecution {
    id: ExecutionId,
    request: JobRequest,
    started_at: Duration,
    budget: Duration,
    elapsed: Duration,
    status: JobStatus,
    cancel_reason: Option<CancelReason>,
    error: Option<JobError>,
    animation: AnimationSlot,
}

impl JobExecution {
    pub fn new(
        id: ExecutionId,
        request: JobRequest,
        started_at: Duration,
        budget: Duration,
        animation: AnimationSlot,
    ) -> Self {
        Self {
            id,
            request,
            started_at,
            budget,
            elapsed: Duration::ZERO,
            status: JobStatus::Pending,
            cancel_reason: None,
            error: None,
            animation,
        }
    }

    pub fn id(&self) -> ExecutionId {
        self.id
    }

    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancel_reason
    }

    pub fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    pub fn animation(&self) -> &AnimationSlot {
        &self.animation
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Feeds a clock reading. Returns true if this reading expired the budget.
    /// Terminal executions ignore readings, which freezes elapsed time.
    pub fn observe(&mut self, now: Duration) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let elapsed = now.saturating_sub(self.started_at);
        if elapsed > self.elapsed {
            self.elapsed = elapsed;
        }
        if self.elapsed >= self.budget {
            return self.finish(
                JobStatus::TimedOut,
                Some(CancelReason::Timeout),
                Some(JobError::TimedOut {
                    budget: self.budget,
                }),
            );
        }
        false
    }

    /// User-initiated cancellation.
    pub fn cancel(&mut self) -> bool {
        self.finish(
            JobStatus::Cancelled,
            Some(CancelReason::User),
            Some(JobError::Cancelled),
        )
    }

    pub fn succeed(&mut self) -> bool {
        self.finish(JobStatus::Succeeded, None, None)
    }

    pub fn fail(&mut self, error: JobError) -> bool {
        self.finish(JobStatus::Failed, None, Some(error))
    }

    /// Applies the transport's verdict. Returns the payload to hand off when
    /// this call moved the execution to `Succeeded`.
    pub fn resolve(&mut self, outcome: TransportOutcome) -> Option<Value> {
        match outcome {
            TransportOutcome::Response(ResultPayload::Success(payload)) => {
                self.succeed().then_some(payload)
            }
            TransportOutcome::Response(ResultPayload::ApplicationError { message }) => {
                self.fail(JobError::Application { message });
                None
            }
            TransportOutcome::Failed(err) => {
                self.fail(err.into());
                None
            }
            TransportOutcome::TimedOut | TransportOutcome::Aborted(Some(CancelReason::Timeout)) => {
                self.finish(
                    JobStatus::TimedOut,
                    Some(CancelReason::Timeout),
                    Some(JobError::TimedOut {
                        budget: self.budget,
                    }),
                );
                None
            }
            TransportOutcome::Aborted(_) => {
                self.cancel();
                None
            }
        }
    }

    pub fn progress(&self, plan: &StagePlan) -> ProgressSnapshot {
        let elapsed_secs = self.elapsed_secs();
        let (stage_index, stage) = plan.stage_at(elapsed_secs);
        let animation_index = self.animation.index_at(elapsed_secs);
        ProgressSnapshot {
            elapsed_secs,
            remaining_secs: self.budget.saturating_sub(self.elapsed).as_secs(),
            stage_index,
            stage_count: plan.len(),
            stage_label: stage.label.clone(),
            stage_description: stage.description.clone(),
            animation_index,
            animation_id: self.animation.order()[animation_index].clone(),
        }
    }

    fn finish(
        &mut self,
        status: JobStatus,
        reason: Option<CancelReason>,
        error: Option<JobError>,
    ) -> bool {
        if self.status.is_terminal() {
            vyx_warn!(
                "execution {} already {:?}; ignoring transition to {:?}",
                self.id,
                self.status,
                status
            );
            return false;
        }
        vyx_debug!(
            "execution {} -> {:?} after {}s",
            self.id,
            status,
            self.elapsed_secs()
        );
        self.status = status;
        self.cancel_reason = reason;
        self.error = error;
        true
    }
}
