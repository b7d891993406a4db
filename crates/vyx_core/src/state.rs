use std::collections::BTreeSet;
use std::time::Duration;

use vyx_logging::{vyx_debug, vyx_info};

use crate::view_model::AppViewModel;
use crate::{
    CancelReason, Effect, ExecutionId, JobError, JobExecution, JobProfile, JobRequest, JobStatus,
    TransportOutcome,
};

/// What the controller is doing, from the form's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerPhase {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    TimedOut,
}

impl From<JobStatus> for ControllerPhase {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => ControllerPhase::Running,
            JobStatus::Succeeded => ControllerPhase::Succeeded,
            JobStatus::Failed => ControllerPhase::Failed,
            JobStatus::Cancelled => ControllerPhase::Cancelled,
            JobStatus::TimedOut => ControllerPhase::TimedOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    profile: JobProfile,
    url_input: String,
    selected: BTreeSet<String>,
    execution: Option<JobExecution>,
    last_request: Option<JobRequest>,
    last_error: Option<JobError>,
    next_execution_id: ExecutionId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(JobProfile::default())
    }
}

impl AppState {
    pub fn new(profile: JobProfile) -> Self {
        Self {
            profile,
            url_input: String::new(),
            selected: BTreeSet::new(),
            execution: None,
            last_request: None,
            last_error: None,
            next_execution_id: 1,
            dirty: false,
        }
    }

    pub fn profile(&self) -> &JobProfile {
        &self.profile
    }

    pub fn execution(&self) -> Option<&JobExecution> {
        self.execution.as_ref()
    }

    pub fn last_request(&self) -> Option<&JobRequest> {
        self.last_request.as_ref()
    }

    pub fn last_error(&self) -> Option<&JobError> {
        self.last_error.as_ref()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.execution
            .as_ref()
            .map_or(ControllerPhase::Idle, |execution| execution.status().into())
    }

    pub fn is_running(&self) -> bool {
        self.phase() == ControllerPhase::Running
    }

    pub fn view(&self) -> AppViewModel {
        let phase = self.phase();
        let progress = self
            .execution
            .as_ref()
            .filter(|_| phase == ControllerPhase::Running)
            .map(|execution| execution.progress(&self.profile.stages));
        AppViewModel {
            phase,
            url_input: self.url_input.clone(),
            selected_options: self.selected.iter().cloned().collect(),
            progress,
            error_message: self.last_error.as_ref().map(ToString::to_string),
            can_cancel: phase == ControllerPhase::Running,
            can_retry: self.retry_request().is_some(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the re-render flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn url_input(&self) -> &str {
        &self.url_input
    }

    pub(crate) fn selected_options(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        if self.url_input != text {
            self.url_input = text;
            if matches!(self.last_error, Some(JobError::Validation(_))) {
                self.last_error = None;
            }
            self.dirty = true;
        }
    }

    pub(crate) fn toggle_option(&mut self, id: String) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        if matches!(self.last_error, Some(JobError::Validation(_))) {
            self.last_error = None;
        }
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, error: JobError) {
        self.last_error = Some(error);
        self.dirty = true;
    }

    /// The request a retry would resubmit: the last one sent, and only once
    /// its execution ended in a retryable state.
    pub(crate) fn retry_request(&self) -> Option<JobRequest> {
        match self.phase() {
            ControllerPhase::Failed | ControllerPhase::Cancelled | ControllerPhase::TimedOut => {
                self.last_request.clone()
            }
            _ => None,
        }
    }

    /// Replaces the current execution with a fresh one. A still-pending
    /// predecessor is cancelled first so only one execution is live.
    pub(crate) fn start_execution(
        &mut self,
        request: JobRequest,
        now: Duration,
        seed: u64,
    ) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.execution.as_mut() {
            if !previous.status().is_terminal() && previous.cancel() {
                effects.push(Effect::Abort {
                    execution_id: previous.id(),
                    reason: CancelReason::User,
                });
            }
        }

        let execution_id = self.next_execution_id;
        self.next_execution_id += 1;
        let animation = self.profile.animations.shuffled(seed);
        vyx_info!(
            "starting execution {} for {} ({} options)",
            execution_id,
            request.source_url(),
            request.selected_options().len()
        );
        self.execution = Some(JobExecution::new(
            execution_id,
            request.clone(),
            now,
            self.profile.budget,
            animation,
        ));
        self.last_request = Some(request.clone());
        self.last_error = None;
        self.dirty = true;
        effects.push(Effect::Submit {
            execution_id,
            request,
        });
        effects
    }

    pub(crate) fn cancel_running(&mut self) -> Vec<Effect> {
        let Some(execution) = self.execution.as_mut() else {
            return Vec::new();
        };
        if execution.status().is_terminal() || !execution.cancel() {
            return Vec::new();
        }
        self.last_error = execution.error().cloned();
        self.dirty = true;
        vec![Effect::Abort {
            execution_id: execution.id(),
            reason: CancelReason::User,
        }]
    }

    pub(crate) fn tick(&mut self, now: Duration) -> Vec<Effect> {
        let Some(execution) = self.execution.as_mut() else {
            return Vec::new();
        };
        if execution.status().is_terminal() {
            return Vec::new();
        }
        let before = execution.elapsed_secs();
        if execution.observe(now) {
            self.last_error = execution.error().cloned();
            self.dirty = true;
            return vec![Effect::Abort {
                execution_id: execution.id(),
                reason: CancelReason::Timeout,
            }];
        }
        if execution.elapsed_secs() != before {
            self.dirty = true;
        }
        Vec::new()
    }

    pub(crate) fn apply_outcome(
        &mut self,
        execution_id: ExecutionId,
        outcome: TransportOutcome,
    ) -> Vec<Effect> {
        let Some(execution) = self
            .execution
            .as_mut()
            .filter(|execution| execution.id() == execution_id)
        else {
            vyx_debug!("dropping outcome for stale execution {}", execution_id);
            return Vec::new();
        };
        if execution.status().is_terminal() {
            vyx_debug!(
                "execution {} already {:?}; outcome ignored",
                execution_id,
                execution.status()
            );
            return Vec::new();
        }

        self.dirty = true;
        match execution.resolve(outcome) {
            Some(payload) => vec![Effect::StoreResult { payload }, Effect::NavigateToResults],
            None => {
                self.last_error = execution.error().cloned();
                Vec::new()
            }
        }
    }
}
