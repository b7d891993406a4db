//! Vyx core: pure job controller state machine and its building blocks.
mod clock;
mod effect;
mod error;
mod execution;
mod msg;
mod payload;
mod profile;
mod request;
mod schedule;
mod state;
mod update;
mod validate;
mod view_model;

pub use clock::{Clock, ManualClock};
pub use effect::Effect;
pub use error::JobError;
pub use execution::{CancelReason, ExecutionId, JobExecution, JobStatus};
pub use msg::Msg;
pub use payload::{
    parse_body_text, ResultPayload, TransportError, TransportFailure, TransportOutcome,
    DEFAULT_FAILURE_MESSAGE,
};
pub use profile::{JobProfile, ProfileKind};
pub use request::{map_content_types, ContentType, JobRequest, ValidationError, CONTENT_TYPES};
pub use schedule::{
    format_elapsed, AnimationPool, AnimationSlot, ProgressSnapshot, ProgressStage, ScheduleError,
    StagePlan,
};
pub use state::{AppState, ControllerPhase};
pub use update::update;
pub use validate::is_valid_video_url;
pub use view_model::AppViewModel;
