use crate::{ControllerPhase, ProgressSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: ControllerPhase,
    pub url_input: String,
    pub selected_options: Vec<String>,
    pub progress: Option<ProgressSnapshot>,
    pub error_message: Option<String>,
    pub can_cancel: bool,
    pub can_retry: bool,
    pub dirty: bool,
}
