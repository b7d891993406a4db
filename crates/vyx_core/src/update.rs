use vyx_logging::vyx_debug;

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::OptionToggled(id) => {
            state.toggle_option(id);
            Vec::new()
        }
        Msg::SubmitClicked { now, seed } => {
            let built = state
                .profile()
                .build_request(state.url_input(), state.selected_options());
            match built {
                Ok(request) => state.start_execution(request, now, seed),
                Err(err) => {
                    vyx_debug!("submission rejected: {}", err);
                    state.set_error(err.into());
                    Vec::new()
                }
            }
        }
        Msg::RetryClicked { now, seed } => match state.retry_request() {
            // Retry always resends the retained request, not the current form.
            Some(request) => state.start_execution(request, now, seed),
            None => Vec::new(),
        },
        Msg::CancelClicked => state.cancel_running(),
        Msg::Tick { now } => state.tick(now),
        Msg::TransportResolved {
            execution_id,
            outcome,
        } => state.apply_outcome(execution_id, outcome),
    };

    (state, effects)
}
