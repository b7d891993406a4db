//! Event loop tying the pure controller to the engine, the mailbox and the
//! terminal.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::RngCore;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use vyx_core::{update, AppState, AppViewModel, Clock, ControllerPhase, Effect, JobProfile, Msg};
use vyx_engine::{EngineEvent, EngineHandle, Mailbox};
use vyx_logging::{vyx_debug, vyx_error, vyx_info};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Where the controller's view goes.
pub trait Frontend: Send {
    fn render(&mut self, view: &AppViewModel);

    /// Called once per successful execution, after the result is stored.
    fn navigate_to_results(&mut self);
}

pub struct Driver {
    state: AppState,
    engine: EngineHandle,
    mailbox: Arc<dyn Mailbox>,
    clock: Arc<dyn Clock>,
    frontend: Box<dyn Frontend>,
    seeds: StdRng,
}

impl Driver {
    pub fn new(
        profile: JobProfile,
        engine: EngineHandle,
        mailbox: Arc<dyn Mailbox>,
        clock: Arc<dyn Clock>,
        frontend: Box<dyn Frontend>,
        seeds: StdRng,
    ) -> Self {
        Self {
            state: AppState::new(profile),
            engine,
            mailbox,
            clock,
            frontend,
            seeds,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> ControllerPhase {
        self.state.phase()
    }

    pub fn engine(&mut self) -> &mut EngineHandle {
        &mut self.engine
    }

    /// Fills the form and submits it. The selection ends up as exactly
    /// `options`, whatever was selected before; duplicates count once.
    pub fn submit<S: AsRef<str>>(&mut self, url: &str, options: &[S]) {
        self.dispatch(Msg::UrlChanged(url.to_string()));
        let wanted: BTreeSet<String> = options
            .iter()
            .map(|option| option.as_ref().to_string())
            .collect();
        let current: BTreeSet<String> = self.state.view().selected_options.into_iter().collect();
        for option in current.symmetric_difference(&wanted) {
            self.dispatch(Msg::OptionToggled(option.clone()));
        }
        let now = self.clock.now();
        let seed = self.seeds.next_u64();
        self.dispatch(Msg::SubmitClicked { now, seed });
    }

    /// Resubmits the last request. Returns false if retry is not available.
    pub fn retry(&mut self) -> bool {
        if !self.state.view().can_retry {
            return false;
        }
        let now = self.clock.now();
        let seed = self.seeds.next_u64();
        self.dispatch(Msg::RetryClicked { now, seed });
        true
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        self.run_effects(effects);
        if dirty {
            self.frontend.render(&self.state.view());
        }
    }

    /// Drives the current execution until it reaches a terminal phase.
    ///
    /// Each message on `cancel_rx` cancels the running job. Returns
    /// immediately if nothing is running.
    pub async fn run_until_settled(&mut self, cancel_rx: &mut mpsc::UnboundedReceiver<()>) {
        let mut ticker = time::interval_at(time::Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.state.is_running() {
            tokio::select! {
                biased;
                Some(()) = cancel_rx.recv() => {
                    vyx_info!("cancel requested");
                    self.dispatch(Msg::CancelClicked);
                }
                Some(event) = self.engine.next_event() => {
                    let EngineEvent::Resolved { execution_id, outcome } = event;
                    self.dispatch(Msg::TransportResolved { execution_id, outcome });
                }
                _ = ticker.tick() => {
                    let now = self.clock.now();
                    self.dispatch(Msg::Tick { now });
                }
            }
        }
        vyx_debug!("driver settled in {:?}", self.phase());
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit {
                    execution_id,
                    request,
                } => self.engine.submit(execution_id, request),
                Effect::Abort {
                    execution_id,
                    reason,
                } => {
                    if !self.engine.cancel(execution_id, reason) {
                        vyx_debug!("execution {} was no longer in flight", execution_id);
                    }
                }
                Effect::StoreResult { payload } => {
                    if let Err(err) = self.mailbox.deposit(&payload) {
                        vyx_error!("failed to store result: {}", err);
                    }
                }
                Effect::NavigateToResults => self.frontend.navigate_to_results(),
            }
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.engine.cancel_all(vyx_core::CancelReason::User);
    }
}
