use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use vyx_core::{CancelReason, ExecutionId, JobRequest, TransportOutcome};
use vyx_logging::{vyx_debug, vyx_info};

use crate::{JobCancel, Submitter};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Resolved {
        execution_id: ExecutionId,
        outcome: TransportOutcome,
    },
}

type InFlight = Arc<Mutex<HashMap<ExecutionId, JobCancel>>>;

/// Runs submissions as tokio tasks and reports their outcomes as events.
pub struct EngineHandle {
    submitter: Arc<dyn Submitter>,
    in_flight: InFlight,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(submitter: Arc<dyn Submitter>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            submitter,
            in_flight: Arc::default(),
            event_tx,
            event_rx,
        }
    }

    /// Starts a submission. Must be called from within a tokio runtime.
    pub fn submit(&self, execution_id: ExecutionId, request: JobRequest) {
        let cancel = JobCancel::new();
        lock(&self.in_flight).insert(execution_id, cancel.clone());

        let submitter = self.submitter.clone();
        let in_flight = self.in_flight.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = submitter.submit(&request, &cancel).await;
            lock(&in_flight).remove(&execution_id);
            vyx_debug!("execution {} resolved: {:?}", execution_id, outcome);
            let _ = event_tx.send(EngineEvent::Resolved {
                execution_id,
                outcome,
            });
        });
    }

    /// Stops waiting for an execution's response.
    ///
    /// This only abandons the request on the client side. The external
    /// workflow may keep running and finish its work; nothing here tells it
    /// to stop. Returns false if the execution is not in flight.
    pub fn cancel(&self, execution_id: ExecutionId, reason: CancelReason) -> bool {
        match lock(&self.in_flight).get(&execution_id) {
            Some(cancel) => {
                vyx_info!("cancelling execution {} ({:?})", execution_id, reason);
                cancel.trigger(reason);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self, reason: CancelReason) {
        for cancel in lock(&self.in_flight).values() {
            cancel.trigger(reason);
        }
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<ExecutionId, JobCancel>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}
