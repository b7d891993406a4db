use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use vyx_core::CancelReason;

/// Single-use cancellation signal shared by user cancel and timeout expiry.
///
/// The reason is recorded before the token fires, so anyone who observes
/// the cancellation can read why it happened. The first reason wins.
#[derive(Debug, Clone, Default)]
pub struct JobCancel {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl JobCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `reason` and fires the token. Returns false if an earlier
    /// trigger already set the reason.
    pub fn trigger(&self, reason: CancelReason) -> bool {
        let first = self.reason.set(reason).is_ok();
        self.token.cancel();
        first
    }

    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the token fires.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}
