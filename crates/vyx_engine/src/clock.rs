use std::time::Duration;

use tokio::time::Instant;
use vyx_core::Clock;

/// Clock backed by tokio's monotonic time, so it follows `tokio::time::pause`
/// and `advance` in tests just like the runtime's timers do.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        Instant::now().duration_since(self.origin)
    }
}
