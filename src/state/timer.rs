//! Long-press timer resource

use std::time::Duration;

use tokio::task::AbortHandle;

use super::ActionContext;

/// A pending key-down timer. Dropping it cancels the underlying task.
#[derive(Debug)]
pub struct PressTimer {
    generation: u64,
    handle: Option<AbortHandle>,
}

impl PressTimer {
    pub fn new(generation: u64, handle: Option<AbortHandle>) -> Self {
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PressTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Arms long-press timers on behalf of the router
pub trait TimerScheduler {
    fn schedule(&self, context: &ActionContext, generation: u64, delay: Duration) -> PressTimer;
}
