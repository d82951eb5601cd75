use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag shared between a stage runner and its worker thread.
///
/// Starts live and goes down exactly once. Queue operations read it on every
/// wake-up, so a flag drop followed by [`wake_all`](crate::QueueEnd::wake_all) on
/// the same queue unblocks any waiter.
#[derive(Debug, Clone)]
pub struct WorkFlag {
    live: Arc<AtomicBool>,
}

impl WorkFlag {
    /// Create a new live flag
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the owning stage should keep working
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Lower the flag. Returns `true` only for the call that performed the transition.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::AcqRel)
    }
}

impl Default for WorkFlag {
    fn default() -> Self {
        Self::new()
    }
}
