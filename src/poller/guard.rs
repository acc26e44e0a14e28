//! Scoped in-flight tracking.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts fetches that have started but not finished.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    count: Arc<AtomicUsize>,
}

impl InFlight {
    /// Mark one fetch as started. The fetch ends when the guard drops.
    pub(crate) fn acquire(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            count: self.count.clone(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.count.load(Ordering::Acquire) > 0
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

/// Releases its slot on drop, including on cancellation or panic.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}
