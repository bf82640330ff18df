use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Process-wide busy flag shared by pipeline runs and print batches.
///
/// Acquiring returns a [`BusyGuard`]; the flag drops back when the last guard
/// goes out of scope, on success, early return or error alike.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    holders: Arc<AtomicUsize>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> BusyGuard {
        let previous = self.holders.fetch_add(1, Ordering::SeqCst);
        trace!(holders = previous + 1, "Busy indicator acquired");
        BusyGuard {
            holders: Arc::clone(&self.holders),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

#[derive(Debug)]
#[must_use = "the busy state is released when the guard is dropped"]
pub struct BusyGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let previous = self.holders.fetch_sub(1, Ordering::SeqCst);
        trace!(holders = previous.saturating_sub(1), "Busy indicator released");
    }
}
