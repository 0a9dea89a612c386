use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime totals of the cleaner's remote operations.
///
/// Written by the cleanup pass and read concurrently by the metrics
/// collector; values only ever grow.
#[derive(Debug, Default)]
pub struct CleanerCounters {
    removed: AtomicU64,
    stop_errors: AtomicU64,
    delete_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub removed: u64,
    pub stop_errors: u64,
    pub delete_errors: u64,
}

impl CleanerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_removed(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_stop_error(&self) {
        self.stop_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_delete_error(&self) {
        self.delete_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn removed(&self) -> u64 {
        self.removed.load(Ordering::Relaxed)
    }

    pub fn stop_errors(&self) -> u64 {
        self.stop_errors.load(Ordering::Relaxed)
    }

    pub fn delete_errors(&self) -> u64 {
        self.delete_errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            removed: self.removed(),
            stop_errors: self.stop_errors(),
            delete_errors: self.delete_errors(),
        }
    }
}
