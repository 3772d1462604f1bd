//! Progress and cancellation handles shared between the host and an
//! extraction run.
//!
//! Both are cheap cloneable handles over atomics so a UI thread can poll
//! the percentage or request cancellation while the engine works.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Monotone percentage of a running extraction, 0 to 100.
#[derive(Debug, Clone, Default)]
pub struct ExtractionProgress {
    percent: Arc<AtomicU8>,
}

impl ExtractionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Advance the percentage. Values below the current one are ignored so
    /// the reported progress never moves backwards.
    pub(crate) fn advance_to(&self, percent: u8) {
        self.percent.fetch_max(percent.min(100), Ordering::Relaxed);
    }
}

/// Cooperative cancellation flag checked by the engine between units.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
