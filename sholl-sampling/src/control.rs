//! Progress reporting and cooperative cancellation for a sampling run.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shared state between a sampling run and its caller.
///
/// Workers bump the progress counter once per processed radius and poll the
/// cancellation flag before starting the next one.
#[derive(Debug, Default)]
pub struct SamplingControl {
    progress: AtomicUsize,
    total: AtomicUsize,
    cancelled: AtomicBool,
}

impl SamplingControl {
    /// Creates a control with no progress and no pending cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Radii already being processed complete.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`SamplingControl::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of radii processed so far.
    #[must_use]
    pub fn progress(&self) -> usize {
        self.progress.load(Ordering::Relaxed)
    }

    /// Number of radii in the current run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn start(&self, total: usize) {
        self.progress.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub(crate) fn advance(&self) {
        self.progress.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_and_cancel() {
        let control = SamplingControl::new();
        control.start(3);
        control.advance();
        control.advance();
        assert_eq!(control.progress(), 2);
        assert_eq!(control.total(), 3);
        assert!(!control.is_cancelled());
        control.cancel();
        assert!(control.is_cancelled());
    }
}
