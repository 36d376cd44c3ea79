//! Progress reporting for patch runs.
//!
//! A [`PatchReporter`] receives one start and one completion (or failure)
//! callback per container, warnings for entries that fell back to
//! passthrough, and is polled for cancellation between containers.
//!
//! # Example
//!
//! ```rust
//! use widefix::progress::{CancelFlag, PatchReporter};
//!
//! let flag = CancelFlag::new();
//! let handle = flag.clone();
//! assert!(!flag.should_cancel());
//! handle.cancel();
//! assert!(flag.should_cancel());
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Error;
use crate::patch::ContainerReport;

/// Progress callbacks for a patch run.
pub trait PatchReporter: Send {
    /// Called before a container is mounted.
    ///
    /// `index` is zero-based; `total` is the number of discovered containers.
    fn on_container_start(&mut self, path: &Path, index: usize, total: usize) {
        let _ = (path, index, total);
    }

    /// Called after a container was processed, whether or not it produced output.
    fn on_container_complete(&mut self, report: &ContainerReport) {
        let _ = report;
    }

    /// Called when a container was skipped because of an error.
    fn on_container_failed(&mut self, path: &Path, error: &Error) {
        let _ = (path, error);
    }

    /// Called for entries that could not be patched and were passed through.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }

    /// Checks if cancellation has been requested.
    ///
    /// Polled before each container; a running container always completes.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// A reporter that ignores every callback.
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl PatchReporter for NoProgress {}

/// Shared cancellation switch.
///
/// Clones share the same flag, so one clone can be moved into a signal
/// handler while another drives the run.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Creates a flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl PatchReporter for CancelFlag {
    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_progress_never_cancels() {
        let mut reporter = NoProgress;
        reporter.on_warning("ignored");
        assert!(!reporter.should_cancel());
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
        assert!(other.should_cancel());
    }
}
