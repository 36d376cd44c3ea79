//! Console task lines for patch runs.

use std::path::{Path, PathBuf};

use widefix::patch::ContainerReport;
use widefix::{CancelFlag, Error, PatchReporter};

/// Logs a start marker and a `DONE`/`FAILED` line per container.
pub struct ConsoleReporter {
    root: PathBuf,
    cancel: CancelFlag,
    warnings: usize,
}

impl ConsoleReporter {
    /// Creates a reporter printing container paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>, cancel: CancelFlag) -> Self {
        Self {
            root: root.into(),
            cancel,
            warnings: 0,
        }
    }

    /// Number of entry warnings seen so far.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

impl PatchReporter for ConsoleReporter {
    fn on_container_start(&mut self, path: &Path, index: usize, total: usize) {
        log::info!("[{}/{}] {} ...", index + 1, total, self.relative(path).display());
    }

    fn on_container_complete(&mut self, report: &ContainerReport) {
        let path = self.relative(&report.source).display();
        if report.is_emitted() {
            log::info!(
                "{} DONE ({} objects in {} entries)",
                path,
                report.changed_objects(),
                report.modified_entries()
            );
        } else {
            log::info!("{} DONE (unchanged)", path);
        }
    }

    fn on_container_failed(&mut self, path: &Path, error: &Error) {
        log::error!("{} FAILED ({})", self.relative(path).display(), error);
    }

    fn on_warning(&mut self, _message: &str) {
        self.warnings += 1;
    }

    fn should_cancel(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
