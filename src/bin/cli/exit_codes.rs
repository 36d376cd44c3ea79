//! Process exit codes of `widefix`.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | every container patched |
//! | 1 | some containers or entries were skipped |
//! | 2 | the run aborted |
//! | 3 | bad target width or install path |
//! | 130 | interrupted |
//! | 255 | bad arguments (clap) |

use widefix::{Error, PatchSummary};

/// Exit code of a first-pass Ctrl+C that was pressed again.
pub const USER_INTERRUPT: i32 = 130;

/// Outcome of a run, as reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    ConfigError,
    UserInterrupt,
}

impl ExitCode {
    /// Returns the numeric exit code.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Warning => 1,
            Self::FatalError => 2,
            Self::ConfigError => 3,
            Self::UserInterrupt => USER_INTERRUPT,
        }
    }

    /// Classifies an error that ended the run.
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Cancelled => Self::UserInterrupt,
            e if e.is_configuration() => Self::ConfigError,
            _ => Self::FatalError,
        }
    }

    /// Classifies a run that finished.
    pub fn from_summary(summary: &PatchSummary) -> Self {
        if summary.cancelled {
            Self::UserInterrupt
        } else if summary.is_clean() {
            Self::Success
        } else {
            Self::Warning
        }
    }
}
