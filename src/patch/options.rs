//! Patch run configuration.

use std::num::NonZeroUsize;

use crate::recenter::TargetWidth;

/// Which unmodified entries a rebuilt container keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passthrough {
    /// Every source entry is kept; untouched ones are copied verbatim.
    #[default]
    All,
    /// Only modified entries are written.
    Modified,
}

/// Thread configuration for the per-container transform phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Threads {
    /// One thread per available CPU.
    #[default]
    Auto,
    /// A fixed number of threads.
    Count(NonZeroUsize),
    /// Transform on the calling thread.
    Single,
}

impl Threads {
    /// Maps `0` to [`Threads::Auto`] and any other count to [`Threads::Count`].
    ///
    /// ```rust
    /// use widefix::patch::Threads;
    ///
    /// assert_eq!(Threads::from_count(0), Threads::Auto);
    /// assert_eq!(Threads::from_count(1).count(), 1);
    /// ```
    pub fn from_count(n: usize) -> Self {
        match NonZeroUsize::new(n) {
            Some(count) => Self::Count(count),
            None => Self::Auto,
        }
    }

    /// Resolves the number of worker threads, at least 1.
    pub fn count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            Self::Count(n) => n.get(),
            Self::Single => 1,
        }
    }
}

/// Options of a [`Patcher`](super::Patcher).
#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Display width to recenter for.
    pub target: TargetWidth,
    /// Passthrough policy of rebuilt containers.
    pub passthrough: Passthrough,
    /// Worker threads.
    pub threads: Threads,
}

impl PatchOptions {
    /// Creates options for a target width with default policies.
    pub fn new(target: TargetWidth) -> Self {
        Self {
            target,
            passthrough: Passthrough::default(),
            threads: Threads::default(),
        }
    }

    /// Sets the passthrough policy.
    pub fn passthrough(mut self, passthrough: Passthrough) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Sets the thread configuration.
    pub fn threads(mut self, threads: Threads) -> Self {
        self.threads = threads;
        self
    }
}
