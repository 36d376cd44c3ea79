//! Per-entry, per-container and per-run patch results.

use std::path::PathBuf;

/// What happened to one candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    /// Path hash of the entry.
    pub path_hash: u64,
    /// Number of objects whose rectangle was recentered.
    pub changed_objects: usize,
    /// Why the entry was passed through unpatched, if it failed.
    pub failure: Option<String>,
}

impl EntryOutcome {
    /// Returns `true` if the entry will be emitted with new bytes.
    pub fn is_modified(&self) -> bool {
        self.failure.is_none() && self.changed_objects > 0
    }

    /// Returns `true` if decoding or encoding failed.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Result of processing one container.
#[derive(Debug, Clone, Default)]
pub struct ContainerReport {
    /// Path of the source container.
    pub source: PathBuf,
    /// Where the output was written, if anything was emitted.
    pub output: Option<PathBuf>,
    /// Number of entries in the source container.
    pub entries: usize,
    /// Outcome of every candidate entry.
    pub candidates: Vec<EntryOutcome>,
    /// Entries copied into the output without being decoded.
    pub passed_through: usize,
}

impl ContainerReport {
    pub(crate) fn new(source: PathBuf) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    /// Entries that got new bytes.
    pub fn modified_entries(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_modified()).count()
    }

    /// Objects recentered across all modified entries.
    pub fn changed_objects(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.is_modified())
            .map(|c| c.changed_objects)
            .sum()
    }

    /// Candidates that fell back to passthrough after an error.
    pub fn failed_entries(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_failed()).count()
    }

    /// Returns `true` if the container produced output.
    pub fn is_emitted(&self) -> bool {
        self.output.is_some()
    }
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default)]
pub struct PatchSummary {
    /// Reports of every container that was processed.
    pub containers: Vec<ContainerReport>,
    /// Containers skipped because of an error, with the error message.
    pub failed_containers: Vec<(PathBuf, String)>,
    /// Whether the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl PatchSummary {
    /// Containers that produced output.
    pub fn emitted_containers(&self) -> usize {
        self.containers.iter().filter(|c| c.is_emitted()).count()
    }

    /// Entries modified across all containers.
    pub fn modified_entries(&self) -> usize {
        self.containers.iter().map(ContainerReport::modified_entries).sum()
    }

    /// Objects recentered across all containers.
    pub fn changed_objects(&self) -> usize {
        self.containers.iter().map(ContainerReport::changed_objects).sum()
    }

    /// Candidate entries that fell back to passthrough.
    pub fn failed_entries(&self) -> usize {
        self.containers.iter().map(ContainerReport::failed_entries).sum()
    }

    /// Returns `true` if no container or entry failed.
    pub fn is_clean(&self) -> bool {
        self.failed_containers.is_empty() && self.failed_entries() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path_hash: u64, changed_objects: usize, failure: Option<&str>) -> EntryOutcome {
        EntryOutcome {
            path_hash,
            changed_objects,
            failure: failure.map(str::to_owned),
        }
    }

    #[test]
    fn test_container_totals() {
        let mut report = ContainerReport::new("Global.wad.client".into());
        report.candidates = vec![
            outcome(1, 3, None),
            outcome(2, 0, None),
            outcome(3, 0, Some("bad tag")),
        ];
        assert_eq!(report.modified_entries(), 1);
        assert_eq!(report.changed_objects(), 3);
        assert_eq!(report.failed_entries(), 1);
        assert!(!report.is_emitted());
    }

    #[test]
    fn test_summary_totals() {
        let mut first = ContainerReport::new("a.wad.client".into());
        first.candidates = vec![outcome(1, 2, None)];
        first.output = Some("out/a.wad.client".into());
        let second = ContainerReport::new("b.wad.client".into());

        let summary = PatchSummary {
            containers: vec![first, second],
            ..Default::default()
        };
        assert_eq!(summary.emitted_containers(), 1);
        assert_eq!(summary.modified_entries(), 1);
        assert_eq!(summary.changed_objects(), 2);
        assert!(summary.is_clean());
    }
}
