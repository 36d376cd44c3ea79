//! Batch patching of game containers.
//!
//! A [`Patcher`] walks the containers below a WAD root one at a time:
//!
//! 1. mount the container and ask the [`EntrySelector`] for candidates,
//! 2. read every candidate's stored bytes (sequential I/O),
//! 3. decode, recenter and re-encode candidates (in parallel with the
//!    `parallel` feature),
//! 4. hand the result to an [`OutputSink`] if anything changed.
//!
//! A candidate that fails to decode or encode is logged and passed
//! through with its original bytes. A container that fails to mount is
//! reported and skipped. Cancellation is observed between containers.
//!
//! ```rust,no_run
//! use widefix::patch::{self, FileTable, PackagedModSink, PatchOptions, Patcher};
//! use widefix::progress::NoProgress;
//! use widefix::recenter::TargetWidth;
//!
//! let root = patch::locate_wad_root("C:/Riot Games/League of Legends")?;
//! let options = PatchOptions::new(TargetWidth::new(3440)?);
//! let patcher = Patcher::new(FileTable::ui_bins(), options)?;
//! let mut sink = PackagedModSink::new("mods");
//! let summary = patcher.run(&root, &mut sink, &mut NoProgress)?;
//! println!("{} objects recentered", summary.changed_objects());
//! # Ok::<(), widefix::Error>(())
//! ```

pub mod files;
mod install;
mod options;
mod report;
mod select;
mod sink;
pub mod transform;

pub use files::{FileTable, UI_BIN_PATHS};
pub use install::{discover_containers, locate_wad_root};
pub use options::{PatchOptions, Passthrough, Threads};
pub use report::{ContainerReport, EntryOutcome, PatchSummary};
pub use select::{EntrySelector, SelectByContentType};
pub use sink::{
    ContainerOutput, LooseFolderSink, ModInfo, OutputEntry, OutputSink, PackagedModSink,
};

use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;

use crate::Result;
use crate::progress::PatchReporter;
use crate::prop::BinTree;
use crate::read::{Entry, Wad, decompress_entry};
use crate::recenter::TargetWidth;

/// A candidate entry with its stored bytes.
struct Candidate {
    entry: Entry,
    raw: Vec<u8>,
}

/// A candidate after the transform phase.
struct Processed {
    candidate: Candidate,
    outcome: EntryOutcome,
    patched: Option<Vec<u8>>,
}

/// Recenters the UI of every container below a WAD root.
pub struct Patcher<S> {
    selector: S,
    options: PatchOptions,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Patcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patcher")
            .field("selector", &self.selector)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S: EntrySelector> Patcher<S> {
    /// Creates a patcher.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the worker pool cannot be created.
    pub fn new(selector: S, options: PatchOptions) -> Result<Self> {
        #[cfg(feature = "parallel")]
        let pool = match options.threads.count() {
            1 => None,
            threads => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| crate::Error::Io(std::io::Error::other(e)))?,
            ),
        };

        Ok(Self {
            selector,
            options,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    /// Returns the options.
    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Patches every container below `wad_root`.
    ///
    /// Container failures are reported and recorded in the summary; only
    /// configuration errors abort the run.
    pub fn run<K, P>(&self, wad_root: &Path, sink: &mut K, reporter: &mut P) -> Result<PatchSummary>
    where
        K: OutputSink + ?Sized,
        P: PatchReporter + ?Sized,
    {
        sink.prepare(self.options.target)?;
        let containers = discover_containers(wad_root)?;
        let total = containers.len();
        let mut summary = PatchSummary::default();

        for (index, path) in containers.iter().enumerate() {
            if reporter.should_cancel() {
                log::warn!("Cancelled after {} of {} containers", index, total);
                summary.cancelled = true;
                break;
            }
            reporter.on_container_start(path, index, total);

            let relative = path.strip_prefix(wad_root).unwrap_or(path);
            match self.patch_container(path, relative, sink, reporter) {
                Ok(report) => {
                    reporter.on_container_complete(&report);
                    summary.containers.push(report);
                }
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    reporter.on_container_failed(path, &e);
                    summary.failed_containers.push((path.clone(), e.to_string()));
                }
            }
        }

        log::info!(
            "Recentered {} objects in {} entries across {} containers",
            summary.changed_objects(),
            summary.modified_entries(),
            summary.emitted_containers()
        );
        Ok(summary)
    }

    /// Patches one container.
    ///
    /// `relative_path` is where the container sits below the WAD root and
    /// decides where the sink places its output. Nothing is emitted when no
    /// object changed.
    pub fn patch_container<K, P>(
        &self,
        path: &Path,
        relative_path: &Path,
        sink: &mut K,
        reporter: &mut P,
    ) -> Result<ContainerReport>
    where
        K: OutputSink + ?Sized,
        P: PatchReporter + ?Sized,
    {
        let mut wad = Wad::open_path(path)?;
        let mut report = ContainerReport::new(path.to_path_buf());
        report.entries = wad.len();

        let (candidates, others) = self.read_candidates(&mut wad)?;
        if candidates.is_empty() {
            log::debug!("{}: no candidates", relative_path.display());
            return Ok(report);
        }

        let processed = self.process(candidates);
        for item in &processed {
            if let Some(failure) = &item.outcome.failure {
                let message = format!(
                    "{}: entry {:016x} passed through: {}",
                    relative_path.display(),
                    item.outcome.path_hash,
                    failure
                );
                log::warn!("{message}");
                reporter.on_warning(&message);
            }
        }
        report.candidates = processed.iter().map(|p| p.outcome.clone()).collect();

        if report.changed_objects() == 0 {
            log::debug!("{}: nothing to recenter", relative_path.display());
            return Ok(report);
        }

        let keep_all =
            sink.wants_passthrough() && self.options.passthrough == Passthrough::All;
        let mut entries = Vec::with_capacity(processed.len());
        for item in processed {
            match item.patched {
                Some(data) => entries.push(OutputEntry::Patched {
                    path_hash: item.candidate.entry.path_hash,
                    data,
                }),
                None if keep_all => entries.push(OutputEntry::Passthrough {
                    entry: item.candidate.entry,
                    raw: item.candidate.raw,
                }),
                None => {}
            }
        }
        if keep_all {
            for entry in others {
                let raw = wad.read_entry_raw(&entry)?;
                entries.push(OutputEntry::Passthrough { entry, raw });
            }
        }
        report.passed_through = entries
            .iter()
            .filter(|e| matches!(e, OutputEntry::Passthrough { .. }))
            .count();

        let output = sink.emit(ContainerOutput {
            relative_path,
            checksum_kind: wad.checksum_kind(),
            entries,
        })?;
        log::info!(
            "{}: recentered {} objects in {} entries",
            relative_path.display(),
            report.changed_objects(),
            report.modified_entries()
        );
        report.output = Some(output);
        Ok(report)
    }

    /// Splits the TOC into candidates (with their stored bytes) and the rest.
    ///
    /// Repeated path hashes keep only their first record.
    fn read_candidates<R: Read + Seek>(
        &self,
        wad: &mut Wad<R>,
    ) -> Result<(Vec<Candidate>, Vec<Entry>)> {
        let entries = wad.entries().to_vec();
        let mut seen = HashSet::with_capacity(entries.len());
        let mut candidates = Vec::new();
        let mut others = Vec::new();

        for entry in entries {
            if !seen.insert(entry.path_hash) {
                log::debug!("Ignoring repeated entry {:016x}", entry.path_hash);
                continue;
            }
            if self.selector.select(wad, &entry) {
                let raw = wad.read_entry_raw(&entry)?;
                candidates.push(Candidate { entry, raw });
            } else {
                others.push(entry);
            }
        }
        Ok((candidates, others))
    }

    #[cfg(feature = "parallel")]
    fn process(&self, candidates: Vec<Candidate>) -> Vec<Processed> {
        use rayon::prelude::*;

        let target = self.options.target;
        match &self.pool {
            Some(pool) if candidates.len() > 1 => pool.install(|| {
                candidates
                    .into_par_iter()
                    .map(|candidate| process_candidate(candidate, target))
                    .collect()
            }),
            _ => candidates
                .into_iter()
                .map(|candidate| process_candidate(candidate, target))
                .collect(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn process(&self, candidates: Vec<Candidate>) -> Vec<Processed> {
        let target = self.options.target;
        candidates
            .into_iter()
            .map(|candidate| process_candidate(candidate, target))
            .collect()
    }
}

fn process_candidate(candidate: Candidate, target: TargetWidth) -> Processed {
    let path_hash = candidate.entry.path_hash;
    let (outcome, patched) = match patch_entry(&candidate.entry, &candidate.raw, target) {
        Ok((changed_objects, patched)) => (
            EntryOutcome {
                path_hash,
                changed_objects,
                failure: None,
            },
            patched,
        ),
        Err(e) => (
            EntryOutcome {
                path_hash,
                changed_objects: 0,
                failure: Some(e.to_string()),
            },
            None,
        ),
    };
    Processed {
        candidate,
        outcome,
        patched,
    }
}

/// Decodes, recenters and re-encodes one entry.
///
/// Returns the number of changed objects and the new bytes if any changed.
pub fn patch_entry(
    entry: &Entry,
    raw: &[u8],
    target: TargetWidth,
) -> Result<(usize, Option<Vec<u8>>)> {
    let data = decompress_entry(entry, raw)?;
    let mut tree = BinTree::from_bytes(data)?;
    let changed = transform::recenter_tree(&mut tree, target);
    if changed == 0 {
        return Ok((0, None));
    }
    Ok((changed, Some(tree.to_bytes()?)))
}
