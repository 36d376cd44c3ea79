//! Command implementations for the CLI tool.

use std::path::Path;

use widefix::patch::{
    self, EntrySelector, FileTable, LooseFolderSink, OutputSink, PackagedModSink, PatchOptions,
    Patcher, SelectByContentType, Threads,
};
use widefix::{CancelFlag, Passthrough, PatchSummary, Result, TargetWidth};

use crate::OutputMode;
use crate::exit_codes::ExitCode;
use crate::progress::ConsoleReporter;

/// Configuration for the patch command.
pub struct PatchConfig<'a> {
    pub league_path: &'a Path,
    pub output_path: &'a Path,
    pub target_width: u32,
    pub mode: OutputMode,
    pub scan_all: bool,
    pub passthrough: Passthrough,
    pub thread_count: usize,
    pub cancel: CancelFlag,
}

/// Patch command implementation
pub fn patch(config: &PatchConfig<'_>) -> ExitCode {
    match run(config) {
        Ok(summary) => {
            log_outcome(&summary);
            ExitCode::from_summary(&summary)
        }
        Err(e) => {
            log::error!("FAILED ({})", e);
            ExitCode::from_error(&e)
        }
    }
}

fn run(config: &PatchConfig<'_>) -> Result<PatchSummary> {
    // Validate everything before touching the output folder
    let target = TargetWidth::new(config.target_width)?;
    let root = patch::locate_wad_root(config.league_path)?;
    let options = PatchOptions::new(target)
        .passthrough(config.passthrough)
        .threads(Threads::from_count(config.thread_count));

    log::info!(
        "Patching {} for {}p ({} mode)",
        root.display(),
        target,
        match config.mode {
            OutputMode::Raw => "raw",
            OutputMode::Mod => "mod",
        }
    );

    let mut sink: Box<dyn OutputSink> = match config.mode {
        OutputMode::Raw => Box::new(LooseFolderSink::new(config.output_path)),
        OutputMode::Mod => Box::new(PackagedModSink::new(config.output_path)),
    };

    if config.scan_all {
        run_with(SelectByContentType::property_bins(), options, &root, sink.as_mut(), config)
    } else {
        run_with(FileTable::ui_bins(), options, &root, sink.as_mut(), config)
    }
}

fn run_with<S: EntrySelector>(
    selector: S,
    options: PatchOptions,
    root: &Path,
    sink: &mut dyn OutputSink,
    config: &PatchConfig<'_>,
) -> Result<PatchSummary> {
    let patcher = Patcher::new(selector, options)?;
    let mut reporter = ConsoleReporter::new(root, config.cancel.clone());
    let summary = patcher.run(root, sink, &mut reporter)?;

    log::info!(
        "Recentered {} objects in {} entries, {} containers written",
        summary.changed_objects(),
        summary.modified_entries(),
        summary.emitted_containers()
    );
    if reporter.warnings() > 0 {
        log::warn!("{} entries were left unpatched", reporter.warnings());
    }
    Ok(summary)
}

fn log_outcome(summary: &PatchSummary) {
    if summary.cancelled {
        log::warn!("FAILED (interrupted)");
    } else if !summary.is_clean() {
        log::warn!(
            "DONE with {} failed containers and {} failed entries",
            summary.failed_containers.len(),
            summary.failed_entries()
        );
    } else {
        log::info!("DONE");
    }
}
