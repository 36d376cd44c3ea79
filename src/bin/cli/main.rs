//! CLI tool that builds widescreen UI fixes for League of Legends.

mod commands;
mod exit_codes;
mod progress;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use widefix::CancelFlag;

/// Recenters the League of Legends HUD for (ultra)wide screens
#[derive(Parser)]
#[command(name = "widefix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// League of Legends install folder (root, Game, DATA or DATA/FINAL)
    #[arg(short = 'l', long = "leaguepath")]
    league_path: PathBuf,

    /// Output folder
    #[arg(short = 'o', long = "outputpath")]
    output_path: PathBuf,

    /// Target resolution width in pixels (greater than 1440)
    #[arg(short = 't', long = "targetres")]
    target_width: u32,

    /// Output mode
    #[arg(short = 'm', long = "outputmode", value_enum, default_value = "mod")]
    mode: OutputMode,

    /// Patch every property bin instead of the known UI bins
    #[arg(long)]
    scan_all: bool,

    /// Entries kept in rebuilt containers
    #[arg(long, value_enum, default_value = "all")]
    passthrough: PassthroughMode,

    /// Number of threads (0 = auto)
    #[arg(long, short = 'j', default_value = "0")]
    threads: usize,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Loose patched bin files
    Raw,
    /// Mod folder with rebuilt containers and META/info.json
    Mod,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PassthroughMode {
    /// Keep every entry of a rebuilt container
    All,
    /// Keep only modified entries
    Modified,
}

impl From<PassthroughMode> for widefix::Passthrough {
    fn from(mode: PassthroughMode) -> Self {
        match mode {
            PassthroughMode::All => widefix::Passthrough::All,
            PassthroughMode::Modified => widefix::Passthrough::Modified,
        }
    }
}

fn init_logging(quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    // Ctrl+C stops the run at the next container boundary
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.is_cancelled() {
            std::process::exit(exit_codes::USER_INTERRUPT);
        }
        eprintln!("\nInterrupted, finishing the current container");
        handler_flag.cancel();
    }) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let exit_code = commands::patch(&commands::PatchConfig {
        league_path: &cli.league_path,
        output_path: &cli.output_path,
        target_width: cli.target_width,
        mode: cli.mode,
        scan_all: cli.scan_all,
        passthrough: cli.passthrough.into(),
        thread_count: cli.threads,
        cancel,
    });

    std::process::exit(exit_code.code());
}
