//! # widefix
//!
//! Recenters League of Legends HUD layouts for (ultra)wide screens.
//!
//! The game lays out its HUD elements against a 1440 pixel wide reference
//! area and attaches them to the left or right screen edge. On wide screens
//! those elements end up at the far edges. widefix rewrites the anchored
//! rectangles inside the game's UI property bins so they are attached to
//! the screen center instead, and emits the result either as loose files or
//! as a mod folder of rebuilt containers.
//!
//! ## Quick Start
//!
//! ### Building a mod
//!
//! ```rust,no_run
//! use widefix::patch::{self, FileTable, PackagedModSink, PatchOptions, Patcher};
//! use widefix::{NoProgress, Result, TargetWidth};
//!
//! fn main() -> Result<()> {
//!     let root = patch::locate_wad_root("C:/Riot Games/League of Legends")?;
//!     let patcher = Patcher::new(
//!         FileTable::ui_bins(),
//!         PatchOptions::new(TargetWidth::new(2560)?),
//!     )?;
//!     let mut sink = PackagedModSink::new("./mods");
//!     let summary = patcher.run(&root, &mut sink, &mut NoProgress)?;
//!     println!(
//!         "{} objects in {} containers",
//!         summary.changed_objects(),
//!         summary.emitted_containers()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Reading a container
//!
//! ```rust,no_run
//! use widefix::{BinTree, Result, Wad, hash};
//!
//! fn main() -> Result<()> {
//!     let mut wad = Wad::open_path("UI.wad.client")?;
//!     let data = wad.read(hash::xxh64("ux/renderui/shared_renderui.bin"))?;
//!     let tree = BinTree::from_bytes(data)?;
//!     println!("{} objects", tree.objects().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`hash`], [`checksum`] | Name/path hashes and entry checksums |
//! | [`prop`] | Lossless property bin codec |
//! | [`format`], [`codec`], [`read`], [`write`] | WAD containers |
//! | [`recenter`] | The anchor transform |
//! | [`patch`] | Batch orchestration, output sinks, install discovery |
//! | [`progress`] | Run callbacks and cancellation |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | Yes | Transform the entries of a container on a Rayon pool |
//! | `cli` | No | The `widefix` command-line tool |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod checksum;
pub mod codec;
pub mod error;
pub mod format;
pub mod hash;
pub mod patch;
pub mod progress;
pub mod prop;
pub mod read;
pub mod recenter;
pub mod write;

pub use error::{Error, Result};

// Re-export container API at crate root for convenience
pub use read::{ContentType, Entry, Wad};
pub use write::{EntryInput, WadWriter, WriteOptions, WriteResult};

// Re-export property tree API
pub use prop::{BinObject, BinProperty, BinStruct, BinTree, PropertyKind, PropertyValue};

// Re-export patch API
pub use patch::{
    FileTable, LooseFolderSink, PackagedModSink, PatchOptions, PatchSummary, Passthrough,
    Patcher,
};
pub use recenter::TargetWidth;

// Re-export progress API
pub use progress::{CancelFlag, NoProgress, PatchReporter};
