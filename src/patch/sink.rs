//! Output destinations for patched containers.
//!
//! A sink receives one [`ContainerOutput`] per container that produced at
//! least one change. Two sinks are provided:
//!
//! - [`LooseFolderSink`] writes each patched entry as a loose file under
//!   `<out>/<container path>/<entry path>`.
//! - [`PackagedModSink`] rebuilds each container under
//!   `<out>/<mod folder>/WAD/<container path>` and describes the mod in
//!   `META/info.json`.
//!
//! Every file is written to a temporary file in its destination directory
//! and renamed into place once complete.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::files::FileTable;
use crate::checksum::ChecksumKind;
use crate::read::Entry;
use crate::recenter::TargetWidth;
use crate::write::{EntryInput, WadWriter, WriteOptions};
use crate::{Error, Result};

/// One entry handed to a sink.
#[derive(Debug, Clone)]
pub enum OutputEntry {
    /// Re-encoded entry data, uncompressed.
    Patched {
        /// Path hash of the entry.
        path_hash: u64,
        /// Encoded property bin.
        data: Vec<u8>,
    },
    /// Stored bytes copied from the source container.
    Passthrough {
        /// The source TOC record.
        entry: Entry,
        /// The stored (possibly compressed) bytes.
        raw: Vec<u8>,
    },
}

impl OutputEntry {
    /// Path hash of the entry.
    pub fn path_hash(&self) -> u64 {
        match self {
            Self::Patched { path_hash, .. } => *path_hash,
            Self::Passthrough { entry, .. } => entry.path_hash,
        }
    }
}

/// Everything a sink needs to emit one container.
#[derive(Debug)]
pub struct ContainerOutput<'a> {
    /// Container path relative to the WAD root.
    pub relative_path: &'a Path,
    /// Checksum kind of the source container.
    pub checksum_kind: Option<ChecksumKind>,
    /// Patched entries, followed by passthrough entries if the sink wants them.
    pub entries: Vec<OutputEntry>,
}

/// A destination for patched containers.
pub trait OutputSink {
    /// Called once before the first container is processed.
    fn prepare(&mut self, target: TargetWidth) -> Result<()> {
        let _ = target;
        Ok(())
    }

    /// Returns `true` if unmodified entries should be handed to [`emit`](Self::emit).
    fn wants_passthrough(&self) -> bool;

    /// Writes one container's output and returns where it went.
    fn emit(&mut self, output: ContainerOutput<'_>) -> Result<PathBuf>;
}

/// Writes patched entries as loose files.
///
/// The output folder is emptied when a run starts.
#[derive(Debug, Clone)]
pub struct LooseFolderSink {
    root: PathBuf,
    names: FileTable,
}

impl LooseFolderSink {
    /// Writes under `root`, naming entries from [`FileTable::ui_bins`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            names: FileTable::ui_bins(),
        }
    }

    /// Uses another table to name entries.
    ///
    /// Entries absent from the table are written as `<hash:016x>.bin`.
    pub fn with_names(mut self, names: FileTable) -> Self {
        self.names = names;
        self
    }

    /// Path a patched entry of the given container is written to.
    pub fn entry_path(&self, relative_path: &Path, path_hash: u64) -> PathBuf {
        let mut path = self.root.join(relative_path);
        match self.names.name(path_hash) {
            Some(name) => path.extend(name.split('/').filter(|part| !part.is_empty())),
            None => path.push(format!("{path_hash:016x}.bin")),
        }
        path
    }
}

impl OutputSink for LooseFolderSink {
    /// Empties `root`, so files patched by an earlier run never outlive it.
    fn prepare(&mut self, _target: TargetWidth) -> Result<()> {
        clean_directory(&self.root)?;
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn wants_passthrough(&self) -> bool {
        false
    }

    fn emit(&mut self, output: ContainerOutput<'_>) -> Result<PathBuf> {
        for entry in &output.entries {
            if let OutputEntry::Patched { path_hash, data } = entry {
                let path = self.entry_path(output.relative_path, *path_hash);
                write_atomic(&path, |file| Ok(file.write_all(data)?))?;
                log::debug!("Wrote {}", path.display());
            }
        }
        Ok(self.root.join(output.relative_path))
    }
}

/// Mod metadata stored in `META/info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModInfo {
    /// Mod author.
    pub author: String,
    /// One-line description.
    pub description: String,
    /// Display name.
    pub name: String,
    /// Mod version.
    pub version: String,
}

impl Default for ModInfo {
    fn default() -> Self {
        Self {
            author: "widefix".into(),
            description: "Centers the UI in the middle for better (ultra)wide screen support."
                .into(),
            name: "WideScreenFix".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

impl ModInfo {
    /// Folder name of the mod for a target width.
    pub fn folder_name(&self, target: TargetWidth) -> String {
        format!(
            "{} ({}p) - {} (by {})",
            self.name, target, self.version, self.author
        )
    }

    /// Metadata as written for a target width; the width is added to the name.
    pub fn for_target(&self, target: TargetWidth) -> Self {
        Self {
            name: format!("{} ({}p)", self.name, target),
            ..self.clone()
        }
    }
}

/// Rebuilds containers into a mod folder loadable by mod managers.
#[derive(Debug, Clone)]
pub struct PackagedModSink {
    root: PathBuf,
    info: ModInfo,
    write_options: WriteOptions,
    base: Option<PathBuf>,
}

impl PackagedModSink {
    /// Creates the mod folder under `root` on [`prepare`](OutputSink::prepare).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            info: ModInfo::default(),
            write_options: WriteOptions::default(),
            base: None,
        }
    }

    /// Sets the mod metadata.
    pub fn info(mut self, info: ModInfo) -> Self {
        self.info = info;
        self
    }

    /// Sets how rebuilt containers are written.
    pub fn write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }

    /// The mod folder, once prepared.
    pub fn mod_folder(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    fn wad_folder(&self) -> Result<PathBuf> {
        self.base
            .as_ref()
            .map(|base| base.join("WAD"))
            .ok_or_else(|| Error::Configuration("mod folder was not prepared".into()))
    }
}

impl OutputSink for PackagedModSink {
    fn prepare(&mut self, target: TargetWidth) -> Result<()> {
        let base = self.root.join(self.info.folder_name(target));
        clean_directory(&base)?;
        fs::create_dir_all(base.join("WAD"))?;
        let meta = base.join("META");
        fs::create_dir_all(&meta)?;

        let info = self.info.for_target(target);
        write_atomic(&meta.join("info.json"), |file| {
            serde_json::to_writer_pretty(&mut *file, &info)?;
            Ok(())
        })?;
        self.base = Some(base);
        Ok(())
    }

    fn wants_passthrough(&self) -> bool {
        true
    }

    fn emit(&mut self, output: ContainerOutput<'_>) -> Result<PathBuf> {
        let path = self.wad_folder()?.join(output.relative_path);
        let options = self.write_options.clone();
        let result = write_atomic(&path, |file| {
            let mut writer = WadWriter::new(BufWriter::new(file), options);
            for entry in output.entries {
                match entry {
                    OutputEntry::Patched { path_hash, data } => {
                        writer.add(path_hash, EntryInput::Data(data))?
                    }
                    OutputEntry::Passthrough { entry, raw } => writer.add(
                        entry.path_hash,
                        EntryInput::raw(entry, raw, output.checksum_kind),
                    )?,
                }
            }
            writer.finish()
        })?;
        log::debug!(
            "Wrote {} ({} entries, {} bytes)",
            path.display(),
            result.entries_written,
            result.bytes_written
        );
        Ok(path)
    }
}

/// Writes a file through a temporary sibling that is renamed into place
/// only if `write` succeeds.
fn write_atomic<T>(path: &Path, write: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Configuration(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    let value = write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(value)
}

/// Removes the contents of a directory, keeping the directory itself.
fn clean_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash;
    use crate::read::Wad;

    fn target() -> TargetWidth {
        TargetWidth::new(2560).unwrap()
    }

    #[test]
    fn test_loose_entry_path() {
        let sink = LooseFolderSink::new("out");
        let path_hash = hash::xxh64("gameplay/chat.uibase.bin");
        let path = sink.entry_path(Path::new("DATA/FINAL/UI.wad.client"), path_hash);
        assert_eq!(
            path,
            Path::new("out/DATA/FINAL/UI.wad.client/gameplay/chat.uibase.bin")
        );
        let unknown = sink.entry_path(Path::new("UI.wad.client"), 0xAB);
        assert_eq!(unknown, Path::new("out/UI.wad.client/00000000000000ab.bin"));
    }

    #[test]
    fn test_loose_sink_clears_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("UI.wad.client/ux/old_renderui.bin");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"PROP").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut sink = LooseFolderSink::new(dir.path());
        sink.prepare(target()).unwrap();
        assert!(dir.path().is_dir());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_loose_sink_writes_only_patched() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = LooseFolderSink::new(dir.path());
        sink.prepare(target()).unwrap();
        let path_hash = hash::xxh64("gameplay/chat.uibase.bin");
        sink.emit(ContainerOutput {
            relative_path: Path::new("UI.wad.client"),
            checksum_kind: None,
            entries: vec![
                OutputEntry::Patched {
                    path_hash,
                    data: b"PROP".to_vec(),
                },
                OutputEntry::Passthrough {
                    entry: Entry::default(),
                    raw: vec![1, 2, 3],
                },
            ],
        })
        .unwrap();

        let written = dir.path().join("UI.wad.client/gameplay/chat.uibase.bin");
        assert_eq!(fs::read(written).unwrap(), b"PROP");
        let files: Vec<_> = walkdir::WalkDir::new(dir.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_mod_info_json_keys() {
        let info = ModInfo::default().for_target(target());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["Name"], "WideScreenFix (2560p)");
        assert!(json.get("Author").is_some());
        assert!(json.get("Description").is_some());
        assert!(json.get("Version").is_some());
    }

    #[test]
    fn test_packaged_sink_layout() {
        let dir = tempfile::tempdir().unwrap();
        let info = ModInfo {
            author: "me".into(),
            version: "1.0".into(),
            ..ModInfo::default()
        };
        let mut sink = PackagedModSink::new(dir.path()).info(info);
        sink.prepare(target()).unwrap();

        let base = dir.path().join("WideScreenFix (2560p) - 1.0 (by me)");
        assert_eq!(sink.mod_folder(), Some(base.as_path()));
        let meta: ModInfo =
            serde_json::from_slice(&fs::read(base.join("META/info.json")).unwrap()).unwrap();
        assert_eq!(meta.name, "WideScreenFix (2560p)");

        let path = sink
            .emit(ContainerOutput {
                relative_path: Path::new("Champions/Ahri.wad.client"),
                checksum_kind: None,
                entries: vec![OutputEntry::Patched {
                    path_hash: 42,
                    data: b"PROP payload".to_vec(),
                }],
            })
            .unwrap();
        assert_eq!(path, base.join("WAD/Champions/Ahri.wad.client"));

        let mut wad = Wad::open_path(&path).unwrap();
        assert_eq!(wad.read(42).unwrap(), b"PROP payload");
    }

    #[test]
    fn test_prepare_cleans_only_mod_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        let mut sink = PackagedModSink::new(dir.path());
        sink.prepare(target()).unwrap();
        let stale = sink.mod_folder().unwrap().join("WAD/stale.wad.client");
        fs::write(&stale, b"old").unwrap();

        sink.prepare(target()).unwrap();
        assert!(!stale.exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_emit_before_prepare_fails() {
        let mut sink = PackagedModSink::new("unused");
        let err = sink
            .emit(ContainerOutput {
                relative_path: Path::new("a.wad.client"),
                checksum_kind: None,
                entries: Vec::new(),
            })
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
