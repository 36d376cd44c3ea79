//! Game installation discovery.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::{Error, Result};

/// File that marks the install root.
pub const LEAGUE_CLIENT_EXE: &str = "LeagueClient.exe";
/// File that marks the `Game` folder.
pub const GAME_EXE: &str = "League of Legends.exe";
/// Container every WAD root holds.
pub const GLOBAL_WAD: &str = "Global.wad.client";
/// File name pattern of game containers.
pub const WAD_PATTERN: &str = "*.wad.client";

/// Resolves the folder that holds the game's containers.
///
/// Accepts the install root (holding [`LEAGUE_CLIENT_EXE`]), the `Game`
/// folder (holding [`GAME_EXE`]), the `DATA` folder, or the `DATA/FINAL`
/// folder itself.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if `path` is not a directory or the
/// resolved folder holds no [`GLOBAL_WAD`].
pub fn locate_wad_root(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(Error::Configuration(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    let root = if path.join(LEAGUE_CLIENT_EXE).is_file() {
        path.join("Game").join("DATA").join("FINAL")
    } else if is_named(path, "Game") && path.join(GAME_EXE).is_file() {
        path.join("DATA").join("FINAL")
    } else if is_named(path, "DATA") {
        path.join("FINAL")
    } else {
        path.to_path_buf()
    };

    if !root.join(GLOBAL_WAD).is_file() {
        return Err(Error::Configuration(format!(
            "{} not found in {}",
            GLOBAL_WAD,
            root.display()
        )));
    }
    Ok(root)
}

/// Finds every container below `root`, sorted by path.
pub fn discover_containers(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(WAD_PATTERN)
        .map_err(|e| Error::Configuration(format!("invalid container pattern: {e}")))?;

    let mut containers = Vec::new();
    for entry in WalkDir::new(root.as_ref()).follow_links(true) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| pattern.matches(name))
        {
            containers.push(entry.into_path());
        }
    }
    containers.sort();
    log::debug!("Found {} containers", containers.len());
    Ok(containers)
}

fn is_named(path: &Path, name: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case(name))
}
