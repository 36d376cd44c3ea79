//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use widefix::hash::fnv1a;
use widefix::patch::transform::{ANCHOR, ANCHORS, RECT, RECT_SOURCE_WIDTH};
use widefix::{
    BinObject, BinProperty, BinStruct, BinTree, EntryInput, PropertyValue, WadWriter,
    WriteOptions,
};

/// A UI element object with an anchor set, a rectangle and a source width.
pub fn ui_element(path: &str, anchor: [f32; 2], rect: [f32; 4], width: u16) -> BinObject {
    let mut object = BinObject::new(fnv1a("UiElementRegionData"), fnv1a(path));
    object.push(BinProperty::new(fnv1a("mName"), PropertyValue::String(path.into())));
    object.push(BinProperty::new(
        ANCHORS,
        PropertyValue::Embedded(BinStruct::new(
            fnv1a("AnchorSingle"),
            vec![BinProperty::new(ANCHOR, PropertyValue::Vector2(anchor))],
        )),
    ));
    object.push(BinProperty::new(RECT, PropertyValue::Vector4(rect)));
    object.push(BinProperty::new(RECT_SOURCE_WIDTH, PropertyValue::U16(width)));
    object
}

/// An object without any layout properties.
pub fn plain_object(path: &str) -> BinObject {
    let mut object = BinObject::new(fnv1a("UiSceneData"), fnv1a(path));
    object.push(BinProperty::new(fnv1a("mEnabled"), PropertyValue::Bool(true)));
    object
}

/// Encodes objects as a version 3 property bin.
pub fn ui_bin(objects: Vec<BinObject>) -> Vec<u8> {
    let mut tree = BinTree::new(3);
    for object in objects {
        tree.push(object);
    }
    tree.to_bytes().expect("encode property bin")
}

/// A property bin with one right-anchored element that moves at any target width.
pub fn movable_bin() -> Vec<u8> {
    ui_bin(vec![
        ui_element("Hud/Minimap", [1.0, 1.0], [0.0, 0.0, 200.0, 200.0], 1024),
        plain_object("Hud/Scene"),
    ])
}

/// A property bin whose only element is already centered.
pub fn centered_bin() -> Vec<u8> {
    ui_bin(vec![ui_element(
        "Hud/Chat",
        [0.5, 1.0],
        [10.0, 0.0, 300.0, 100.0],
        1024,
    )])
}

/// Builds an in-memory container from (path hash, data) pairs.
pub fn build_wad_with(options: WriteOptions, entries: &[(u64, &[u8])]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut writer = WadWriter::new(Cursor::new(&mut bytes), options);
    for (path_hash, data) in entries {
        writer
            .add(*path_hash, EntryInput::Data(data.to_vec()))
            .expect("add entry");
    }
    writer.finish().expect("finish container");
    bytes
}

/// Builds an in-memory container with default options.
pub fn build_wad(entries: &[(u64, &[u8])]) -> Vec<u8> {
    build_wad_with(WriteOptions::default(), entries)
}

/// Creates `League of Legends/Game/DATA/FINAL` with an empty `Global.wad.client`
/// and the given containers (paths relative to the final folder).
///
/// Returns the install root.
pub fn fake_install(dir: &Path, containers: &[(&str, Vec<u8>)]) -> PathBuf {
    let root = dir.join("League of Legends");
    let final_dir = root.join("Game").join("DATA").join("FINAL");
    fs::create_dir_all(&final_dir).expect("create install");
    fs::write(root.join("LeagueClient.exe"), b"").expect("write client");
    fs::write(root.join("Game").join("League of Legends.exe"), b"").expect("write game");
    fs::write(final_dir.join("Global.wad.client"), build_wad(&[])).expect("write global");
    for (relative, bytes) in containers {
        let path = final_dir.join(relative);
        fs::create_dir_all(path.parent().expect("container parent")).expect("create folder");
        fs::write(path, bytes).expect("write container");
    }
    root
}

/// Lists every file below `dir`, relative to it, sorted.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir).expect("below dir").to_path_buf())
        .collect();
    files.sort();
    files
}
