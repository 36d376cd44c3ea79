//! Tests for damaged containers and entries.
//!
//! Entries that cannot be decoded must never abort a run: they are reported
//! and copied through byte for byte.

mod common;

use std::io::Cursor;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use widefix::codec::Compression;
use widefix::format::header::WadHeader;
use widefix::hash::xxh64;
use widefix::patch::{self, PackagedModSink, PatchOptions, Patcher, Threads};
use widefix::{BinTree, Entry, Error, NoProgress, PropertyKind, TargetWidth, Wad};

use common::{fake_install, movable_bin};

const MINIMAP: &str = "ux/renderui/shared_renderui.bin";
const SATELLITE: &str = "ux/renderui/satellite.bin";
const BAD_ZSTD: &str = "ux/renderui/bad_zstd.bin";
const SHORT: &str = "ux/renderui/short.bin";

/// Builds a version 3 container by hand so the TOC can lie about its payloads.
fn handmade_wad(entries: &[(u64, Compression, Vec<u8>, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    WadHeader::v3(4, entries.len() as u32)
        .write(&mut data)
        .unwrap();
    let mut offset = 272 + 32 * entries.len() as u32;
    for (path_hash, compression, stored, uncompressed_size) in entries {
        Entry {
            path_hash: *path_hash,
            offset,
            compressed_size: stored.len() as u32,
            uncompressed_size: *uncompressed_size,
            compression_id: compression.id(),
            ..Entry::default()
        }
        .write(&mut data)
        .unwrap();
        offset += stored.len() as u32;
    }
    for (_, _, stored, _) in entries {
        data.extend_from_slice(stored);
    }
    data
}

fn damaged_entries() -> Vec<(u64, Compression, Vec<u8>, u32)> {
    let bin = movable_bin();
    let size = bin.len() as u32;
    vec![
        (xxh64(MINIMAP), Compression::None, bin, size),
        (
            xxh64(SATELLITE),
            Compression::Satellite,
            b"DATA/FINAL/UI.wad.client".to_vec(),
            24,
        ),
        (xxh64(BAD_ZSTD), Compression::Zstd, b"not a zstd frame".to_vec(), 64),
        (
            xxh64(SHORT),
            Compression::None,
            b"PROP\x01\x00\x00\x00\x00\x00\x00\x00".to_vec(),
            40,
        ),
    ]
}

#[test]
fn damaged_entries_report_their_cause() {
    let mut wad = Wad::open(Cursor::new(handmade_wad(&damaged_entries()))).unwrap();

    assert!(matches!(
        wad.read(xxh64(SATELLITE)),
        Err(Error::UnsupportedCompression { id: 2, .. })
    ));
    assert!(matches!(
        wad.read(xxh64(BAD_ZSTD)),
        Err(Error::Decompression { .. })
    ));
    match wad.read(xxh64(SHORT)) {
        Err(Error::SizeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 40);
            assert_eq!(actual, 12);
        }
        other => panic!("expected a size mismatch, got {other:?}"),
    }
    assert!(wad.read(xxh64(MINIMAP)).is_ok());
}

#[test]
fn damaged_entries_pass_through_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let entries = damaged_entries();
    let install = fake_install(dir.path(), &[("UI.wad.client", handmade_wad(&entries))]);
    let root = patch::locate_wad_root(&install).unwrap();

    let options = PatchOptions::new(TargetWidth::new(2560).unwrap()).threads(Threads::Single);
    let patcher = Patcher::new(|_: &Entry| true, options).unwrap();
    let mut sink = PackagedModSink::new(dir.path().join("out"));
    let summary = patcher.run(&root, &mut sink, &mut NoProgress).unwrap();

    assert!(summary.failed_containers.is_empty());
    assert_eq!(summary.modified_entries(), 1);
    assert_eq!(summary.failed_entries(), 3);

    let path = sink.mod_folder().unwrap().join("WAD/UI.wad.client");
    let mut wad = Wad::open_path(path).unwrap();
    assert_eq!(wad.len(), 4);
    for (path_hash, compression, stored, _) in &entries[1..] {
        assert_eq!(&wad.read_raw(*path_hash).unwrap(), stored);
        assert_eq!(
            wad.entry(*path_hash).unwrap().compression(),
            Some(*compression)
        );
    }
    let tree = BinTree::from_bytes(wad.read(xxh64(MINIMAP)).unwrap()).unwrap();
    assert_eq!(tree.objects().len(), 2);
}

/// A bin whose only object holds one container property with the given
/// item kind, declared size, declared count and body bytes.
fn container_bin(item: PropertyKind, size: u32, count: u32, body: &[u8]) -> Vec<u8> {
    let mut data = b"PROP".to_vec();
    data.extend_from_slice(&1u32.to_le_bytes()); // version
    data.extend_from_slice(&1u32.to_le_bytes()); // one object
    data.extend_from_slice(&0x1111_1111u32.to_le_bytes()); // class hash
    data.extend_from_slice(&(20 + body.len() as u32).to_le_bytes());
    data.extend_from_slice(&0x2222_2222u32.to_le_bytes()); // path hash
    data.extend_from_slice(&1u16.to_le_bytes()); // one property
    data.extend_from_slice(&0x3333_3333u32.to_le_bytes()); // name hash
    data.push(PropertyKind::Container.tag());
    data.push(item.tag());
    data.extend_from_slice(&size.to_le_bytes());
    data.extend_from_slice(&count.to_le_bytes());
    data.extend_from_slice(body);
    data
}

#[test]
fn runaway_item_count_is_rejected_quickly() {
    let data = container_bin(PropertyKind::None, 4, u32::MAX, &[]);
    assert_eq!(data.len(), 40);

    let started = Instant::now();
    let err = BinTree::read(&data).unwrap_err();
    assert!(matches!(err, Error::EntryFormat { .. }));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn runaway_item_count_passes_through_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let runaway = container_bin(PropertyKind::None, 4, u32::MAX, &[]);
    let bin = movable_bin();
    let wad = handmade_wad(&[
        (xxh64(MINIMAP), Compression::None, bin.clone(), bin.len() as u32),
        (xxh64(SHORT), Compression::None, runaway.clone(), runaway.len() as u32),
    ]);
    let install = fake_install(dir.path(), &[("UI.wad.client", wad)]);
    let root = patch::locate_wad_root(&install).unwrap();

    let options = PatchOptions::new(TargetWidth::new(2560).unwrap()).threads(Threads::Single);
    let patcher = Patcher::new(|_: &Entry| true, options).unwrap();
    let mut sink = PackagedModSink::new(dir.path().join("out"));
    let summary = patcher.run(&root, &mut sink, &mut NoProgress).unwrap();

    assert_eq!(summary.modified_entries(), 1);
    assert_eq!(summary.failed_entries(), 1);
    let path = sink.mod_folder().unwrap().join("WAD/UI.wad.client");
    let mut wad = Wad::open_path(path).unwrap();
    assert_eq!(wad.read(xxh64(SHORT)).unwrap(), runaway);
}

#[test]
fn not_a_container() {
    let err = Wad::open(Cursor::new(b"PROP\x03\x00\x00\x00".to_vec())).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));
}

#[test]
fn toc_past_end_of_file() {
    let mut data = Vec::new();
    WadHeader::v3(4, 5).write(&mut data).unwrap();
    let err = Wad::open(Cursor::new(data)).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader { .. }));
}

#[test]
fn payload_past_end_of_file() {
    let mut data = handmade_wad(&[(1, Compression::None, b"abcdef".to_vec(), 6)]);
    data.truncate(data.len() - 2);
    let err = Wad::open(Cursor::new(data)).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader { .. }));
}

proptest! {
    /// Arbitrary bytes behind a valid magic never panic the container reader.
    #[test]
    fn open_never_panics(tail in prop::collection::vec(any::<u8>(), 0..512), minor in 0u8..5) {
        let mut data = vec![b'R', b'W', 3, minor];
        data.extend_from_slice(&tail);
        if let Ok(mut wad) = Wad::open(Cursor::new(data)) {
            let hashes: Vec<u64> = wad.entries().iter().map(|e| e.path_hash).collect();
            for path_hash in hashes {
                let _ = wad.read(path_hash);
                let _ = wad.content_type(path_hash);
            }
        }
    }

    /// Declared sizes and counts that disagree with the body are rejected
    /// without walking the declared count.
    #[test]
    fn lying_container_headers_are_rejected(
        item in prop_oneof![
            Just(PropertyKind::None),
            Just(PropertyKind::U8),
            Just(PropertyKind::U16),
            Just(PropertyKind::Vector4),
            Just(PropertyKind::String),
        ],
        size in any::<u32>(),
        count in any::<u32>(),
        body in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let data = container_bin(item, size, count, &body);
        let started = Instant::now();
        let decoded = BinTree::read(&data);
        prop_assert!(started.elapsed() < Duration::from_secs(1));

        let min_item = match item {
            PropertyKind::String => 2,
            PropertyKind::U16 => 2,
            PropertyKind::Vector4 => 16,
            _ => 1,
        };
        let fits_body = size as usize == 4 + body.len();
        let fits_count = (count as usize).saturating_mul(min_item) <= body.len();
        if !fits_body || !fits_count {
            prop_assert!(decoded.is_err());
        }
    }
}
