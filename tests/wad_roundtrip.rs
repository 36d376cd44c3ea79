//! Container write-then-mount tests.

mod common;

use std::io::Cursor;

use widefix::checksum::ChecksumKind;
use widefix::codec::Compression;
use widefix::hash::xxh64;
use widefix::{ContentType, EntryInput, Error, Wad, WadWriter, WriteOptions};

use common::{build_wad, build_wad_with, movable_bin};

fn sample() -> Vec<(u64, Vec<u8>)> {
    vec![
        (xxh64("ux/renderui/shared_renderui.bin"), movable_bin()),
        (xxh64("assets/a.dds"), b"DDS \x7c\x00\x00\x00".repeat(20)),
        (xxh64("assets/b.png"), b"\x89PNG\r\n\x1a\n".to_vec()),
        (xxh64("empty.bin"), Vec::new()),
    ]
}

fn as_refs(entries: &[(u64, Vec<u8>)]) -> Vec<(u64, &[u8])> {
    entries.iter().map(|(h, d)| (*h, d.as_slice())).collect()
}

#[test]
fn every_compression_reads_back() {
    let entries = sample();
    for compression in [Compression::None, Compression::Gzip, Compression::Zstd] {
        let options = WriteOptions::new().compression(compression);
        let bytes = build_wad_with(options, &as_refs(&entries));
        let mut wad = Wad::open(Cursor::new(bytes)).unwrap();

        assert_eq!(wad.len(), entries.len());
        for (path_hash, data) in &entries {
            assert_eq!(&wad.read(*path_hash).unwrap(), data, "{compression}");
            assert_eq!(
                wad.entry(*path_hash).unwrap().compression(),
                Some(compression)
            );
        }
    }
}

#[test]
fn content_types_are_detected() {
    let bytes = build_wad(&as_refs(&sample()));
    let mut wad = Wad::open(Cursor::new(bytes)).unwrap();

    let cases = [
        ("ux/renderui/shared_renderui.bin", ContentType::PropertyBin),
        ("assets/a.dds", ContentType::Dds),
        ("assets/b.png", ContentType::Png),
        ("empty.bin", ContentType::Unknown),
    ];
    for (path, expected) in cases {
        assert_eq!(wad.content_type(xxh64(path)).unwrap(), expected, "{path}");
    }
    assert_eq!(wad.peek(xxh64("assets/a.dds"), 4).unwrap(), b"DDS ");
}

#[test]
fn raw_copy_between_containers() {
    let entries = sample();
    let gzip = WriteOptions::new()
        .compression(Compression::Gzip)
        .checksum(ChecksumKind::Sha256);
    let mut source = Wad::open(Cursor::new(build_wad_with(gzip, &as_refs(&entries)))).unwrap();
    assert_eq!(source.version(), (3, 0));
    assert_eq!(source.checksum_kind(), Some(ChecksumKind::Sha256));

    // Same checksum kind: stored bytes and checksums are kept as they are
    let mut out = Vec::new();
    let mut writer = WadWriter::new(&mut out, WriteOptions::new().checksum(ChecksumKind::Sha256));
    for entry in source.entries().to_vec() {
        let raw = source.read_entry_raw(&entry).unwrap();
        writer
            .add(entry.path_hash, EntryInput::raw(entry, raw, source.checksum_kind()))
            .unwrap();
    }
    let result = writer.finish().unwrap();
    assert_eq!(result.checksums_recomputed, 0);
    assert_eq!(result.entries_encoded, 0);

    let mut copy = Wad::open(Cursor::new(out)).unwrap();
    for (path_hash, data) in &entries {
        let original = source.entry(*path_hash).unwrap().clone();
        let copied = copy.entry(*path_hash).unwrap().clone();
        assert_eq!(copied.checksum, original.checksum);
        assert_eq!(copied.compression(), Some(Compression::Gzip));
        assert_eq!(&copy.read(*path_hash).unwrap(), data);
    }
}

#[test]
fn checksums_recomputed_for_other_kind() {
    let entries = sample();
    let mut source = Wad::open(Cursor::new(build_wad(&as_refs(&entries)))).unwrap();
    assert_eq!(source.checksum_kind(), Some(ChecksumKind::Xxh3));

    let mut out = Vec::new();
    let mut writer = WadWriter::new(&mut out, WriteOptions::new().checksum(ChecksumKind::Sha256));
    for entry in source.entries().to_vec() {
        let raw = source.read_entry_raw(&entry).unwrap();
        writer
            .add(entry.path_hash, EntryInput::raw(entry, raw, source.checksum_kind()))
            .unwrap();
    }
    assert_eq!(writer.finish().unwrap().checksums_recomputed, entries.len());

    let copy = Wad::open(Cursor::new(out.clone())).unwrap();
    for entry in copy.entries() {
        let range = entry.data_range();
        let stored = &out[range.start as usize..range.end as usize];
        assert_eq!(entry.checksum, ChecksumKind::Sha256.compute(stored));
    }
}

#[test]
fn missing_entry() {
    let bytes = build_wad(&[(1, b"one")]);
    let mut wad = Wad::open(Cursor::new(bytes)).unwrap();
    assert!(matches!(wad.read(2), Err(Error::EntryNotFound { path_hash: 2 })));
    assert!(!wad.contains(2));
}
