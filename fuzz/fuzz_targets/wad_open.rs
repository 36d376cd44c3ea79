//! Fuzz target for Wad::open with arbitrary byte input.
//!
//! Opens the input as a container and reads every entry it lists, looking
//! for panics, hangs or runaway allocations in header, TOC and codec code.
//!
//! Run with: cargo +nightly fuzz run wad_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let Ok(mut wad) = widefix::Wad::open(Cursor::new(data)) else {
        return;
    };
    let hashes: Vec<u64> = wad.entries().iter().map(|e| e.path_hash).collect();
    for path_hash in hashes {
        let _ = wad.content_type(path_hash);
        let _ = wad.read(path_hash);
    }
});
