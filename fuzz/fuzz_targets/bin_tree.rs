//! Fuzz target for the property bin decoder.
//!
//! Anything that decodes must re-encode to the same bytes, and recentering
//! must not panic on whatever layout values the input carries.
//!
//! Run with: cargo +nightly fuzz run bin_tree

#![no_main]

use libfuzzer_sys::fuzz_target;
use widefix::patch::transform;
use widefix::{BinTree, TargetWidth};

fuzz_target!(|data: &[u8]| {
    let Ok(mut tree) = BinTree::read(data) else {
        return;
    };
    let encoded = tree.to_bytes().expect("decoded tree re-encodes");
    assert_eq!(encoded, data);

    let target = TargetWidth::new(3440).expect("valid width");
    if transform::recenter_tree(&mut tree, target) > 0 {
        let patched = tree.to_bytes().expect("patched tree re-encodes");
        BinTree::read(&patched).expect("patched tree decodes");
    }
});
