//! Name and path hashing.
//!
//! Property tree names (property names, class names, object paths) are keyed
//! by a 32-bit FNV-1a hash and container entries by a 64-bit XXH64 hash. Both
//! are computed over the lower-cased UTF-8 bytes of the input, so `"mRect"`
//! and `"mrect"` hash identically.
//!
//! The lookup tables this crate consults are built from these functions, and
//! so are the tables of every other tool in the modding ecosystem. A string
//! whose hash is absent from a table is simply not matched; nothing here
//! can fail.
//!
//! # Example
//!
//! ```rust
//! use widefix::hash;
//!
//! assert_eq!(hash::fnv1a("mRect"), hash::fnv1a("MRECT"));
//! assert_eq!(hash::fnv1a("mRect"), hash::fnv1a_const("mRect"));
//!
//! let path = hash::xxh64("ux/renderui/shared_renderui.bin");
//! assert_eq!(path, hash::xxh64("UX/RenderUI/Shared_RenderUI.bin"));
//! ```

use xxhash_rust::xxh64::xxh64 as xxh64_raw;

/// FNV-1a 32-bit offset basis.
pub const FNV1A_OFFSET: u32 = 0x811C_9DC5;

/// FNV-1a 32-bit prime.
pub const FNV1A_PRIME: u32 = 0x0100_0193;

/// Computes the case-insensitive FNV-1a hash of a property, class or object name.
pub fn fnv1a(name: &str) -> u32 {
    let lowered = name.to_lowercase();
    fnv1a_bytes(lowered.as_bytes())
}

/// Computes the FNV-1a hash of raw bytes without case folding.
pub fn fnv1a_bytes(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV1A_OFFSET, |hash, &b| {
        (hash ^ b as u32).wrapping_mul(FNV1A_PRIME)
    })
}

/// Compile-time variant of [`fnv1a`].
///
/// Only ASCII letters are folded, which matches [`fnv1a`] for every ASCII
/// name. Use it to declare property name hashes as constants.
pub const fn fnv1a_const(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV1A_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i].to_ascii_lowercase();
        hash = (hash ^ b as u32).wrapping_mul(FNV1A_PRIME);
        i += 1;
    }
    hash
}

/// Computes the case-insensitive XXH64 (seed 0) hash of a container entry path.
pub fn xxh64(path: &str) -> u64 {
    let lowered = path.to_lowercase();
    xxh64_raw(lowered.as_bytes(), 0)
}
