//! Entry checksum computation.
//!
//! Every table-of-contents entry of a WAD 2.x/3.x container carries a 64-bit
//! checksum of its stored (compressed) bytes. Which algorithm produced it
//! depends on the container version:
//!
//! | Version | Checksum |
//! |---------|----------|
//! | 2.x, 3.0 | first 8 bytes of SHA-256, little endian |
//! | 3.1+ | XXH3-64 |
//!
//! Downstream loaders validate these strictly, so a rebuilt container either
//! keeps an entry's checksum (same kind) or recomputes it.
//!
//! # Example
//!
//! ```rust
//! use widefix::checksum::{Checksum, ChecksumKind, Xxh3};
//!
//! // Incremental computation
//! let mut hasher = Xxh3::new();
//! hasher.update(b"Hello, ");
//! hasher.update(b"World!");
//! let value = hasher.finalize();
//!
//! // One-shot computation
//! assert_eq!(value, Xxh3::compute(b"Hello, World!"));
//! assert_eq!(value, ChecksumKind::Xxh3.compute(b"Hello, World!"));
//! ```

use sha2::{Digest, Sha256};

/// Common trait for entry checksum computation.
pub trait Checksum: Default + Clone {
    /// Creates a new checksum calculator.
    fn new() -> Self;

    /// Updates the checksum with additional data.
    fn update(&mut self, data: &[u8]);

    /// Finishes the checksum computation and returns the value.
    fn finalize(&self) -> u64;

    /// Resets the checksum to its initial state.
    fn reset(&mut self);

    /// Computes the checksum of a single slice in one call.
    fn compute(data: &[u8]) -> u64 {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// XXH3-64 checksum calculator (WAD 3.1 and later).
#[derive(Clone)]
pub struct Xxh3 {
    hasher: xxhash_rust::xxh3::Xxh3,
}

impl Default for Xxh3 {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Xxh3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xxh3")
            .field("current", &self.hasher.digest())
            .finish()
    }
}

impl Checksum for Xxh3 {
    fn new() -> Self {
        Self {
            hasher: xxhash_rust::xxh3::Xxh3::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(&self) -> u64 {
        self.hasher.digest()
    }

    fn reset(&mut self) {
        self.hasher.reset();
    }
}

/// Truncated SHA-256 checksum calculator (WAD 2.x and 3.0).
///
/// The checksum is the first 8 bytes of the digest read as a little-endian
/// `u64`.
#[derive(Clone, Default)]
pub struct Sha256Prefix {
    hasher: Sha256,
}

impl std::fmt::Debug for Sha256Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Prefix").finish_non_exhaustive()
    }
}

impl Checksum for Sha256Prefix {
    fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn finalize(&self) -> u64 {
        let digest = self.hasher.clone().finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(prefix)
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.hasher);
    }
}

/// Checksum algorithm used by a container's table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumKind {
    /// Truncated SHA-256.
    Sha256,
    /// XXH3-64.
    #[default]
    Xxh3,
}

impl ChecksumKind {
    /// Returns the checksum kind implied by a container version.
    ///
    /// Version 1 containers carry no checksums; they are reported as `None`.
    pub fn for_version(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (1, _) => None,
            (2, _) | (3, 0) => Some(Self::Sha256),
            _ => Some(Self::Xxh3),
        }
    }

    /// Computes a checksum of `data` with this algorithm.
    pub fn compute(self, data: &[u8]) -> u64 {
        match self {
            Self::Sha256 => Sha256Prefix::compute(data),
            Self::Xxh3 => Xxh3::compute(data),
        }
    }
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "SHA-256"),
            Self::Xxh3 => write!(f, "XXH3"),
        }
    }
}
