//! Error types for container, property tree and patch operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of widefix, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Scope
//!
//! Errors are classified by how far their damage reaches during a batch run:
//!
//! | Scope | Variants | Effect on a batch |
//! |-------|----------|-------------------|
//! | Configuration | [`Configuration`][Error::Configuration] | Fatal, raised before any I/O |
//! | Container | [`ContainerNotFound`][Error::ContainerNotFound], [`InvalidFormat`][Error::InvalidFormat], [`CorruptHeader`][Error::CorruptHeader] | The container is skipped |
//! | Entry | [`EntryFormat`][Error::EntryFormat], [`UnsupportedCompression`][Error::UnsupportedCompression], [`Decompression`][Error::Decompression], [`SizeMismatch`][Error::SizeMismatch], [`Encode`][Error::Encode] | The entry passes through unmodified |
//!
//! ```rust
//! use widefix::Error;
//!
//! fn describe(error: &Error) -> &'static str {
//!     if error.is_configuration() {
//!         "fix the command line and try again"
//!     } else if error.is_container_local() {
//!         "container skipped"
//!     } else if error.is_entry_local() {
//!         "entry left untouched"
//!     } else {
//!         "unexpected failure"
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// The main error type for widefix operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The run was configured with unusable parameters.
    ///
    /// Raised for a target width at or below the reference width, or for an
    /// install path that does not lead to the game's WAD folder. Configuration
    /// errors are reported once, before any container is touched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A container file does not exist.
    #[error("Container not found: {}", path.display())]
    ContainerNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The container is not a WAD file or uses an unknown version.
    #[error("Invalid WAD format: {0}")]
    InvalidFormat(String),

    /// The container header or table of contents is corrupt or truncated.
    #[error("Corrupt header at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// A requested path hash is absent from the container.
    ///
    /// This is not a failure of the container itself: the orchestrator treats
    /// it as "zero candidates".
    #[error("Entry not found: {path_hash:016x}")]
    EntryNotFound {
        /// The path hash that was not found.
        path_hash: u64,
    },

    /// An entry with the same path hash was already added to a writer.
    #[error("Entry already exists: {path_hash:016x}")]
    EntryExists {
        /// The duplicated path hash.
        path_hash: u64,
    },

    /// An entry payload is not a well-formed property tree.
    #[error("Malformed property tree at offset {offset:#x}: {reason}")]
    EntryFormat {
        /// Byte offset inside the decompressed payload.
        offset: u64,
        /// A description of what was expected vs. found.
        reason: String,
    },

    /// The entry uses a compression kind this build cannot handle.
    #[error("Unsupported compression {id} for entry {path_hash:016x}")]
    UnsupportedCompression {
        /// Path hash of the entry.
        path_hash: u64,
        /// Raw compression id from the table of contents.
        id: u8,
    },

    /// A feature required by the container is not supported.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// Decompressed data does not have the size declared by the table of contents.
    #[error("Size mismatch for entry {path_hash:016x}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Path hash of the entry.
        path_hash: u64,
        /// Declared uncompressed size.
        expected: u64,
        /// Actual decompressed size.
        actual: u64,
    },

    /// The stored bytes of an entry could not be decompressed.
    #[error("Decompression failed for entry {path_hash:016x}: {source}")]
    Decompression {
        /// Path hash of the entry.
        path_hash: u64,
        /// The codec error.
        source: io::Error,
    },

    /// A value could not be serialized in its wire format.
    ///
    /// Raised when a string, container or struct outgrows its length field.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Mod metadata could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The operation was cancelled by the user.
    ///
    /// Cancellation is only observed between containers, so every container
    /// that was started has been completed or skipped as a whole.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` if this error aborts the whole run before any I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Returns `true` if this error only affects the container being processed.
    ///
    /// The orchestrator logs these and continues with the next container.
    pub fn is_container_local(&self) -> bool {
        matches!(
            self,
            Error::ContainerNotFound { .. }
                | Error::InvalidFormat(_)
                | Error::CorruptHeader { .. }
                | Error::UnsupportedFeature { .. }
        )
    }

    /// Returns `true` if this error only affects a single entry.
    ///
    /// The orchestrator falls back to the entry's original bytes.
    pub fn is_entry_local(&self) -> bool {
        matches!(
            self,
            Error::EntryFormat { .. }
                | Error::EntryNotFound { .. }
                | Error::UnsupportedCompression { .. }
                | Error::Decompression { .. }
                | Error::SizeMismatch { .. }
                | Error::Encode(_)
        )
    }

    /// Returns the path hash associated with this error, if any.
    pub fn path_hash(&self) -> Option<u64> {
        match self {
            Error::EntryNotFound { path_hash }
            | Error::EntryExists { path_hash }
            | Error::UnsupportedCompression { path_hash, .. }
            | Error::Decompression { path_hash, .. }
            | Error::SizeMismatch { path_hash, .. } => Some(*path_hash),
            _ => None,
        }
    }

    pub(crate) fn entry_format(offset: usize, reason: impl Into<String>) -> Self {
        Error::EntryFormat {
            offset: offset as u64,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for widefix operations.
pub type Result<T> = std::result::Result<T, Error>;
