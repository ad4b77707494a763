//! Internal error type for sidecar parsing.
//!
//! [`SyncError`] never crosses the crate boundary: a sidecar that is missing
//! or malformed degrades to "source sync unavailable" at the public surface.

use thiserror::Error;

/// Why a sidecar index failed to parse.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sidecar file could not be read.
    #[error("I/O error reading sync data: {0}")]
    Io(#[from] std::io::Error),

    /// A line did not match the expected record grammar.
    #[error("malformed sync data at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// The sidecar declares a format version this parser does not know.
    #[error("unsupported sync format version: {0}")]
    UnsupportedVersion(String),
}

impl SyncError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}
