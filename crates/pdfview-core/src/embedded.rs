//! Embedded file records.

/// A file embedded in the document.
///
/// All fields except the name are optional since documents frequently omit
/// the description and date entries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbeddedFileRecord {
    /// File name as recorded in the document.
    pub name: String,
    /// Human-readable description, if present.
    pub description: Option<String>,
    /// Uncompressed size in bytes, if recorded.
    pub size: Option<usize>,
    /// Creation date (raw PDF date string), if recorded.
    pub created: Option<String>,
    /// Modification date (raw PDF date string), if recorded.
    pub modified: Option<String>,
}
