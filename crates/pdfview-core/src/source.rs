//! Source positions for source synchronization.

/// A position in an external source document (e.g. a typesetting source
/// file). The result type of reverse source-sync queries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePosition {
    /// Source file, as recorded in the sync index.
    pub file: String,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column, when the index records one.
    pub column: Option<usize>,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
        }
    }
}
