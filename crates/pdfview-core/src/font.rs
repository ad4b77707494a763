//! Font records from the incremental per-page font scan.

/// PDF font family classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontKind {
    Type1,
    Type1C,
    Type3,
    TrueType,
    CidType0,
    CidTrueType,
    /// Unrecognized native classification, preserved verbatim.
    Unknown(String),
}

impl FontKind {
    /// Classify a native font-type name.
    pub fn from_native(name: &str) -> Self {
        match name {
            "Type1" => Self::Type1,
            "Type1C" => Self::Type1C,
            "Type3" => Self::Type3,
            "TrueType" => Self::TrueType,
            "CIDFontType0" => Self::CidType0,
            "CIDFontType2" => Self::CidTrueType,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A font discovered on some page of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontRecord {
    /// Font name; `None` for anonymous (usually Type3) fonts.
    pub name: Option<String>,
    /// Font family classification.
    pub kind: FontKind,
    /// Whether the font program is embedded in the document.
    pub embedded: bool,
}

/// Result of one step of the incremental font scan.
///
/// Each call to the scan advances the page cursor by one and reports both the
/// fonts first seen on that page and the accumulated set so far. Once the
/// cursor reaches the page count, `discovered` stays empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FontIncrement {
    /// Fonts first discovered by this scan step.
    pub discovered: Vec<FontRecord>,
    /// All fonts discovered since the session opened (or was reset).
    pub all: Vec<FontRecord>,
    /// Number of pages scanned so far.
    pub scanned_pages: usize,
}
