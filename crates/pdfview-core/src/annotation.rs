//! Abstract annotation records.
//!
//! Provides [`AnnotationRecord`] and [`AnnotationKind`] for representing
//! native annotations in the host viewer model, plus [`AnnotationId`], the
//! stable abstract-side identity used to replay edits onto native objects.

use crate::Rect;

/// Stable identity of an abstract annotation record.
///
/// Identity mapping between abstract records and native objects is kept in an
/// explicit bidirectional table keyed by this id, so records carry no
/// back-reference to backend objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotationId(pub u64);

/// Annotation subtypes the viewer model represents.
///
/// Native subtypes outside this set are skipped during conversion and counted
/// in the session diagnostics; skipping is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnotationKind {
    /// Text annotation (sticky note).
    Text,
    /// Free text annotation (directly displayed text).
    FreeText,
    /// Highlight markup.
    Highlight,
    /// Underline markup.
    Underline,
    /// Strikeout markup.
    StrikeOut,
    /// Squiggly-underline markup.
    Squiggly,
    /// Stamp annotation.
    Stamp,
    /// Ink annotation (freehand drawing).
    Ink,
    /// Caret annotation.
    Caret,
    /// File attachment annotation.
    FileAttachment,
    /// Widget annotation (form field visual).
    Widget,
}

impl AnnotationKind {
    /// Classify a native `/Subtype` name.
    ///
    /// Returns `None` for subtypes the viewer model does not represent; the
    /// converter skips those and bumps a diagnostics counter.
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "Text" => Some(Self::Text),
            "FreeText" => Some(Self::FreeText),
            "Highlight" => Some(Self::Highlight),
            "Underline" => Some(Self::Underline),
            "StrikeOut" => Some(Self::StrikeOut),
            "Squiggly" => Some(Self::Squiggly),
            "Stamp" => Some(Self::Stamp),
            "Ink" => Some(Self::Ink),
            "Caret" => Some(Self::Caret),
            "FileAttachment" => Some(Self::FileAttachment),
            "Widget" => Some(Self::Widget),
            _ => None,
        }
    }
}

/// An abstract annotation record exposed to the host viewer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotationRecord {
    /// Stable abstract-side identity; key into the identity map.
    pub id: AnnotationId,
    /// The annotation kind.
    pub kind: AnnotationKind,
    /// Bounding box on the page.
    pub area: Rect,
    /// Text contents, if any.
    pub contents: Option<String>,
    /// Author, if recorded.
    pub author: Option<String>,
    /// Modification date (raw PDF date string), if recorded.
    pub modified: Option<String>,
}
