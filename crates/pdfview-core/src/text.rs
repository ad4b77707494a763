//! Positioned text fragments.

use crate::Rect;

/// One positioned text fragment from a page, as extracted by the backend.
///
/// Spans arrive in reading order; concatenating their `text` fields in
/// sequence reproduces the page text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextSpan {
    /// Bounding box of the fragment on the page.
    pub area: Rect,
    /// The fragment text.
    pub text: String,
}

impl TextSpan {
    pub fn new(area: Rect, text: impl Into<String>) -> Self {
        Self {
            area,
            text: text.into(),
        }
    }
}
