//! Interactive form field records.
//!
//! Provides [`FormField`] and [`FormFieldKind`] for representing native form
//! fields in the host viewer model.

use crate::Rect;

/// Button field flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonKind {
    Push,
    CheckBox,
    Radio,
}

/// The kind of a form field, with kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormFieldKind {
    /// Text input.
    Text { multiline: bool },
    /// Push button, checkbox, or radio button.
    Button(ButtonKind),
    /// Dropdown or list box.
    Choice {
        options: Vec<String>,
        editable: bool,
    },
    /// Digital signature field.
    Signature,
}

impl FormFieldKind {
    /// Classify a native `/FT` name. Flag bits refine the kind:
    /// multiline for text fields, push/radio for buttons, edit for choices.
    ///
    /// Returns `None` for unrecognized field types; the converter skips
    /// those and bumps a diagnostics counter.
    pub fn from_native(field_type: &str, flags: u32) -> Option<Self> {
        const FLAG_MULTILINE: u32 = 1 << 12;
        const FLAG_RADIO: u32 = 1 << 15;
        const FLAG_PUSH: u32 = 1 << 16;
        const FLAG_EDIT: u32 = 1 << 18;
        match field_type {
            "Tx" => Some(Self::Text {
                multiline: flags & FLAG_MULTILINE != 0,
            }),
            "Btn" => Some(Self::Button(if flags & FLAG_PUSH != 0 {
                ButtonKind::Push
            } else if flags & FLAG_RADIO != 0 {
                ButtonKind::Radio
            } else {
                ButtonKind::CheckBox
            })),
            "Ch" => Some(Self::Choice {
                options: Vec::new(),
                editable: flags & FLAG_EDIT != 0,
            }),
            "Sig" => Some(Self::Signature),
            _ => None,
        }
    }
}

/// A form field exposed to the host viewer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormField {
    /// Fully qualified field name.
    pub name: String,
    /// Field kind and kind-specific data.
    pub kind: FormFieldKind,
    /// Current value, if any.
    pub value: Option<String>,
    /// Whether the field rejects user edits.
    pub read_only: bool,
    /// Widget area on the page.
    pub area: Rect,
}
