//! Link records and actions.
//!
//! Provides [`LinkRecord`] and [`LinkAction`] for representing active regions
//! on a page, and the two-phase media reference types [`MediaRefId`] /
//! [`MediaResolution`]. A media link is created pointing at an embedded-file
//! *name* before embedded files are enumerated; resolution to a concrete
//! [`EmbeddedFileRecord`] happens later, and a reference that never resolves
//! degrades to a no-op rather than an error.

use crate::{DocumentViewport, EmbeddedFileRecord, Rect};

/// Identity of a deferred media reference held by a [`LinkAction::Media`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaRefId(pub u64);

/// Resolution state of a media reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaResolution {
    /// Phase 1: the reference names an embedded file not yet enumerated.
    Pending {
        /// Name of the embedded file the action refers to.
        file_name: String,
    },
    /// Phase 2: resolved to a concrete embedded file.
    Resolved(EmbeddedFileRecord),
    /// Resolution failed after embedded files were enumerated. Activating
    /// the action is a no-op; this is a normal terminal state.
    Unresolvable,
}

impl MediaResolution {
    /// Returns `true` once the reference has reached a terminal state
    /// (resolved or unresolvable).
    pub fn is_settled(&self) -> bool {
        !matches!(self, MediaResolution::Pending { .. })
    }
}

/// What activating a link does.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkAction {
    /// Jump to a viewport within this document.
    Goto { viewport: DocumentViewport },
    /// Open another document, optionally at a viewport.
    GotoExternal {
        file: String,
        viewport: Option<DocumentViewport>,
    },
    /// Open a URI.
    Uri { uri: String },
    /// A named action interpreted by the host viewer (e.g. "NextPage").
    Named { name: String },
    /// Launch an external application.
    Execute { command: String },
    /// Play embedded media; resolution of the reference is deferred.
    Media { reference: MediaRefId },
}

/// An active region on a page paired with its action.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkRecord {
    /// Sensitive area on the page.
    pub area: Rect,
    /// Action performed on activation.
    pub action: LinkAction,
}
