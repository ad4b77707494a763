//! Document backend trait.
//!
//! Defines [`DocumentBackend`], the interface this crate consumes from a
//! native PDF library. A backend parses documents and produces rasters,
//! positioned text, and native object records; everything viewer-facing
//! (abstract records, identity tracking, caching, sync) lives on top.
//!
//! Native records are plain structs carrying raw subtype strings, so the
//! converter owns all classification and can skip what it does not support.

use std::path::Path;

use bitflags::bitflags;
use pdfview_core::{
    Permissions, Raster, Rect, RenderFlags, Rotation, SaveOptions, TextSpan,
};
use thiserror::Error;

/// Why a backend refused to open a document.
///
/// `PasswordRequired` and `BadPassword` are distinct so the session can
/// report a recoverable password demand rather than a generic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendOpenError {
    /// The document is encrypted and needs a password.
    #[error("document requires a password")]
    PasswordRequired,
    /// The supplied password was rejected.
    #[error("password rejected")]
    BadPassword,
    /// The data is not a readable document.
    #[error("malformed document: {0}")]
    Malformed(String),
    /// The source could not be read.
    #[error("I/O error: {0}")]
    Io(String),
}

bitflags! {
    /// Optional capabilities a backend may implement.
    ///
    /// Queried once per session; the session adapts its locking and its
    /// capability answers to what the backend provides.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BackendCapabilities: u32 {
        /// Distinct pages may be rendered from different threads at once.
        /// Without this, the session serializes all rendering.
        const CONCURRENT_PAGE_RENDERING = 1;
        /// `page_text` produces usable positioned text.
        const TEXT_EXTRACTION = 1 << 1;
        /// `save_document` is implemented.
        const SAVE = 1 << 2;
        /// `font_data` can return embedded font programs.
        const FONT_DATA = 1 << 3;
    }
}

/// A native annotation as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeAnnotation {
    /// Backend object identity, stable for the document's lifetime.
    pub object_id: u64,
    /// Raw subtype name (e.g. "Highlight", "3D").
    pub subtype: String,
    /// Bounding box on the page.
    pub area: Rect,
    pub contents: Option<String>,
    pub author: Option<String>,
    pub modified: Option<String>,
}

/// What a native link does when activated.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeLinkAction {
    /// Jump within the document.
    GotoPage {
        page: usize,
        x: Option<f64>,
        y: Option<f64>,
    },
    /// Open another document.
    GotoFile { file: String, page: Option<usize> },
    /// Open a URI.
    Uri(String),
    /// A named viewer action.
    Named(String),
    /// Launch an application.
    Execute(String),
    /// Play media stored as an embedded file, referenced by name.
    Media { embedded_file: Option<String> },
    /// An action kind this adapter does not represent.
    Other(String),
}

/// A native link region.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeLink {
    pub area: Rect,
    pub action: NativeLinkAction,
}

/// A native form field.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeFormField {
    /// Fully qualified field name.
    pub name: String,
    /// Raw field type name (e.g. "Tx", "Btn").
    pub field_type: String,
    /// Raw field flag bits.
    pub flags: u32,
    pub value: Option<String>,
    pub options: Vec<String>,
    pub read_only: bool,
    pub area: Rect,
}

/// A native page transition.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTransition {
    /// Raw style name (e.g. "Dissolve").
    pub style: String,
    pub duration_secs: f64,
}

/// One node of the native outline tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeOutlineNode {
    pub title: String,
    /// Destination page, if the entry points into this document.
    pub page: Option<usize>,
    /// Vertical position on the destination page, if recorded.
    pub top: Option<f64>,
    /// External destination, if the entry points at another file.
    pub external: Option<String>,
    pub children: Vec<NativeOutlineNode>,
}

/// A native embedded-file entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEmbeddedFile {
    pub name: String,
    pub description: Option<String>,
    pub size: Option<usize>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// A native font description from a page scan.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeFontInfo {
    pub name: Option<String>,
    /// Raw font type name (e.g. "Type1", "CIDFontType2").
    pub kind: String,
    pub embedded: bool,
}

/// Interface consumed from the native document library.
///
/// All methods are stateless over `&Document`; the session owns the handle
/// and layers caching, identity tracking, and cancellation on top. Backends
/// must tolerate concurrent calls on distinct pages only when they advertise
/// [`BackendCapabilities::CONCURRENT_PAGE_RENDERING`]; the session never
/// issues concurrent calls against the same page.
pub trait DocumentBackend {
    /// The open native document handle.
    type Document: Send + Sync;

    /// Backend-specific error type; wrapped before leaving the session.
    type Error: std::error::Error;

    /// Open a document, optionally with a password.
    fn open(path: &Path, password: Option<&str>) -> Result<Self::Document, BackendOpenError>;

    /// Capabilities of this backend for an open document.
    ///
    /// Queried once at session open; answers must not change afterward.
    fn capabilities(doc: &Self::Document) -> BackendCapabilities;

    /// Number of pages; page indices are `0..count` and stable.
    fn page_count(doc: &Self::Document) -> usize;

    /// Page size in points.
    fn page_size(doc: &Self::Document, page: usize) -> (f64, f64);

    /// Rasterize one page.
    ///
    /// # Errors
    ///
    /// Returns the backend's own error on render failure; the session wraps
    /// it as `RenderError::BackendFailure`.
    fn render_page(
        doc: &Self::Document,
        page: usize,
        width: u32,
        height: u32,
        rotation: Rotation,
        flags: RenderFlags,
    ) -> Result<Raster, Self::Error>;

    /// Extract positioned text spans from a page, in reading order.
    ///
    /// # Errors
    ///
    /// Returns the backend's own error on extraction failure.
    fn page_text(doc: &Self::Document, page: usize) -> Result<Vec<TextSpan>, Self::Error>;

    /// Annotations on a page, in document order.
    fn page_annotations(doc: &Self::Document, page: usize) -> Vec<NativeAnnotation>;

    /// Link regions on a page.
    fn page_links(doc: &Self::Document, page: usize) -> Vec<NativeLink>;

    /// Form fields on a page.
    fn page_form_fields(doc: &Self::Document, page: usize) -> Vec<NativeFormField>;

    /// The page's presentation transition, if any.
    fn page_transition(doc: &Self::Document, page: usize) -> Option<NativeTransition>;

    /// The document outline tree; empty if the document has none.
    fn outline(doc: &Self::Document) -> Vec<NativeOutlineNode>;

    /// Files embedded in the document.
    fn embedded_files(doc: &Self::Document) -> Vec<NativeEmbeddedFile>;

    /// Fonts referenced by one page.
    fn fonts_on_page(doc: &Self::Document, page: usize) -> Vec<NativeFontInfo>;

    /// The embedded font program for a named font, if extractable.
    fn font_data(doc: &Self::Document, font_name: &str) -> Option<Vec<u8>>;

    /// Document permission flags.
    fn permissions(doc: &Self::Document) -> Permissions;

    /// A document information value (e.g. "Title"), if present.
    fn info(doc: &Self::Document, key: &str) -> Option<String>;

    /// Save the document (with or without user changes) to a path.
    ///
    /// Only called when the backend advertises
    /// [`BackendCapabilities::SAVE`].
    ///
    /// # Errors
    ///
    /// Returns the backend's own error on failure; the session wraps it as
    /// `SaveError::BackendFailure`.
    fn save_document(
        doc: &Self::Document,
        path: &Path,
        options: SaveOptions,
    ) -> Result<(), Self::Error>;
}
