//! pdfview: Adapt a native PDF rendering backend into a host viewer model.
//!
//! This is the session/generator crate of pdfview-rs. It consumes a native
//! PDF library through the [`DocumentBackend`] trait and exposes the host
//! viewer surface: document lifecycle, lazily cached derived data (synopsis
//! tree, embedded files, incremental font scan), a render pipeline with
//! per-page serialization and cancellation, native-to-abstract object
//! conversion with annotation identity tracking, source synchronization, and
//! text export / printing.
//!
//! # Architecture
//!
//! - **pdfview-core**: backend-independent viewer model types and errors
//! - **pdfview-sync**: source-sync sidecar parsing and spatial queries
//! - **pdfview** (this crate): the [`DocumentSession`] tying everything
//!   together over a [`DocumentBackend`]
//!
//! # Example
//!
//! ```ignore
//! let session = DocumentSession::<MyBackend>::open("paper.pdf")?;
//! let synopsis = session.generate_synopsis()?;
//! let raster = session.image(&RenderRequest::new(0, 800, 1100))?;
//! let position = session.dynamic_source_reference(0, 120.0, 340.0);
//! session.close();
//! ```

pub mod backend;
mod cache;
mod convert;
mod export;
mod print;
mod render;
mod session;
mod srcsync;

pub use backend::{
    BackendCapabilities, BackendOpenError, DocumentBackend, NativeAnnotation, NativeEmbeddedFile,
    NativeFontInfo, NativeFormField, NativeLink, NativeLinkAction, NativeOutlineNode,
    NativeTransition,
};
pub use convert::Diagnostics;
pub use export::ExportFormat;
pub use print::{PrintOptions, PrintSurface};
pub use session::{Capability, DocumentSession};

pub use pdfview_core;
pub use pdfview_sync;
