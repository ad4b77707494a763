//! Document session: lifecycle, permissions, metadata, capabilities.
//!
//! [`DocumentSession`] owns the backend document handle from open to close.
//! Exactly one live session exists per open document; closing it invalidates
//! every dependent cache and fails outstanding render requests as cancelled.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pdfview_core::{
    FontRecord, OpenError, Permission, Permissions, SaveError, SaveOptions, SessionError,
};
use tracing::debug;

use crate::backend::{BackendCapabilities, BackendOpenError, DocumentBackend};
use crate::cache::DerivedData;
use crate::convert::Diagnostics;
use crate::srcsync::SyncCell;

/// Capability roles a session may support, depending on its backend.
///
/// Queried generically instead of expressing each role as a separate
/// interface on the session type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Document information values are available via `metadata`.
    DocumentInfo,
    /// Plain-text export is available.
    TextExport,
    /// Page-by-page printing is available.
    Print,
    /// The document can be saved back to disk.
    Save,
    /// Source synchronization queries may be answered (subject to sidecar
    /// availability).
    SourceSync,
    /// Embedded font programs can be extracted.
    FontData,
}

/// Lock a mutex, recovering the guard if a panicking thread poisoned it.
pub(crate) fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One open document adapted for the host viewer.
///
/// The session is `Sync`: render requests for distinct pages may run on
/// separate threads (serialized transparently when the backend cannot
/// handle that), while all derived-data caches share one exclusive lock.
pub struct DocumentSession<B: DocumentBackend> {
    pub(crate) doc: B::Document,
    pub(crate) path: PathBuf,
    pub(crate) page_count: usize,
    permissions: Permissions,
    capabilities: BackendCapabilities,
    closed: AtomicBool,
    pub(crate) derived: Mutex<DerivedData>,
    /// One lock per page: same-page render requests are always serialized.
    pub(crate) page_locks: Vec<Mutex<()>>,
    /// Document-wide render gate, present when the backend cannot render
    /// distinct pages concurrently.
    pub(crate) render_gate: Option<Mutex<()>>,
    pub(crate) sync_cell: Mutex<SyncCell>,
    pub(crate) diagnostics: Diagnostics,
}

impl<B: DocumentBackend> std::fmt::Debug for DocumentSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSession")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<B: DocumentBackend> DocumentSession<B> {
    /// Open a document without a password.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::NeedsPassword`] when the document is encrypted —
    /// a recoverable outcome; retry with [`DocumentSession::open_with_password`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        Self::open_impl(path.as_ref(), None)
    }

    /// Open an encrypted document with a password.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::WrongPassword`] when the backend rejects the
    /// password, distinguishable from [`OpenError::Corrupt`].
    pub fn open_with_password(path: impl AsRef<Path>, password: &str) -> Result<Self, OpenError> {
        Self::open_impl(path.as_ref(), Some(password))
    }

    fn open_impl(path: &Path, password: Option<&str>) -> Result<Self, OpenError> {
        let doc = B::open(path, password).map_err(|err| match err {
            BackendOpenError::PasswordRequired if password.is_none() => OpenError::NeedsPassword,
            BackendOpenError::PasswordRequired | BackendOpenError::BadPassword => {
                OpenError::WrongPassword
            }
            BackendOpenError::Malformed(msg) => OpenError::Corrupt(msg),
            BackendOpenError::Io(msg) => OpenError::IoFailure(msg),
        })?;

        let page_count = B::page_count(&doc);
        let permissions = B::permissions(&doc);
        let capabilities = B::capabilities(&doc);
        let concurrent = capabilities.contains(BackendCapabilities::CONCURRENT_PAGE_RENDERING);
        debug!(path = %path.display(), pages = page_count, concurrent, "document session opened");

        Ok(Self {
            doc,
            path: path.to_path_buf(),
            page_count,
            permissions,
            capabilities,
            closed: AtomicBool::new(false),
            derived: Mutex::new(DerivedData::new(page_count)),
            page_locks: (0..page_count).map(|_| Mutex::new(())).collect(),
            render_gate: (!concurrent).then(|| Mutex::new(())),
            sync_cell: Mutex::new(SyncCell::Uninitialized),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Number of pages. Page indices are stable for the session's life.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether [`close`](DocumentSession::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    /// Close the session.
    ///
    /// Releases every derived cache and the sync index, cancels outstanding
    /// render requests (already-dispatched backend renders run to completion
    /// and their results are discarded), and makes all subsequent calls fail
    /// with a closed error. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Keep the page-flag vector sized: a call racing the close may still
        // be holding or awaiting the derived lock.
        *lock_recover(&self.derived) = DerivedData::new(self.page_count);
        *lock_recover(&self.sync_cell) = SyncCell::Closed;
        debug!(path = %self.path.display(), "document session closed");
    }

    /// Read-only reflection of the backend's permission flags.
    /// A closed session allows nothing.
    pub fn is_allowed(&self, permission: Permission) -> bool {
        !self.is_closed() && self.permissions.allows(permission)
    }

    /// A document information value (e.g. "Title", "Author").
    /// `None` when the key is absent or the session is closed.
    pub fn metadata(&self, key: &str) -> Option<String> {
        if self.is_closed() {
            return None;
        }
        B::info(&self.doc, key)
    }

    /// Whether the session supports a capability role.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::DocumentInfo | Capability::Print | Capability::SourceSync => true,
            Capability::TextExport => self
                .capabilities
                .contains(BackendCapabilities::TEXT_EXTRACTION),
            Capability::Save => self.capabilities.contains(BackendCapabilities::SAVE),
            Capability::FontData => self.capabilities.contains(BackendCapabilities::FONT_DATA),
        }
    }

    /// Reset every derived cache to empty, as on document reload.
    ///
    /// The session stays open; caches rebuild lazily on next access. This is
    /// the only way short of closing to invalidate derived data.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        *lock_recover(&self.derived) = DerivedData::new(self.page_count);
        debug!("session caches reset");
        Ok(())
    }

    /// Save the document to a path.
    ///
    /// # Errors
    ///
    /// [`SaveError::Unsupported`] when the backend lacks the save
    /// capability; backend failures are wrapped.
    pub fn save(&self, path: impl AsRef<Path>, options: SaveOptions) -> Result<(), SaveError> {
        if self.is_closed() {
            return Err(SaveError::Closed);
        }
        if !self.supports(Capability::Save) {
            return Err(SaveError::Unsupported);
        }
        B::save_document(&self.doc, path.as_ref(), options)
            .map_err(|err| SaveError::BackendFailure(err.to_string()))
    }

    /// The embedded font program for a scanned font, if the backend can
    /// extract it.
    pub fn font_data(&self, font: &FontRecord) -> Option<Vec<u8>> {
        if self.is_closed() || !self.supports(Capability::FontData) {
            return None;
        }
        B::font_data(&self.doc, font.name.as_deref()?)
    }

    /// Counters for native objects skipped during conversion.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
