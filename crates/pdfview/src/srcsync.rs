//! Session-side source synchronization.
//!
//! The sync index is built synchronously at most once per document path, on
//! first query, through an explicit state cell: `Uninitialized → Parsing →
//! Ready | ParseFailed`, with `Closed` terminal after session close. A
//! missing or malformed sidecar is `ParseFailed` and degrades to "source
//! sync unavailable" — never an error. Once `Ready`, the index is shared as
//! an `Arc` and queried without any lock.

use std::sync::Arc;

use pdfview_core::{PageRect, SourcePosition};
use pdfview_sync::SourceSync;
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::session::{DocumentSession, lock_recover};

/// State of the per-session sync index.
#[derive(Debug, Default)]
pub(crate) enum SyncCell {
    #[default]
    Uninitialized,
    /// Transient while discovery runs under the cell lock.
    Parsing,
    Ready(Arc<SourceSync>),
    ParseFailed,
    Closed,
}

impl<B: DocumentBackend> DocumentSession<B> {
    /// The shared sync index, building it on first use.
    fn sync_index(&self) -> Option<Arc<SourceSync>> {
        let mut cell = lock_recover(&self.sync_cell);
        match &*cell {
            SyncCell::Ready(sync) => Some(sync.clone()),
            SyncCell::ParseFailed | SyncCell::Closed => None,
            // Discovery runs under the cell lock, so another caller never
            // observes Parsing; treat it as unavailable if it ever leaks.
            SyncCell::Parsing => None,
            SyncCell::Uninitialized => {
                *cell = SyncCell::Parsing;
                let sync = SourceSync::discover(&self.path);
                if sync.is_available() {
                    debug!(kind = ?sync.kind(), "source sync ready");
                    let sync = Arc::new(sync);
                    *cell = SyncCell::Ready(sync.clone());
                    Some(sync)
                } else {
                    debug!("source sync unavailable");
                    *cell = SyncCell::ParseFailed;
                    None
                }
            }
        }
    }

    /// Whether sync data exists for this document.
    pub fn source_sync_available(&self) -> bool {
        !self.is_closed() && self.sync_index().is_some()
    }

    /// Reverse sync: source position for a point on a rendered page.
    ///
    /// `None` when sync is unavailable, the point matches nothing on that
    /// page, or the active format carries no inverse mapping.
    pub fn dynamic_source_reference(&self, page: usize, x: f64, y: f64) -> Option<SourcePosition> {
        if self.is_closed() {
            return None;
        }
        self.sync_index()?.reverse(page, x, y)
    }

    /// Forward sync: rendered-page region for a source position.
    pub fn resolve_from_source(
        &self,
        file: &str,
        line: usize,
        column: Option<usize>,
    ) -> Option<PageRect> {
        if self.is_closed() {
            return None;
        }
        self.sync_index()?.forward(file, line, column)
    }
}
