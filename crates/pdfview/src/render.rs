//! Render request handling.
//!
//! Turns a [`RenderRequest`] into a raster. Requests against the same page
//! are serialized through a per-page lock (the backend's page object is not
//! safely shared across concurrent callers); requests against distinct pages
//! run concurrently when the backend allows it, and are transparently
//! serialized through a document-wide gate when it does not. Requests do not
//! take the derived-data lock while the backend renders.

use pdfview_core::{Raster, RenderError, RenderRequest, SessionError};
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::session::{DocumentSession, lock_recover};

impl<B: DocumentBackend> DocumentSession<B> {
    /// Render one page to a raster.
    ///
    /// The first render of a page also computes that page's link and
    /// annotation geometry, so the host can hit-test the freshly displayed
    /// page without a second backend pass.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidRequest`] for non-positive dimensions or a
    ///   page out of range;
    /// - [`RenderError::Closed`] when the session was closed before the
    ///   request;
    /// - [`RenderError::Cancelled`] when the session closed while the
    ///   request was outstanding (the backend raster, if any, is discarded);
    /// - [`RenderError::BackendFailure`] wrapping backend render errors.
    pub fn image(&self, request: &RenderRequest) -> Result<Raster, RenderError> {
        if self.is_closed() {
            return Err(RenderError::Closed);
        }
        if request.width == 0 || request.height == 0 {
            return Err(RenderError::InvalidRequest(
                "width and height must be positive".to_string(),
            ));
        }
        if request.page >= self.page_count {
            return Err(RenderError::InvalidRequest(format!(
                "page {} out of range (0..{})",
                request.page, self.page_count
            )));
        }

        self.ensure_page_objects(request.page).map_err(|err| match err {
            SessionError::Closed => RenderError::Cancelled,
            SessionError::Backend(msg) => RenderError::BackendFailure(msg),
        })?;

        let _gate = self.render_gate.as_ref().map(lock_recover);
        let _page = lock_recover(&self.page_locks[request.page]);

        // Close may have landed while we waited on the locks.
        if self.is_closed() {
            return Err(RenderError::Cancelled);
        }

        let raster = B::render_page(
            &self.doc,
            request.page,
            request.width,
            request.height,
            request.rotation,
            request.flags,
        )
        .map_err(|err| RenderError::BackendFailure(err.to_string()))?;

        // A close that raced the backend call wins: the result is stale.
        if self.is_closed() {
            debug!(page = request.page, "discarding raster rendered during close");
            return Err(RenderError::Cancelled);
        }
        Ok(raster)
    }
}
