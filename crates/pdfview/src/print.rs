//! Page-by-page printing.
//!
//! Renders every page first, then presents them in order to a
//! [`PrintSurface`]. The first per-page render failure aborts the job before
//! anything reaches the surface, so no partial output is ever presented.

use pdfview_core::{PrintError, RenderError, RenderFlags, RenderRequest, Raster, Rotation};
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::session::DocumentSession;

/// A target the print adapter presents rendered pages to.
pub trait PrintSurface {
    type Error: std::error::Error;

    /// Present one rendered page. Pages arrive in order, each exactly once.
    ///
    /// # Errors
    ///
    /// Returns the surface's own error on failure; the session wraps it as
    /// [`PrintError::SurfaceFailure`].
    fn present_page(&mut self, page: usize, raster: &Raster) -> Result<(), Self::Error>;
}

/// Print resolution and quality settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintOptions {
    /// Render resolution in dots per inch.
    pub dpi: f64,
    /// Render quality hints.
    pub flags: RenderFlags,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            flags: RenderFlags::ANTIALIASING | RenderFlags::TEXT_ANTIALIASING,
        }
    }
}

impl<B: DocumentBackend> DocumentSession<B> {
    /// Render all pages and present them, in order, to the surface.
    ///
    /// # Errors
    ///
    /// - [`PrintError::PageRenderFailure`] identifies the first page that
    ///   failed to render; the surface receives nothing;
    /// - [`PrintError::SurfaceFailure`] when the surface rejects a page;
    /// - [`PrintError::Closed`] on a closed session.
    pub fn print<S: PrintSurface>(
        &self,
        surface: &mut S,
        options: PrintOptions,
    ) -> Result<(), PrintError> {
        if self.is_closed() {
            return Err(PrintError::Closed);
        }

        let mut rendered = Vec::with_capacity(self.page_count);
        for page in 0..self.page_count {
            let (width_pt, height_pt) = B::page_size(&self.doc, page);
            let request = RenderRequest {
                page,
                width: ((width_pt * options.dpi / 72.0).round() as u32).max(1),
                height: ((height_pt * options.dpi / 72.0).round() as u32).max(1),
                rotation: Rotation::R0,
                flags: options.flags,
            };
            let raster = self.image(&request).map_err(|err| match err {
                RenderError::Closed | RenderError::Cancelled => PrintError::Closed,
                other => PrintError::PageRenderFailure {
                    page,
                    reason: other.to_string(),
                },
            })?;
            rendered.push(raster);
        }
        debug!(pages = rendered.len(), dpi = options.dpi, "presenting print job");

        for (page, raster) in rendered.iter().enumerate() {
            surface
                .present_page(page, raster)
                .map_err(|err| PrintError::SurfaceFailure(err.to_string()))?;
        }
        Ok(())
    }
}
