//! Text export.
//!
//! Concatenates per-page extracted text in page order. The whole job
//! completes or nothing is written: extraction failures abort before the
//! destination is created, and a failed write removes the partial file.

use std::path::Path;

use pdfview_core::ExportError;
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::session::{Capability, DocumentSession};

/// An export format the session can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain text, pages separated by a blank line.
    PlainText,
}

impl<B: DocumentBackend> DocumentSession<B> {
    /// Formats `export_to` accepts with this backend.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        if self.supports(Capability::TextExport) {
            vec![ExportFormat::PlainText]
        } else {
            Vec::new()
        }
    }

    /// Export the document to `destination` in the given format.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Unsupported`] when the format is not offered;
    /// - [`ExportError::BackendFailure`] when any page's text extraction
    ///   fails (no file is created);
    /// - [`ExportError::WriteFailure`] when writing fails (the partial file
    ///   is removed);
    /// - [`ExportError::Closed`] on a closed session.
    pub fn export_to(&self, format: ExportFormat, destination: &Path) -> Result<(), ExportError> {
        if self.is_closed() {
            return Err(ExportError::Closed);
        }
        if !self.export_formats().contains(&format) {
            return Err(ExportError::Unsupported);
        }

        // Extract everything before touching the destination, so a page
        // failure leaves no partial output behind.
        let mut out = String::new();
        for page in 0..self.page_count {
            let spans = B::page_text(&self.doc, page)
                .map_err(|err| ExportError::BackendFailure(err.to_string()))?;
            for span in &spans {
                out.push_str(&span.text);
            }
            out.push('\n');
        }

        debug!(pages = self.page_count, bytes = out.len(), "writing text export");
        if let Err(err) = std::fs::write(destination, out) {
            let _ = std::fs::remove_file(destination);
            return Err(ExportError::WriteFailure(err.to_string()));
        }
        Ok(())
    }
}
