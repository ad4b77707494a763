//! Error taxonomy for pdfview-rs.
//!
//! Every fallible stage has its own error type so recoverable conditions are
//! distinguishable from fatal ones at the type level: [`OpenError`] separates
//! a password demand from corruption, [`RenderError`] separates cancellation
//! from backend failure, and export/print/save report which stage aborted.
//! Backend errors are always wrapped with a string payload, never passed
//! through raw.

use thiserror::Error;

/// Errors from opening a document.
///
/// `NeedsPassword` and `WrongPassword` are recoverable: the caller may retry
/// with (another) password. `Corrupt` and `IoFailure` are fatal for the
/// given source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    /// The document is encrypted and no password was supplied.
    #[error("document is encrypted and requires a password")]
    NeedsPassword,
    /// The supplied password was rejected by the backend.
    #[error("the supplied password is incorrect")]
    WrongPassword,
    /// The backend could not make sense of the document data.
    #[error("document is damaged: {0}")]
    Corrupt(String),
    /// The document source could not be read.
    #[error("I/O failure: {0}")]
    IoFailure(String),
}

/// Errors from a render request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The backend failed to rasterize the page.
    #[error("backend render failure: {0}")]
    BackendFailure(String),
    /// The owning session closed while the request was outstanding.
    #[error("render request cancelled")]
    Cancelled,
    /// The request itself is malformed (non-positive size, page out of range).
    #[error("invalid render request: {0}")]
    InvalidRequest(String),
    /// The session was already closed when the request was submitted.
    #[error("document session is closed")]
    Closed,
}

/// Errors from session queries and derived-data access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session was closed.
    #[error("document session is closed")]
    Closed,
    /// The backend reported a failure while producing derived data.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Errors from text export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The requested export format is not supported.
    #[error("export format not supported")]
    Unsupported,
    /// Writing the destination file failed. No partial file is left behind.
    #[error("failed to write export destination: {0}")]
    WriteFailure(String),
    /// A page's text extraction failed; the export was abandoned before the
    /// destination was created.
    #[error("backend text extraction failure: {0}")]
    BackendFailure(String),
    /// The session was closed.
    #[error("document session is closed")]
    Closed,
}

/// Errors from printing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintError {
    /// A page failed to render; nothing was presented to the surface.
    #[error("failed to render page {page} for printing: {reason}")]
    PageRenderFailure { page: usize, reason: String },
    /// The print surface rejected a rendered page.
    #[error("print surface failure: {0}")]
    SurfaceFailure(String),
    /// The session was closed.
    #[error("document session is closed")]
    Closed,
}

/// Errors from saving the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// The backend does not support saving.
    #[error("saving is not supported by this backend")]
    Unsupported,
    /// The destination could not be written.
    #[error("failed to write saved document: {0}")]
    WriteFailure(String),
    /// The backend failed while serializing the document.
    #[error("backend save failure: {0}")]
    BackendFailure(String),
    /// The session was closed.
    #[error("document session is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- OpenError tests ---

    #[test]
    fn open_error_needs_password_is_distinct_from_corrupt() {
        let needs = OpenError::NeedsPassword;
        let corrupt = OpenError::Corrupt("bad xref".to_string());
        assert_ne!(needs, corrupt);
        assert_eq!(
            needs.to_string(),
            "document is encrypted and requires a password"
        );
    }

    #[test]
    fn open_error_wrong_password_is_distinct_from_needs_password() {
        assert_ne!(OpenError::WrongPassword, OpenError::NeedsPassword);
    }

    #[test]
    fn open_error_display() {
        assert_eq!(
            OpenError::Corrupt("truncated trailer".to_string()).to_string(),
            "document is damaged: truncated trailer"
        );
        assert_eq!(
            OpenError::IoFailure("permission denied".to_string()).to_string(),
            "I/O failure: permission denied"
        );
    }

    // --- RenderError tests ---

    #[test]
    fn render_error_cancelled_display() {
        assert_eq!(RenderError::Cancelled.to_string(), "render request cancelled");
    }

    #[test]
    fn render_error_invalid_request_carries_reason() {
        let err = RenderError::InvalidRequest("width must be positive".to_string());
        assert!(err.to_string().contains("width must be positive"));
    }

    #[test]
    fn render_error_closed_vs_cancelled() {
        assert_ne!(RenderError::Closed, RenderError::Cancelled);
    }

    // --- Print/export error tests ---

    #[test]
    fn print_error_identifies_failed_page() {
        let err = PrintError::PageRenderFailure {
            page: 3,
            reason: "backend render failure: oom".to_string(),
        };
        assert!(err.to_string().contains("page 3"));
    }

    #[test]
    fn export_error_unsupported_display() {
        assert_eq!(
            ExportError::Unsupported.to_string(),
            "export format not supported"
        );
    }

    #[test]
    fn errors_implement_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(SaveError::Unsupported);
        assert!(err.to_string().contains("not supported"));
    }
}
