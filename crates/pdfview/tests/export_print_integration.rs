//! Export and print adapter behavior: whole-job-or-nothing semantics.

mod common;

use std::collections::HashMap;
use std::convert::Infallible;

use common::{MockBackend, MockConfig, install_with};
use pdfview::backend::BackendCapabilities;
use pdfview::{DocumentSession, ExportFormat, PrintOptions, PrintSurface};
use pdfview_core::{ExportError, PrintError, Raster};

type Session = DocumentSession<MockBackend>;

fn three_page_config() -> MockConfig {
    MockConfig {
        pages: 3,
        page_texts: HashMap::from([
            (0, "First page.".to_string()),
            (1, "Second page.".to_string()),
            (2, "Third page.".to_string()),
        ]),
        ..MockConfig::default()
    }
}

// --- Export tests ---

#[test]
fn export_formats_offered_with_text_capability() {
    let (path, _) = install_with("export-formats", MockConfig::default());
    let session = Session::open(&path).unwrap();
    assert_eq!(session.export_formats(), vec![ExportFormat::PlainText]);
}

#[test]
fn export_formats_empty_without_text_capability() {
    let (path, _) = install_with(
        "export-no-caps",
        MockConfig {
            capabilities: BackendCapabilities::CONCURRENT_PAGE_RENDERING,
            ..MockConfig::default()
        },
    );
    let session = Session::open(&path).unwrap();
    assert!(session.export_formats().is_empty());
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        session
            .export_to(ExportFormat::PlainText, &dir.path().join("out.txt"))
            .unwrap_err(),
        ExportError::Unsupported
    );
}

#[test]
fn export_concatenates_pages_in_order() {
    let (path, _) = install_with("export-order", three_page_config());
    let session = Session::open(&path).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.txt");
    session
        .export_to(ExportFormat::PlainText, &destination)
        .unwrap();

    let text = std::fs::read_to_string(&destination).unwrap();
    assert_eq!(text, "First page.\nSecond page.\nThird page.\n");
}

#[test]
fn export_page_failure_leaves_no_partial_file() {
    let mut config = three_page_config();
    config.fail_text_on = Some(1);
    let (path, _) = install_with("export-fail", config);
    let session = Session::open(&path).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.txt");
    let err = session
        .export_to(ExportFormat::PlainText, &destination)
        .unwrap_err();

    assert!(matches!(err, ExportError::BackendFailure(_)));
    assert!(!destination.exists(), "no partial output may be left behind");
}

#[test]
fn export_on_closed_session_fails_closed() {
    let (path, _) = install_with("export-closed", MockConfig::default());
    let session = Session::open(&path).unwrap();
    session.close();
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        session
            .export_to(ExportFormat::PlainText, &dir.path().join("out.txt"))
            .unwrap_err(),
        ExportError::Closed
    );
}

// --- Print tests ---

/// Surface that records presented pages.
#[derive(Default)]
struct RecordingSurface {
    pages: Vec<(usize, u32, u32)>,
}

impl PrintSurface for RecordingSurface {
    type Error = Infallible;

    fn present_page(&mut self, page: usize, raster: &Raster) -> Result<(), Self::Error> {
        self.pages.push((page, raster.width, raster.height));
        Ok(())
    }
}

/// Surface that rejects a chosen page.
struct FailingSurface {
    fail_on: usize,
    presented: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("surface jam")]
struct SurfaceJam;

impl PrintSurface for FailingSurface {
    type Error = SurfaceJam;

    fn present_page(&mut self, page: usize, _raster: &Raster) -> Result<(), Self::Error> {
        if page == self.fail_on {
            return Err(SurfaceJam);
        }
        self.presented += 1;
        Ok(())
    }
}

#[test]
fn print_presents_all_pages_in_order() {
    let (path, _) = install_with("print-order", three_page_config());
    let session = Session::open(&path).unwrap();

    let mut surface = RecordingSurface::default();
    session.print(&mut surface, PrintOptions::default()).unwrap();

    let pages: Vec<usize> = surface.pages.iter().map(|(page, _, _)| *page).collect();
    assert_eq!(pages, vec![0, 1, 2]);
    // 612×792 pt at 300 dpi.
    assert_eq!(surface.pages[0].1, 2550);
    assert_eq!(surface.pages[0].2, 3300);
}

#[test]
fn print_render_failure_aborts_before_surface_sees_anything() {
    let mut config = three_page_config();
    config.fail_render_on = Some(1);
    let (path, _) = install_with("print-render-fail", config);
    let session = Session::open(&path).unwrap();

    let mut surface = RecordingSurface::default();
    let err = session
        .print(&mut surface, PrintOptions::default())
        .unwrap_err();

    match err {
        PrintError::PageRenderFailure { page, .. } => assert_eq!(page, 1),
        other => panic!("expected PageRenderFailure, got {other:?}"),
    }
    assert!(surface.pages.is_empty(), "surface must receive no output");
}

#[test]
fn print_surface_failure_is_surface_failure() {
    let (path, _) = install_with("print-surface-fail", three_page_config());
    let session = Session::open(&path).unwrap();

    let mut surface = FailingSurface {
        fail_on: 1,
        presented: 0,
    };
    let err = session
        .print(&mut surface, PrintOptions::default())
        .unwrap_err();
    assert!(matches!(err, PrintError::SurfaceFailure(_)));
}

#[test]
fn print_on_closed_session_fails_closed() {
    let (path, _) = install_with("print-closed", MockConfig::default());
    let session = Session::open(&path).unwrap();
    session.close();
    let mut surface = RecordingSurface::default();
    assert!(matches!(
        session.print(&mut surface, PrintOptions::default()),
        Err(PrintError::Closed)
    ));
}
