//! pdfview-sync: Source-synchronization engine.
//!
//! Maintains the bidirectional mapping between positions in an external
//! source document and rectangular regions on rendered pages. Backing data
//! is one of two read-only sidecar formats discovered next to the document:
//!
//! - **rich sync** (`<doc>.synctex.gz`, or uncompressed `<doc>.synctex`): a
//!   compressed spatial index supporting containment queries in both
//!   directions;
//! - **simple sync** (`<doc>.pdfsync`): a line-oriented point index that
//!   supports forward queries only.
//!
//! A rich-sync sidecar takes precedence when both exist; only one is active
//! per document. A missing or malformed sidecar degrades silently to
//! "source sync unavailable" — never a user-visible error. Once built, an
//! index is immutable and safe for unlimited concurrent read-only queries.

mod error;
mod rich;
mod simple;

pub use error::SyncError;

use std::path::Path;

use pdfview_core::{PageRect, SourcePosition};
use tracing::debug;

use rich::RichIndex;
use simple::SimpleIndex;

/// Which sidecar format backs an available engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Line-oriented point index (forward queries only).
    Simple,
    /// Compressed spatial index (forward and reverse queries).
    Rich,
}

#[derive(Debug)]
enum Index {
    Simple(SimpleIndex),
    Rich(RichIndex),
}

/// The source-synchronization engine for one document.
///
/// Construct with [`SourceSync::discover`]; query with [`forward`]
/// (source position → page region) and [`reverse`] (page point → source
/// position). An unavailable engine answers every query with `None`.
///
/// [`forward`]: SourceSync::forward
/// [`reverse`]: SourceSync::reverse
#[derive(Debug)]
pub struct SourceSync {
    index: Option<Index>,
}

impl SourceSync {
    /// Discover and parse sync data for the document at `document_path`.
    ///
    /// Looks for sidecar files with the document's base name. Rich sync
    /// wins over simple sync when both exist. Parse failures degrade to an
    /// unavailable engine.
    pub fn discover(document_path: &Path) -> Self {
        let base = document_path.with_extension("");

        for suffix in ["synctex.gz", "synctex"] {
            let candidate = base.with_extension(suffix);
            if !candidate.is_file() {
                continue;
            }
            match RichIndex::load(&candidate) {
                Ok(index) => {
                    debug!(path = %candidate.display(), "rich sync index ready");
                    return Self {
                        index: Some(Index::Rich(index)),
                    };
                }
                Err(err) => {
                    debug!(path = %candidate.display(), %err, "rich sync parse failed");
                    return Self::unavailable();
                }
            }
        }

        let candidate = base.with_extension("pdfsync");
        if candidate.is_file() {
            match load_simple(&candidate) {
                Ok(index) => {
                    debug!(path = %candidate.display(), "simple sync index ready");
                    return Self {
                        index: Some(Index::Simple(index)),
                    };
                }
                Err(err) => {
                    debug!(path = %candidate.display(), %err, "simple sync parse failed");
                    return Self::unavailable();
                }
            }
        }

        Self::unavailable()
    }

    /// An engine with no sync data; every query answers `None`.
    pub fn unavailable() -> Self {
        Self { index: None }
    }

    /// Whether sync data was found and parsed.
    pub fn is_available(&self) -> bool {
        self.index.is_some()
    }

    /// The backing format, if available.
    pub fn kind(&self) -> Option<SyncKind> {
        match self.index {
            Some(Index::Simple(_)) => Some(SyncKind::Simple),
            Some(Index::Rich(_)) => Some(SyncKind::Rich),
            None => None,
        }
    }

    /// Forward query: region on a rendered page for a source position.
    ///
    /// The column is accepted for interface completeness; neither format
    /// records columns, so it does not affect the result.
    pub fn forward(&self, file: &str, line: usize, _column: Option<usize>) -> Option<PageRect> {
        match &self.index {
            Some(Index::Simple(index)) => index.forward(file, line),
            Some(Index::Rich(index)) => index.forward(file, line),
            None => None,
        }
    }

    /// Reverse query: source position for a point on a rendered page.
    ///
    /// Simple sync carries no inverse mapping and always answers `None`.
    pub fn reverse(&self, page: usize, x: f64, y: f64) -> Option<SourcePosition> {
        match &self.index {
            Some(Index::Simple(index)) => index.reverse(page, x, y),
            Some(Index::Rich(index)) => index.reverse(page, x, y),
            None => None,
        }
    }
}

/// Read and decode a simple-sync sidecar. Sidecars are not reliably UTF-8;
/// undecodable bytes fall back to Windows-1252.
fn load_simple(path: &Path) -> Result<SimpleIndex, SyncError> {
    let bytes = std::fs::read(path)?;
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    let text = if had_errors {
        encoding_rs::WINDOWS_1252.decode(&bytes).0
    } else {
        text
    };
    SimpleIndex::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const SP: i64 = 65536;

    fn write_rich(dir: &Path, name: &str) {
        let content = format!(
            "SyncTeX Version:1\n\
             Input:1:./a.tex\n\
             Output:pdf\n\
             Magnification:1000\n\
             Unit:1\n\
             X Offset:0\n\
             Y Offset:0\n\
             Content:\n\
             {{3\n\
             (1,10:{},{}:{},{},{}\n\
             x1,10:{},{}\n\
             )\n\
             }}3\n",
            80 * SP,
            200 * SP,
            100 * SP,
            20 * SP,
            20 * SP,
            100 * SP,
            200 * SP,
        );
        let path = dir.join(name);
        if name.ends_with(".gz") {
            let mut enc =
                GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::default());
            enc.write_all(content.as_bytes()).unwrap();
            enc.finish().unwrap();
        } else {
            std::fs::write(path, content).unwrap();
        }
    }

    fn write_simple(dir: &Path) {
        let content = format!(
            "doc\nversion 1\n(doc.tex\nl 1 10\ns 1\np 1 {} {}\n)\n",
            100 * SP,
            200 * SP
        );
        std::fs::write(dir.join("doc.pdfsync"), content).unwrap();
    }

    #[test]
    fn discover_without_sidecars_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let sync = SourceSync::discover(&dir.path().join("doc.pdf"));
        assert!(!sync.is_available());
        assert!(sync.forward("a.tex", 10, None).is_none());
        assert!(sync.reverse(0, 1.0, 1.0).is_none());
    }

    #[test]
    fn discover_finds_simple_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        write_simple(dir.path());
        let sync = SourceSync::discover(&dir.path().join("doc.pdf"));
        assert_eq!(sync.kind(), Some(SyncKind::Simple));
        assert!(sync.forward("doc.tex", 10, None).is_some());
    }

    #[test]
    fn discover_prefers_rich_over_simple() {
        let dir = tempfile::tempdir().unwrap();
        write_simple(dir.path());
        write_rich(dir.path(), "doc.synctex.gz");
        let sync = SourceSync::discover(&dir.path().join("doc.pdf"));
        assert_eq!(sync.kind(), Some(SyncKind::Rich));
    }

    #[test]
    fn discover_accepts_uncompressed_rich_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        write_rich(dir.path(), "doc.synctex");
        let sync = SourceSync::discover(&dir.path().join("doc.pdf"));
        assert_eq!(sync.kind(), Some(SyncKind::Rich));
        let hit = sync.forward("a.tex", 10, None).unwrap();
        assert_eq!(hit.page, 2);
    }

    #[test]
    fn discover_malformed_sidecar_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.pdfsync"), "not a sync file").unwrap();
        let sync = SourceSync::discover(&dir.path().join("doc.pdf"));
        assert!(!sync.is_available());
    }

    #[test]
    fn rich_round_trip_forward_and_reverse() {
        let dir = tempfile::tempdir().unwrap();
        write_rich(dir.path(), "doc.synctex.gz");
        let sync = SourceSync::discover(&dir.path().join("doc.pdf"));

        let rect = sync.forward("a.tex", 10, None).unwrap();
        assert_eq!(rect.page, 2);
        assert!(rect.area.contains(100.0, 200.0));

        let pos = sync.reverse(2, 100.0, 200.0).unwrap();
        assert!(pos.file.ends_with("a.tex"));
        assert_eq!(pos.line, 10);
    }
}

/// Whether a recorded input file refers to the same source as a query name.
///
/// Sidecars record paths as the typesetting run saw them (often `./`-relative)
/// while hosts pass editor paths, so equality is by exact match, path-suffix
/// match in either direction, or equal base names.
pub(crate) fn file_matches(recorded: &str, query: &str) -> bool {
    if recorded == query {
        return true;
    }
    let recorded_norm = recorded.strip_prefix("./").unwrap_or(recorded);
    let query_norm = query.strip_prefix("./").unwrap_or(query);
    if recorded_norm == query_norm {
        return true;
    }
    if recorded_norm.ends_with(&format!("/{query_norm}"))
        || query_norm.ends_with(&format!("/{recorded_norm}"))
    {
        return true;
    }
    let base = |p: &str| p.rsplit('/').next().unwrap_or(p).to_string();
    base(recorded_norm) == base(query_norm)
}
