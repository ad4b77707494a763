//! Simple-sync (pdfsync) index.
//!
//! The simple format is a line-oriented text file next to the document:
//! a header naming the master source file and the format version, then a
//! stream of records inside `(file … )` grouping lines:
//!
//! - `l rec line [column]` declares record `rec` at a source line,
//! - `s page` sets the current (1-indexed) page,
//! - `p rec x y` (also `p* `/`p+`) places a declared record at a point on
//!   the current page, coordinates in 1/65536 pt.
//!
//! Only placed records are addressable. The format carries no region data
//! and no inverse mapping, so reverse queries always miss; that is a
//! documented limitation of the format, not a defect.

use std::collections::HashMap;

use pdfview_core::{PageRect, Rect, SourcePosition};

use crate::error::SyncError;
use crate::file_matches;

/// Nominal height/width of the region synthesized around a placed point,
/// in points. The format records points, not boxes.
const NOMINAL_LINE_HEIGHT: f64 = 10.0;

/// Conversion from the format's 1/65536 pt units to points.
const UNITS_PER_PT: f64 = 65536.0;

#[derive(Debug, Clone)]
struct PlacedRecord {
    file: usize,
    line: usize,
    /// 0-indexed page.
    page: usize,
    /// Point in page points, top-left origin.
    x: f64,
    y: f64,
}

/// Parsed simple-sync index: an ordered sequence of placed records.
#[derive(Debug)]
pub(crate) struct SimpleIndex {
    files: Vec<String>,
    records: Vec<PlacedRecord>,
}

impl SimpleIndex {
    /// Parse simple-sync text that has already been decoded.
    pub(crate) fn parse(text: &str) -> Result<Self, SyncError> {
        let mut lines = text.lines().enumerate();

        let (_, base) = lines
            .next()
            .ok_or_else(|| SyncError::malformed(1, "empty sync file"))?;
        let base = base.trim().to_string();
        if base.is_empty() {
            return Err(SyncError::malformed(1, "missing base file name"));
        }

        let (_, version_line) = lines
            .next()
            .ok_or_else(|| SyncError::malformed(2, "missing version line"))?;
        match version_line.trim().strip_prefix("version ") {
            Some("1") => {}
            Some(other) => return Err(SyncError::UnsupportedVersion(other.to_string())),
            None => return Err(SyncError::malformed(2, "expected version line")),
        }

        let mut files = vec![format!("{base}.tex")];
        let mut file_stack = vec![0usize];
        let mut declarations: HashMap<u64, (usize, usize)> = HashMap::new();
        let mut current_page: Option<usize> = None;
        let mut records = Vec::new();

        for (idx, raw) in lines {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix('(') {
                let name = name.trim().to_string();
                let file_idx = files.iter().position(|f| f == &name).unwrap_or_else(|| {
                    files.push(name);
                    files.len() - 1
                });
                file_stack.push(file_idx);
                continue;
            }
            if line == ")" {
                if file_stack.len() > 1 {
                    file_stack.pop();
                }
                continue;
            }

            let mut parts = line.split_ascii_whitespace();
            let tag = parts
                .next()
                .ok_or_else(|| SyncError::malformed(line_no, "empty record"))?;
            match tag {
                "l" => {
                    let rec: u64 = next_number(&mut parts, line_no, "record number")?;
                    let src_line: usize = next_number(&mut parts, line_no, "line number")?;
                    // Trailing column, if present, is declared but unused.
                    let file = *file_stack.last().unwrap_or(&0);
                    declarations.insert(rec, (file, src_line));
                }
                "s" => {
                    let page: usize = next_number(&mut parts, line_no, "page number")?;
                    if page == 0 {
                        return Err(SyncError::malformed(line_no, "page numbers are 1-indexed"));
                    }
                    current_page = Some(page - 1);
                }
                "p" | "p*" | "p+" => {
                    let rec: u64 = next_number(&mut parts, line_no, "record number")?;
                    let x: i64 = next_number(&mut parts, line_no, "x coordinate")?;
                    let y: i64 = next_number(&mut parts, line_no, "y coordinate")?;
                    let page = current_page
                        .ok_or_else(|| SyncError::malformed(line_no, "placement before any page"))?;
                    // Placements for undeclared records are dropped; some
                    // producers emit them for internal bookkeeping.
                    if let Some(&(file, src_line)) = declarations.get(&rec) {
                        records.push(PlacedRecord {
                            file,
                            line: src_line,
                            page,
                            x: x as f64 / UNITS_PER_PT,
                            y: y as f64 / UNITS_PER_PT,
                        });
                    }
                }
                _ => {
                    return Err(SyncError::malformed(
                        line_no,
                        format!("unrecognized record tag {tag:?}"),
                    ));
                }
            }
        }

        Ok(Self { files, records })
    }

    /// Forward query: nearest-by-line placed record for the given source
    /// file; the region is a nominal line-height box anchored at the
    /// recorded point.
    pub(crate) fn forward(&self, file: &str, line: usize) -> Option<PageRect> {
        let mut best: Option<(&PlacedRecord, usize)> = None;
        for record in &self.records {
            if !file_matches(&self.files[record.file], file) {
                continue;
            }
            let distance = record.line.abs_diff(line);
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((record, distance)),
            }
        }
        best.map(|(record, _)| {
            PageRect::new(
                record.page,
                Rect::new(
                    record.x,
                    record.y - NOMINAL_LINE_HEIGHT,
                    record.x + NOMINAL_LINE_HEIGHT,
                    record.y,
                ),
            )
        })
    }

    /// Reverse query. The format carries no inverse mapping; this always
    /// misses.
    pub(crate) fn reverse(&self, _page: usize, _x: f64, _y: f64) -> Option<SourcePosition> {
        None
    }
}

fn next_number<T: std::str::FromStr>(
    parts: &mut std::str::SplitAsciiWhitespace<'_>,
    line_no: usize,
    what: &str,
) -> Result<T, SyncError> {
    parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| SyncError::malformed(line_no, format!("expected {what}")))
}
