//! Rich-sync index: a compressed spatial index of typeset material.
//!
//! The rich format is a (usually gzip-compressed) text stream: a preamble of
//! `Key:value` lines declaring the format version, the input files (by
//! numeric tag), and the coordinate system (`Magnification`, `Unit`,
//! `X Offset`, `Y Offset`), then a `Content:` section of per-sheet blocks:
//!
//! ```text
//! {2
//! [1,42:x,y:W,H,D      vertical box
//! (1,42:x,y:W,H,D      horizontal box
//! x1,43:x,y            point record
//! k1,43:x,y:W          kern
//! )
//! ]
//! }2
//! ```
//!
//! Coordinates are in scaled points (65536 sp = 1 pt), y growing downward
//! from the top of the sheet. Boxes open a region spanning `x .. x+W`
//! horizontally and `y-H .. y+D` vertically; point records attach to the
//! innermost open box. The parsed index keeps one region/point list per page
//! and is immutable afterward, so queries need no locking.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::GzDecoder;
use pdfview_core::{PageRect, Rect, SourcePosition};

use crate::error::SyncError;
use crate::file_matches;

/// Scaled points per point.
const SP_PER_PT: f64 = 65536.0;

/// How far (in pt) a reverse query may sit from the nearest region on the
/// queried page and still resolve. Other pages are never consulted.
const NEARBY_THRESHOLD: f64 = 20.0;

/// Nominal region size (pt) synthesized for a point with no enclosing box.
const NOMINAL_LINE_HEIGHT: f64 = 10.0;

#[derive(Debug, Clone)]
struct Region {
    area: Rect,
    tag: u32,
    line: usize,
}

#[derive(Debug, Clone)]
struct PointRecord {
    x: f64,
    y: f64,
    tag: u32,
    line: usize,
    /// Index of the innermost box open when the point was recorded.
    enclosing: Option<usize>,
}

#[derive(Debug, Default)]
struct PageRegions {
    boxes: Vec<Region>,
    points: Vec<PointRecord>,
}

/// Parsed rich-sync index.
#[derive(Debug)]
pub(crate) struct RichIndex {
    inputs: HashMap<u32, String>,
    pages: BTreeMap<usize, PageRegions>,
    /// sp → pt conversion factor, from Unit and Magnification.
    scale: f64,
    x_offset: f64,
    y_offset: f64,
}

impl RichIndex {
    /// Load from a sidecar file, transparently decompressing gzip data.
    pub(crate) fn load(path: &Path) -> Result<Self, SyncError> {
        let file = std::fs::File::open(path)?;
        let mut reader = BufReader::new(file);
        let head = reader.fill_buf()?;
        let gzipped = head.starts_with(&[0x1f, 0x8b]);
        if gzipped {
            Self::parse(BufReader::new(GzDecoder::new(reader)))
        } else {
            Self::parse(reader)
        }
    }

    /// Parse already-decompressed rich-sync text.
    pub(crate) fn parse(reader: impl BufRead) -> Result<Self, SyncError> {
        let mut index = Self {
            inputs: HashMap::new(),
            pages: BTreeMap::new(),
            scale: 1.0 / SP_PER_PT,
            x_offset: 0.0,
            y_offset: 0.0,
        };

        let mut unit = 1.0f64;
        let mut magnification = 1000.0f64;
        let mut x_offset_sp = 0.0f64;
        let mut y_offset_sp = 0.0f64;

        let mut in_content = false;
        let mut saw_version = false;
        let mut current_page: Option<usize> = None;
        // Stack of box indices into the current page's region list.
        let mut open_boxes: Vec<usize> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            if !in_content {
                let (key, value) = line
                    .split_once(':')
                    .ok_or_else(|| SyncError::malformed(line_no, "expected Key:value in preamble"))?;
                match key {
                    "SyncTeX Version" => {
                        if value != "1" {
                            return Err(SyncError::UnsupportedVersion(value.to_string()));
                        }
                        saw_version = true;
                    }
                    "Input" => {
                        let (tag, name) = value.split_once(':').ok_or_else(|| {
                            SyncError::malformed(line_no, "expected Input:tag:name")
                        })?;
                        let tag = tag.parse().map_err(|_| {
                            SyncError::malformed(line_no, "input tag is not a number")
                        })?;
                        index.inputs.insert(tag, name.to_string());
                    }
                    "Magnification" => {
                        magnification = parse_float(value, line_no)?;
                    }
                    "Unit" => {
                        unit = parse_float(value, line_no)?;
                    }
                    "X Offset" => {
                        x_offset_sp = parse_float(value, line_no)?;
                    }
                    "Y Offset" => {
                        y_offset_sp = parse_float(value, line_no)?;
                    }
                    "Content" => {
                        if !saw_version {
                            return Err(SyncError::malformed(line_no, "content before version"));
                        }
                        index.scale = unit * (magnification / 1000.0) / SP_PER_PT;
                        index.x_offset = x_offset_sp * index.scale;
                        index.y_offset = y_offset_sp * index.scale;
                        in_content = true;
                    }
                    // Output, and any preamble key we do not interpret.
                    _ => {}
                }
                continue;
            }

            // Late inputs may be declared mid-content.
            if let Some(value) = line.strip_prefix("Input:") {
                let (tag, name) = value
                    .split_once(':')
                    .ok_or_else(|| SyncError::malformed(line_no, "expected Input:tag:name"))?;
                let tag = tag
                    .parse()
                    .map_err(|_| SyncError::malformed(line_no, "input tag is not a number"))?;
                index.inputs.insert(tag, name.to_string());
                continue;
            }

            let Some((head, body)) = line.split_at_checked(1) else {
                return Err(SyncError::malformed(line_no, "unrecognized record"));
            };
            match head {
                // Byte-count checkpoints carry no geometry.
                "!" => {}
                "{" => {
                    let page: usize = body.trim().parse().map_err(|_| {
                        SyncError::malformed(line_no, "sheet number is not a number")
                    })?;
                    if page == 0 {
                        return Err(SyncError::malformed(line_no, "sheet numbers are 1-indexed"));
                    }
                    current_page = Some(page - 1);
                    open_boxes.clear();
                }
                "}" => {
                    current_page = None;
                    open_boxes.clear();
                }
                "[" | "(" => {
                    let page = current_page
                        .ok_or_else(|| SyncError::malformed(line_no, "box outside a sheet"))?;
                    let (tag, src_line, nums) = parse_record(body, line_no)?;
                    if nums.len() < 5 {
                        return Err(SyncError::malformed(line_no, "box record needs x,y:W,H,D"));
                    }
                    let area = index.box_area(nums[0], nums[1], nums[2], nums[3], nums[4]);
                    let regions = index.pages.entry(page).or_default();
                    regions.boxes.push(Region {
                        area,
                        tag,
                        line: src_line,
                    });
                    open_boxes.push(regions.boxes.len() - 1);
                }
                "]" | ")" => {
                    open_boxes.pop();
                }
                // Void boxes: a closed region, nothing to push.
                "v" | "h" => {
                    let page = current_page
                        .ok_or_else(|| SyncError::malformed(line_no, "box outside a sheet"))?;
                    let (tag, src_line, nums) = parse_record(body, line_no)?;
                    if nums.len() < 5 {
                        return Err(SyncError::malformed(line_no, "box record needs x,y:W,H,D"));
                    }
                    let area = index.box_area(nums[0], nums[1], nums[2], nums[3], nums[4]);
                    index.pages.entry(page).or_default().boxes.push(Region {
                        area,
                        tag,
                        line: src_line,
                    });
                }
                // Point records: current, kern, glue, math.
                "x" | "k" | "g" | "$" => {
                    let page = current_page
                        .ok_or_else(|| SyncError::malformed(line_no, "record outside a sheet"))?;
                    let (tag, src_line, nums) = parse_record(body, line_no)?;
                    if nums.len() < 2 {
                        return Err(SyncError::malformed(line_no, "point record needs x,y"));
                    }
                    let (x, y) = index.to_point(nums[0], nums[1]);
                    index.pages.entry(page).or_default().points.push(PointRecord {
                        x,
                        y,
                        tag,
                        line: src_line,
                        enclosing: open_boxes.last().copied(),
                    });
                }
                "P" if line.starts_with("Postamble") => break,
                _ => {
                    return Err(SyncError::malformed(
                        line_no,
                        format!("unrecognized record {head:?}"),
                    ));
                }
            }
        }

        if !in_content {
            return Err(SyncError::malformed(0, "no content section"));
        }
        Ok(index)
    }

    fn to_point(&self, x_sp: i64, y_sp: i64) -> (f64, f64) {
        (
            x_sp as f64 * self.scale + self.x_offset,
            y_sp as f64 * self.scale + self.y_offset,
        )
    }

    fn box_area(&self, x_sp: i64, y_sp: i64, w_sp: i64, h_sp: i64, d_sp: i64) -> Rect {
        let (x, y) = self.to_point(x_sp, y_sp);
        let w = w_sp as f64 * self.scale;
        let h = h_sp as f64 * self.scale;
        let d = d_sp as f64 * self.scale;
        Rect::new(x, y - h, x + w, y + d)
    }

    /// Forward query: region of the nearest recorded point for the source
    /// line. Points win over bare boxes; an exact line match wins over a
    /// near one.
    pub(crate) fn forward(&self, file: &str, line: usize) -> Option<PageRect> {
        let tag = self
            .inputs
            .iter()
            .find(|(_, name)| file_matches(name, file))
            .map(|(&tag, _)| tag)?;

        let mut best_point: Option<(usize, &PointRecord, usize)> = None;
        let mut best_box: Option<(usize, &Region, usize)> = None;
        for (&page, regions) in &self.pages {
            for point in regions.points.iter().filter(|p| p.tag == tag) {
                let distance = point.line.abs_diff(line);
                if best_point.is_none_or(|(_, _, d)| distance < d) {
                    best_point = Some((page, point, distance));
                }
            }
            for region in regions.boxes.iter().filter(|r| r.tag == tag) {
                let distance = region.line.abs_diff(line);
                if best_box.is_none_or(|(_, _, d)| distance < d) {
                    best_box = Some((page, region, distance));
                }
            }
        }

        let point_hit = best_point.map(|(page, point, distance)| {
            let area = point
                .enclosing
                .and_then(|i| self.pages.get(&page).and_then(|r| r.boxes.get(i)))
                .map(|b| b.area)
                .unwrap_or_else(|| {
                    Rect::new(
                        point.x,
                        point.y - NOMINAL_LINE_HEIGHT,
                        point.x + NOMINAL_LINE_HEIGHT,
                        point.y,
                    )
                });
            (page, area, distance)
        });
        let box_hit = best_box.map(|(page, region, distance)| (page, region.area, distance));

        match (point_hit, box_hit) {
            (Some((page, area, pd)), Some((_, _, bd))) if pd <= bd => {
                Some(PageRect::new(page, area))
            }
            (Some((page, area, _)), None) => Some(PageRect::new(page, area)),
            (_, Some((page, area, _))) => Some(PageRect::new(page, area)),
            (None, None) => None,
        }
    }

    /// Reverse query: smallest region containing the point on the queried
    /// page, falling back to the nearest region within a small threshold.
    /// Neighboring pages are never consulted.
    pub(crate) fn reverse(&self, page: usize, x: f64, y: f64) -> Option<SourcePosition> {
        let regions = self.pages.get(&page)?;

        let containing = regions
            .boxes
            .iter()
            .filter(|r| r.area.contains(x, y))
            .min_by(|a, b| a.area.area().total_cmp(&b.area.area()));

        let region = match containing {
            Some(region) => region,
            None => {
                let (region, distance) = regions
                    .boxes
                    .iter()
                    .map(|r| (r, r.area.distance_to(x, y)))
                    .min_by(|(_, a), (_, b)| a.total_cmp(b))?;
                if distance > NEARBY_THRESHOLD {
                    return None;
                }
                region
            }
        };

        let file = self.inputs.get(&region.tag)?;
        Some(SourcePosition::new(file.clone(), region.line))
    }
}

fn parse_float(value: &str, line_no: usize) -> Result<f64, SyncError> {
    value
        .trim()
        .parse()
        .map_err(|_| SyncError::malformed(line_no, format!("expected a number, got {value:?}")))
}

/// Parse a record body `tag,line:x,y[:W[,H[,D]]]`.
fn parse_record(body: &str, line_no: usize) -> Result<(u32, usize, Vec<i64>), SyncError> {
    let mut parts = body.split(':');
    let head = parts
        .next()
        .ok_or_else(|| SyncError::malformed(line_no, "empty record body"))?;
    let (tag, src_line) = head
        .split_once(',')
        .ok_or_else(|| SyncError::malformed(line_no, "expected tag,line"))?;
    let tag = tag
        .trim()
        .parse()
        .map_err(|_| SyncError::malformed(line_no, "record tag is not a number"))?;
    let src_line = src_line
        .trim()
        .parse()
        .map_err(|_| SyncError::malformed(line_no, "record line is not a number"))?;
    let mut nums = Vec::new();
    for group in parts {
        for piece in group.split(',') {
            let value = piece.trim().parse().map_err(|_| {
                SyncError::malformed(line_no, format!("bad coordinate {piece:?}"))
            })?;
            nums.push(value);
        }
    }
    Ok((tag, src_line, nums))
}
