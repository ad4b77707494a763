//! Render request and raster result types.
//!
//! Provides [`RenderRequest`], the closed [`Rotation`] set, [`RenderFlags`]
//! hints, and the [`Raster`] payload a successful request produces. Requests
//! and rasters are transient: consumed once per call, never persisted.

use bitflags::bitflags;

/// Page rotation for rendering. Only quarter turns exist, so an invalid
/// angle is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Parse a rotation angle in degrees. Returns `None` for anything
    /// outside {0, 90, 180, 270}.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::R0),
            90 => Some(Self::R90),
            180 => Some(Self::R180),
            270 => Some(Self::R270),
            _ => None,
        }
    }

    /// The rotation angle in degrees.
    pub fn degrees(&self) -> i32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }
}

bitflags! {
    /// Render quality hints passed through to the backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RenderFlags: u32 {
        /// Antialias graphics.
        const ANTIALIASING = 1;
        /// Antialias text.
        const TEXT_ANTIALIASING = 1 << 1;
        /// Apply font hinting.
        const TEXT_HINTING = 1 << 2;
    }
}

/// A request to rasterize one page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// 0-indexed page to render.
    pub page: usize,
    /// Target raster width in pixels; must be positive.
    pub width: u32,
    /// Target raster height in pixels; must be positive.
    pub height: u32,
    /// Extra rotation applied on top of the page's own.
    pub rotation: Rotation,
    /// Render quality hints.
    pub flags: RenderFlags,
}

impl RenderRequest {
    /// A request with default rotation and flags.
    pub fn new(page: usize, width: u32, height: u32) -> Self {
        Self {
            page,
            width,
            height,
            rotation: Rotation::R0,
            flags: RenderFlags::default(),
        }
    }
}

/// A rasterized page: tightly packed RGBA8 rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, `width * height * 4` bytes, row-major RGBA.
    pub data: Vec<u8>,
}

impl Raster {
    /// An opaque-white raster of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0xff; width as usize * height as usize * 4],
        }
    }
}
