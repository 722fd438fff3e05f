//! # Units and Geometry
//!
//! All template geometry is stored in millimeters. Consumers that need
//! pixel-addressable output convert with [`mm_to_px`] using the CSS reference
//! density (96 px per inch).
//!
//! ## Calculations
//!
//! ```text
//! px_per_mm = 96 / 25.4 ≈ 3.779528
//!
//! For an A4 page (210 × 297 mm):
//!   width_px  ≈ 793.7
//!   height_px ≈ 1122.5
//! ```
//!
//! A computation should convert once at its boundary and never mix units.

mod grid;
mod guides;
mod page;

pub use grid::{GridSettings, snap_to_grid};
pub use guides::{
    AlignmentGuides, GUIDE_THRESHOLD_MM, Guide, GuideKind, compute_guides, guides_for_rect,
};
pub use page::{Orientation, PageFormat, PageSetup, PageSize, resolve_page_size};

use serde::{Deserialize, Serialize};

/// Pixels per millimeter at 96 DPI.
pub const MM_TO_PX: f64 = 96.0 / 25.4;

/// Convert millimeters to CSS pixels.
#[inline]
pub fn mm_to_px(mm: f64) -> f64 {
    mm * MM_TO_PX
}

/// Convert CSS pixels to millimeters.
#[inline]
pub fn px_to_mm(px: f64) -> f64 {
    px / MM_TO_PX
}

/// Axis-aligned rectangle in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// This rectangle shifted by an origin offset.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// The same rectangle in CSS pixels.
    pub fn to_px(&self) -> Rect {
        Rect {
            x: mm_to_px(self.x),
            y: mm_to_px(self.y),
            width: mm_to_px(self.width),
            height: mm_to_px(self.height),
        }
    }
}
