//! # Page Formats
//!
//! Named paper formats and orientation handling.
//!
//! | Format | Width (mm) | Height (mm) |
//! |--------|-----------:|------------:|
//! | A4     | 210        | 297         |
//! | A5     | 148        | 210         |
//! | Letter | 215.9      | 279.4       |
//! | Custom | explicit   | explicit    |
//!
//! Landscape swaps the resolved width and height. The canonical values in the
//! table are never modified.

use serde::{Deserialize, Serialize};

use super::{Rect, mm_to_px};
use crate::error::{GabaritError, Result};

/// Paper format of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageFormat {
    #[default]
    A4,
    A5,
    Letter,
    Custom,
}

impl PageFormat {
    /// Canonical portrait dimensions `(width, height)` in millimeters.
    ///
    /// `None` for [`PageFormat::Custom`], whose size comes from the template.
    pub fn dimensions_mm(self) -> Option<(f64, f64)> {
        match self {
            PageFormat::A4 => Some((210.0, 297.0)),
            PageFormat::A5 => Some((148.0, 210.0)),
            PageFormat::Letter => Some((215.9, 279.4)),
            PageFormat::Custom => None,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

/// Effective page dimensions in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// Whole-page rectangle anchored at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width_mm, self.height_mm)
    }

    /// Page dimensions in CSS pixels.
    pub fn to_px(&self) -> (f64, f64) {
        (mm_to_px(self.width_mm), mm_to_px(self.height_mm))
    }
}

/// The page geometry stored alongside a template.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    #[serde(default)]
    pub format: PageFormat,
    #[serde(default)]
    pub orientation: Orientation,
    /// Only consulted for [`PageFormat::Custom`].
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl PageSetup {
    pub fn new(format: PageFormat, orientation: Orientation) -> Self {
        Self {
            format,
            orientation,
            width: None,
            height: None,
        }
    }

    pub fn custom(width: f64, height: f64, orientation: Orientation) -> Self {
        Self {
            format: PageFormat::Custom,
            orientation,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Resolve the effective page size for this setup.
    pub fn page_size(&self) -> Result<PageSize> {
        resolve_page_size(self.format, self.orientation, self.width, self.height)
    }
}

/// Resolve the effective page size: format lookup, custom override, then
/// orientation swap.
///
/// ## Example
///
/// ```
/// use gabarit::geometry::{resolve_page_size, Orientation, PageFormat};
///
/// let size = resolve_page_size(PageFormat::A4, Orientation::Landscape, None, None).unwrap();
/// assert_eq!((size.width_mm, size.height_mm), (297.0, 210.0));
/// ```
pub fn resolve_page_size(
    format: PageFormat,
    orientation: Orientation,
    custom_width: Option<f64>,
    custom_height: Option<f64>,
) -> Result<PageSize> {
    let (width, height) = match format.dimensions_mm() {
        Some(dims) => dims,
        None => match (custom_width, custom_height) {
            (Some(w), Some(h)) if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 => (w, h),
            (Some(_), Some(_)) => {
                return Err(GabaritError::config(
                    "custom page dimensions must be positive numbers",
                ));
            }
            _ => {
                return Err(GabaritError::config(
                    "custom page format requires both width and height",
                ));
            }
        },
    };

    let (width_mm, height_mm) = match orientation {
        Orientation::Portrait => (width, height),
        Orientation::Landscape => (height, width),
    };
    Ok(PageSize {
        width_mm,
        height_mm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMED: [PageFormat; 3] = [PageFormat::A4, PageFormat::A5, PageFormat::Letter];

    #[test]
    fn test_named_formats_portrait() {
        let a4 = resolve_page_size(PageFormat::A4, Orientation::Portrait, None, None).unwrap();
        assert_eq!((a4.width_mm, a4.height_mm), (210.0, 297.0));
        let a5 = resolve_page_size(PageFormat::A5, Orientation::Portrait, None, None).unwrap();
        assert_eq!((a5.width_mm, a5.height_mm), (148.0, 210.0));
        let letter =
            resolve_page_size(PageFormat::Letter, Orientation::Portrait, None, None).unwrap();
        assert_eq!((letter.width_mm, letter.height_mm), (215.9, 279.4));
    }

    #[test]
    fn test_named_formats_ignore_custom_dims() {
        let size =
            resolve_page_size(PageFormat::A4, Orientation::Portrait, Some(10.0), Some(10.0))
                .unwrap();
        assert_eq!((size.width_mm, size.height_mm), (210.0, 297.0));
    }

    #[test]
    fn test_landscape_swaps() {
        for format in NAMED {
            let p = resolve_page_size(format, Orientation::Portrait, None, None).unwrap();
            let l = resolve_page_size(format, Orientation::Landscape, None, None).unwrap();
            assert_eq!(p.width_mm, l.height_mm);
            assert_eq!(p.height_mm, l.width_mm);
        }
    }

    #[test]
    fn test_orientation_flip_twice_is_identity() {
        for format in NAMED {
            for orientation in [Orientation::Portrait, Orientation::Landscape] {
                let original = resolve_page_size(format, orientation, None, None).unwrap();
                let again =
                    resolve_page_size(format, orientation.flipped().flipped(), None, None)
                        .unwrap();
                assert_eq!(original, again);
            }
        }
    }

    #[test]
    fn test_custom_requires_both_dimensions() {
        let err = resolve_page_size(PageFormat::Custom, Orientation::Portrait, Some(100.0), None)
            .unwrap_err();
        assert!(matches!(err, GabaritError::Configuration(_)));

        let err =
            resolve_page_size(PageFormat::Custom, Orientation::Portrait, None, None).unwrap_err();
        assert!(matches!(err, GabaritError::Configuration(_)));
    }

    #[test]
    fn test_custom_rejects_non_positive() {
        let err =
            resolve_page_size(PageFormat::Custom, Orientation::Portrait, Some(0.0), Some(50.0))
                .unwrap_err();
        assert!(matches!(err, GabaritError::Configuration(_)));
    }

    #[test]
    fn test_custom_landscape() {
        let setup = PageSetup::custom(100.0, 150.0, Orientation::Landscape);
        let size = setup.page_size().unwrap();
        assert_eq!((size.width_mm, size.height_mm), (150.0, 100.0));
    }

    #[test]
    fn test_page_setup_deserializes_camel_case() {
        let setup: PageSetup =
            serde_json::from_str(r#"{"format":"Custom","orientation":"landscape","width":80,"height":50}"#)
                .unwrap();
        assert_eq!(setup.format, PageFormat::Custom);
        assert_eq!(setup.orientation, Orientation::Landscape);
        assert_eq!(setup.page_size().unwrap().width_mm, 50.0);
    }
}
