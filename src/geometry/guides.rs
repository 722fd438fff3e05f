//! Smart alignment guides.
//!
//! While an element is dragged or resized, the editor asks for guide lines
//! that its edges or center come close to. Candidates are the edges and
//! centers of every other element, plus the page center. Matching is purely
//! advisory: nothing is moved here.
//!
//! Group children are compared on their page position (group origin added).

use serde::Serialize;

use super::{PageSize, Rect};
use crate::template::Element;

/// Maximum distance (mm) between two lines for them to count as aligned.
pub const GUIDE_THRESHOLD_MM: f64 = 2.0;

/// What a guide line aligns with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideKind {
    Edge,
    Center,
    PageCenter,
}

/// One matched guide line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Guide {
    /// Position of the line on its axis (mm).
    pub position: f64,
    pub kind: GuideKind,
    /// Distance the moving rectangle must shift to sit exactly on the line.
    pub offset: f64,
}

/// Guide lines matched for a moving rectangle.
///
/// `vertical` lines are x positions, `horizontal` lines are y positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignmentGuides {
    pub vertical: Vec<Guide>,
    pub horizontal: Vec<Guide>,
}

impl AlignmentGuides {
    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }

    /// Shift `rect` onto the closest matched guide of each axis.
    pub fn snap(&self, rect: Rect) -> Rect {
        let dx = nearest_offset(&self.vertical);
        let dy = nearest_offset(&self.horizontal);
        Rect {
            x: rect.x + dx,
            y: rect.y + dy,
            ..rect
        }
    }
}

fn nearest_offset(guides: &[Guide]) -> f64 {
    guides
        .iter()
        .map(|g| g.offset)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0)
}

/// Compute guide lines for `moving` against the rest of `elements`.
///
/// `elements` is the full element list; `moving` itself (matched by id) and
/// its own children are skipped. When `moving` is a group child its frame is
/// taken relative to the group, like every stored child frame.
pub fn compute_guides(moving: &Element, elements: &[Element], page: PageSize) -> AlignmentGuides {
    let mut moving_rect = moving.rect();
    let mut others = Vec::new();

    for element in elements {
        if element.id == moving.id {
            continue;
        }
        others.push(element.rect());
        for child in element.children() {
            let absolute = child.rect().offset(element.x, element.y);
            if child.id == moving.id {
                moving_rect = moving.rect().offset(element.x, element.y);
            } else {
                others.push(absolute);
            }
        }
    }

    guides_for_rect(&moving_rect, &others, page)
}

/// Compute guide lines for a free rectangle against `others` and the page
/// center. All rectangles are in page coordinates.
pub fn guides_for_rect(moving: &Rect, others: &[Rect], page: PageSize) -> AlignmentGuides {
    let mut guides = AlignmentGuides::default();

    let moving_x = [moving.left(), moving.right()];
    let moving_y = [moving.top(), moving.bottom()];

    for other in others {
        for target in [other.left(), other.right()] {
            for edge in moving_x {
                push_match(&mut guides.vertical, edge, target, GuideKind::Edge);
            }
        }
        for target in [other.top(), other.bottom()] {
            for edge in moving_y {
                push_match(&mut guides.horizontal, edge, target, GuideKind::Edge);
            }
        }
        push_match(
            &mut guides.vertical,
            moving.center_x(),
            other.center_x(),
            GuideKind::Center,
        );
        push_match(
            &mut guides.horizontal,
            moving.center_y(),
            other.center_y(),
            GuideKind::Center,
        );
    }

    push_match(
        &mut guides.vertical,
        moving.center_x(),
        page.width_mm / 2.0,
        GuideKind::PageCenter,
    );
    push_match(
        &mut guides.horizontal,
        moving.center_y(),
        page.height_mm / 2.0,
        GuideKind::PageCenter,
    );

    guides
}

fn push_match(out: &mut Vec<Guide>, line: f64, target: f64, kind: GuideKind) {
    let offset = target - line;
    if offset.abs() > GUIDE_THRESHOLD_MM {
        return;
    }
    // Several elements often share the same line; report it once.
    if out
        .iter()
        .any(|g| g.kind == kind && (g.position - target).abs() < 1e-9)
    {
        return;
    }
    out.push(Guide {
        position: target,
        kind,
        offset,
    });
}
