//! Render tree types: the output contract consumed by rasterizers and
//! previews.
//!
//! All geometry is absolute, in millimeters. Consumers needing pixels use
//! [`Rect::to_px`].

use serde::{Deserialize, Serialize};

use crate::geometry::{PageSize, Rect};
use crate::template::{Element, ElementType, ImageStyle, StrokeStyle, Typography};

/// One element resolved for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub element_id: String,
    pub element_type: ElementType,
    /// Position of the element in its source list.
    pub index: usize,
    /// Absolute frame (group offsets applied).
    pub rect: Rect,
    /// Clamped to `[0, 1]`.
    pub opacity: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub z_index: i32,
    /// `None` when unset or transparent.
    pub background: Option<String>,
    pub content: NodeContent,
}

impl RenderNode {
    pub(crate) fn new(element: &Element, index: usize, origin: (f64, f64), content: NodeContent) -> Self {
        let opacity = if element.opacity.is_finite() {
            element.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            element_id: element.id.clone(),
            element_type: element.element_type(),
            index,
            rect: element.rect().offset(origin.0, origin.1),
            opacity,
            rotation: element.rotation,
            z_index: element.z_index,
            background: element.background().map(str::to_string),
            content,
        }
    }

    /// Child nodes of a group, empty otherwise.
    pub fn children(&self) -> &[RenderNode] {
        match &self.content {
            NodeContent::Group(group) => &group.children,
            _ => &[],
        }
    }

    /// True when the element could not be fully resolved for this row.
    pub fn is_placeholder(&self) -> bool {
        match &self.content {
            NodeContent::Text(text) => text.placeholder,
            NodeContent::Image(image) => !matches!(image.state, ImageState::Resolved { .. }),
            _ => false,
        }
    }
}

/// Resolved content, by element family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeContent {
    /// `text`, `freeText` and `jsCode` blocks.
    Text(TextContent),
    /// `image` and `logo` blocks.
    Image(ImageContent),
    Line(LineContent),
    Rectangle(ShapeContent),
    Table(TableContent),
    Group(GroupContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    /// Final text, with prefix/suffix and text transform applied.
    pub text: String,
    pub typography: Typography,
    /// Highlight colour, only when highlighting is enabled.
    pub highlight: Option<String>,
    /// Set when the text stands in for a missing field or a failed script.
    pub placeholder: bool,
}

/// Image lookup outcome carried by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImageState {
    Resolved { url: String },
    /// Nothing to show yet (empty reference, no source configured).
    Unresolved { reason: String },
    /// Lookup failed; `reason` is a short user-facing diagnostic.
    NotFound { reason: String },
}

impl ImageState {
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageState::Resolved { url } => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub state: ImageState,
    pub style: ImageStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineContent {
    pub thickness: f64,
    pub color: String,
    pub style: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeContent {
    pub fill: Option<String>,
    pub border_width: f64,
    pub border_color: String,
    pub border_style: StrokeStyle,
    pub border_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    /// Header labels, when the header is shown.
    pub header: Option<Vec<String>>,
    /// One entry per sample row, one cell per column.
    pub rows: Vec<Vec<String>>,
    /// Column widths in mm.
    pub column_widths: Vec<f64>,
    pub typography: Typography,
    pub header_background: Option<String>,
    pub border_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupContent {
    pub children: Vec<RenderNode>,
}

/// One composed page: page frame plus the resolved nodes of every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPage {
    /// Index of the source row in the batch.
    pub row_index: usize,
    pub size: PageSize,
    pub background: Option<String>,
    /// Same order as the template's element list.
    pub nodes: Vec<RenderNode>,
}

impl ComposedPage {
    /// Nodes in drawing order: ascending `z_index`, ties by list order.
    pub fn paint_order(&self) -> Vec<&RenderNode> {
        paint_order(&self.nodes)
    }
}

/// Sort nodes for drawing without touching the source order.
pub fn paint_order(nodes: &[RenderNode]) -> Vec<&RenderNode> {
    let mut ordered: Vec<&RenderNode> = nodes.iter().collect();
    ordered.sort_by_key(|node| (node.z_index, node.index));
    ordered
}
