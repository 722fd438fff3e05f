//! Element struct types for the template model.
//!
//! All types derive `Serialize + Deserialize` with camelCase keys, matching
//! the configuration stored by the editor.
//!
//! Each element kind implements [`ElementMeta`] to declare its display label
//! and editor default, next to the struct definition.

use serde::{Deserialize, Serialize};

/// Metadata that every element struct must provide.
pub trait ElementMeta: Sized {
    /// Human-readable display label (e.g. "Free Text", "Table").
    fn label() -> &'static str;

    /// Starter value used when the editor adds a new block.
    ///
    /// Distinct from `Default`: editor defaults carry example content so a
    /// new block is visible immediately.
    fn editor_default() -> Self;
}

fn default_true() -> bool {
    true
}

fn default_black() -> String {
    "#000000".into()
}

// ============================================================================
// TYPOGRAPHY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => capitalize_words(text),
        }
    }
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    out
}

fn default_font_family() -> String {
    "Arial".into()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_font_weight() -> String {
    "normal".into()
}

fn default_line_height() -> f64 {
    1.2
}

/// Typography shared by every text-bearing element and table cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in points.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// CSS weight keyword or number ("normal", "bold", "600").
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default = "default_black")]
    pub color: String,
    #[serde(default)]
    pub text_align: HorizontalAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub letter_spacing: f64,
    #[serde(default)]
    pub text_transform: TextTransform,
    #[serde(default = "default_true")]
    pub word_wrap: bool,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            italic: false,
            color: default_black(),
            text_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: default_line_height(),
            letter_spacing: 0.0,
            text_transform: TextTransform::None,
            word_wrap: true,
        }
    }
}

// ============================================================================
// TEXT ELEMENTS
// ============================================================================

/// Background highlight behind text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub color: String,
}

/// Text bound to one row field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Name of the row field rendered by this block.
    #[serde(default)]
    pub csv_column: String,
    #[serde(flatten)]
    pub typography: Typography,
    /// When set, the value is wrapped as `prefix + value + suffix`.
    #[serde(default)]
    pub has_text_modifier: bool,
    #[serde(default)]
    pub text_prefix: String,
    #[serde(default)]
    pub text_suffix: String,
    #[serde(default)]
    pub highlight: Option<Highlight>,
}

impl ElementMeta for TextElement {
    fn label() -> &'static str { "Text Field" }
    fn editor_default() -> Self {
        Self { csv_column: "designation".into(), ..Default::default() }
    }
}

/// Literal text, identical on every row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTextElement {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub typography: Typography,
}

impl ElementMeta for FreeTextElement {
    fn label() -> &'static str { "Free Text" }
    fn editor_default() -> Self {
        Self { content: "Text".into(), ..Default::default() }
    }
}

/// Text computed by a user expression evaluated against the row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptElement {
    #[serde(default)]
    pub code: String,
    #[serde(flatten)]
    pub typography: Typography,
}

impl ElementMeta for ScriptElement {
    fn label() -> &'static str { "Script" }
    fn editor_default() -> Self {
        Self { code: "today()".into(), ..Default::default() }
    }
}

// ============================================================================
// IMAGE ELEMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Contain,
    Cover,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskShape {
    #[default]
    None,
    Circle,
    Ellipse,
    Rounded,
}

/// Crop percentages per edge (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Crop {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

/// Presentation attributes shared by image and logo blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStyle {
    #[serde(default)]
    pub object_fit: FitMode,
    #[serde(default)]
    pub crop: Crop,
    #[serde(default)]
    pub mask: MaskShape,
    /// Corner radius in mm, used by [`MaskShape::Rounded`].
    #[serde(default)]
    pub corner_radius: f64,
}

/// Product image bound to a row field holding a reference.
///
/// Two sourcing modes:
/// - direct: `baseUrl + value + extension`
/// - page template: `pageUrlTemplate` with tokens expanded; when `selector`
///   is set the page is fetched and `attribute` of the first match is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    #[serde(default)]
    pub csv_column: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub page_url_template: Option<String>,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
    /// Percent-encode values inserted into URLs.
    #[serde(default = "default_true")]
    pub encode_value: bool,
    #[serde(flatten)]
    pub style: ImageStyle,
}

impl Default for ImageElement {
    fn default() -> Self {
        Self {
            csv_column: String::new(),
            base_url: None,
            extension: None,
            page_url_template: None,
            selector: None,
            attribute: None,
            encode_value: true,
            style: ImageStyle::default(),
        }
    }
}

impl ElementMeta for ImageElement {
    fn label() -> &'static str { "Image" }
    fn editor_default() -> Self {
        Self { csv_column: "reference".into(), extension: Some(".jpg".into()), ..Default::default() }
    }
}

/// Fixed asset (not row-bound).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoElement {
    #[serde(default)]
    pub logo_id: String,
    /// Asset source (URL or data URL) as provided by the asset store.
    #[serde(default)]
    pub src: Option<String>,
    #[serde(flatten)]
    pub style: ImageStyle,
}

impl ElementMeta for LogoElement {
    fn label() -> &'static str { "Logo" }
    fn editor_default() -> Self {
        Self::default()
    }
}

// ============================================================================
// SHAPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

fn default_thickness() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    /// Stroke thickness in mm.
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    #[serde(default = "default_black")]
    pub color: String,
    #[serde(default)]
    pub line_style: StrokeStyle,
}

impl Default for LineElement {
    fn default() -> Self {
        Self {
            thickness: default_thickness(),
            color: default_black(),
            line_style: StrokeStyle::Solid,
        }
    }
}

impl ElementMeta for LineElement {
    fn label() -> &'static str { "Line" }
    fn editor_default() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleElement {
    /// Fill colour, or "transparent".
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub border_width: f64,
    #[serde(default = "default_black")]
    pub border_color: String,
    #[serde(default)]
    pub border_style: StrokeStyle,
    #[serde(default)]
    pub border_radius: f64,
}

impl Default for RectangleElement {
    fn default() -> Self {
        Self {
            fill_color: None,
            border_width: 0.0,
            border_color: default_black(),
            border_style: StrokeStyle::Solid,
            border_radius: 0.0,
        }
    }
}

impl ElementMeta for RectangleElement {
    fn label() -> &'static str { "Rectangle" }
    fn editor_default() -> Self {
        Self { border_width: 0.5, ..Default::default() }
    }
}

// ============================================================================
// TABLE & GROUP
// ============================================================================

/// One table column, resolved per row at render time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub csv_column: String,
    /// Header label; defaults to the field name.
    #[serde(default)]
    pub header: Option<String>,
    /// Column width in mm; columns without one share the remaining width.
    #[serde(default)]
    pub width: Option<f64>,
}

impl TableColumn {
    pub fn new(csv_column: impl Into<String>) -> Self {
        Self {
            csv_column: csv_column.into(),
            ..Default::default()
        }
    }

    pub fn header_label(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.csv_column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableElement {
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    #[serde(default = "default_true")]
    pub show_header: bool,
    #[serde(default)]
    pub header_background: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(flatten)]
    pub typography: Typography,
}

impl Default for TableElement {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            show_header: true,
            header_background: None,
            border_color: None,
            typography: Typography::default(),
        }
    }
}

impl ElementMeta for TableElement {
    fn label() -> &'static str { "Table" }
    fn editor_default() -> Self {
        Self {
            columns: vec![TableColumn::new("reference"), TableColumn::new("designation")],
            ..Default::default()
        }
    }
}

/// Children are positioned relative to the group origin. Groups hold leaf
/// elements only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupElement {
    #[serde(default)]
    pub children: Vec<super::Element>,
}

impl ElementMeta for GroupElement {
    fn label() -> &'static str { "Group" }
    fn editor_default() -> Self {
        Self::default()
    }
}
