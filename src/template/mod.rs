//! # Template Model
//!
//! A template is a page geometry plus an ordered list of positioned elements.
//! The same types serve the Rust API and the stored JSON configuration.
//!
//! ```ignore
//! use gabarit::template::*;
//!
//! let mut template = Template::new("Shelf label", PageSetup::default());
//! template.add_element(Element::new(ElementKind::Text(TextElement {
//!     csv_column: "designation".into(),
//!     ..Default::default()
//! })));
//!
//! let stored: StoredTemplate = serde_json::from_str(json)?;
//! let (template, report) = stored.load()?;
//! ```

pub mod row;
pub mod types;
mod validate;

pub use row::Row;
pub use types::*;
pub use validate::{is_valid_group, is_valid_table};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GabaritError, Result};
use crate::geometry::{GridSettings, PageSetup, PageSize, Rect};
use crate::migrate::{self, CURRENT_SCHEMA_VERSION, MigrationReport};

fn default_opacity() -> f64 {
    1.0
}

/// One positioned block.
///
/// Geometry is in millimeters. For group children, `x`/`y` are relative to
/// the group origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Higher draws above lower; ties keep list order.
    #[serde(default)]
    pub z_index: i32,
    /// Block background colour, or "transparent".
    #[serde(default)]
    pub background_color: Option<String>,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// A new element with an empty id and a small default frame.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: String::new(),
            x: 10.0,
            y: 10.0,
            width: 60.0,
            height: 10.0,
            opacity: 1.0,
            z_index: 0,
            background_color: None,
            rotation: 0.0,
            kind,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Stored frame (relative to the parent origin).
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Effective background: `None` when unset, empty or "transparent".
    pub fn background(&self) -> Option<&str> {
        visible_color(self.background_color.as_deref())
    }

    pub fn children(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Group(group) => &group.children,
            _ => &[],
        }
    }
}

/// Treat empty and "transparent" colours as absent.
pub(crate) fn visible_color(color: Option<&str>) -> Option<&str> {
    color
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("transparent"))
}

/// Define the ElementKind enum, its type tag and dispatch methods from a
/// single list.
///
/// Adding an element kind: add one line here, then define the struct in
/// `types.rs` with `impl ElementMeta`. The compositor's exhaustive match will
/// point at what is left.
macro_rules! define_elements {
    ($($variant:ident($inner:ty)),+ $(,)?) => {
        /// Variant payload of an element, tagged by `"type"` in JSON.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", rename_all = "camelCase")]
        pub enum ElementKind {
            $($variant($inner),)+
        }

        /// Bare element type tag, as carried by render nodes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum ElementType {
            $($variant,)+
        }

        impl ElementKind {
            pub fn element_type(&self) -> ElementType {
                match self { $(ElementKind::$variant(_) => ElementType::$variant,)+ }
            }

            /// Human-readable display label (from [`ElementMeta::label`]).
            pub fn label(&self) -> &'static str {
                match self { $(ElementKind::$variant(_) => <$inner>::label(),)+ }
            }

            /// Editor defaults for every element kind.
            pub fn all_editor_defaults() -> Vec<Self> {
                vec![$(ElementKind::$variant(<$inner>::editor_default()),)+]
            }
        }
    };
}

define_elements! {
    Text(TextElement),
    FreeText(FreeTextElement),
    JsCode(ScriptElement),
    Image(ImageElement),
    Logo(LogoElement),
    Line(LineElement),
    Rectangle(RectangleElement),
    Table(TableElement),
    Group(GroupElement),
}

impl ElementType {
    /// The `"type"` tag used in stored configurations.
    pub fn tag(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

/// Create an element with editor defaults by type tag (`"text"`, `"freeText"`, …).
///
/// Returns `None` for unknown tags. The element gets a fresh id.
pub fn default_element(type_tag: &str) -> Option<Element> {
    ElementKind::all_editor_defaults()
        .into_iter()
        .find(|kind| kind.element_type().tag() == type_tag)
        .map(|kind| Element::new(kind).with_id(uuid::Uuid::new_v4().to_string()))
}

// ============================================================================
// TEMPLATE
// ============================================================================

fn current_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// Versioned element configuration of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    #[serde(default = "current_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub grid_settings: GridSettings,
    #[serde(default)]
    pub mm_migrated: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            elements: Vec::new(),
            grid_settings: GridSettings::default(),
            mm_migrated: true,
        }
    }
}

fn default_delimiter() -> String {
    ",".into()
}

/// A reusable page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub page: PageSetup,
    #[serde(default)]
    pub background_color: Option<String>,
    /// Field delimiter of the CSV data this template is used with.
    #[serde(default = "default_delimiter")]
    pub csv_delimiter: String,
    #[serde(default)]
    pub config: TemplateConfig,
}

impl Template {
    /// Create an empty template at the current schema version.
    pub fn new(name: impl Into<String>, page: PageSetup) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            page,
            background_color: None,
            csv_delimiter: default_delimiter(),
            config: TemplateConfig::default(),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.config.elements
    }

    /// Effective page size (format lookup, custom override, orientation).
    pub fn page_size(&self) -> Result<PageSize> {
        self.page.page_size()
    }

    /// Check structural invariants. Failures are fatal to composition.
    pub fn validate(&self) -> Result<()> {
        validate::validate_elements(&self.config.elements)
    }

    /// Append an element, assigning a fresh id when it has none. Returns the id.
    pub fn add_element(&mut self, mut element: Element) -> String {
        if element.id.trim().is_empty() {
            element.id = uuid::Uuid::new_v4().to_string();
        }
        let id = element.id.clone();
        self.config.elements.push(element);
        id
    }

    /// Find an element by id, including group children.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.config.elements.iter().find_map(|el| {
            if el.id == id {
                Some(el)
            } else {
                el.children().iter().find(|child| child.id == id)
            }
        })
    }

    /// Apply `update` to the element with `id`. Returns false if not found.
    pub fn update_element(&mut self, id: &str, update: impl FnOnce(&mut Element)) -> bool {
        for el in &mut self.config.elements {
            if el.id == id {
                update(el);
                return true;
            }
            if let ElementKind::Group(group) = &mut el.kind
                && let Some(child) = group.children.iter_mut().find(|c| c.id == id)
            {
                update(child);
                return true;
            }
        }
        false
    }

    /// Remove the element with `id`, including group children.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        if let Some(pos) = self.config.elements.iter().position(|el| el.id == id) {
            return Some(self.config.elements.remove(pos));
        }
        for el in &mut self.config.elements {
            if let ElementKind::Group(group) = &mut el.kind
                && let Some(pos) = group.children.iter().position(|c| c.id == id)
            {
                return Some(group.children.remove(pos));
            }
        }
        None
    }
}

/// A template as persisted: page metadata plus an opaque, versioned config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub page: PageSetup,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default = "default_delimiter")]
    pub csv_delimiter: String,
    #[serde(default)]
    pub config: Value,
}

impl StoredTemplate {
    /// Migrate the stored config to the current schema and parse it.
    ///
    /// Fails on missing custom page dimensions, an unparseable config, or a
    /// structurally invalid element list.
    pub fn load(self) -> Result<(Template, MigrationReport)> {
        let migration = migrate::migrate(self.config, &self.page)?;
        let config: TemplateConfig = serde_json::from_value(migration.config).map_err(|e| {
            GabaritError::config(format!("unparseable template configuration: {}", e))
        })?;

        let template = Template {
            id: self.id,
            name: self.name,
            page: self.page,
            background_color: self.background_color,
            csv_delimiter: self.csv_delimiter,
            config,
        };
        template.validate()?;
        Ok((template, migration.report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Orientation, PageFormat};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_element_from_json() {
        let json = r##"{
            "id": "t1", "type": "text", "x": 10, "y": 20, "width": 50, "height": 8,
            "csvColumn": "designation", "fontSize": 14, "fontWeight": "bold",
            "hasTextModifier": true, "textPrefix": "Ref: ", "textSuffix": "!",
            "highlight": {"enabled": true, "color": "#ffff00"}
        }"##;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.id, "t1");
        assert_eq!(el.opacity, 1.0);
        assert_eq!(el.z_index, 0);
        let ElementKind::Text(text) = &el.kind else {
            panic!("expected text element");
        };
        assert_eq!(text.csv_column, "designation");
        assert_eq!(text.typography.font_size, 14.0);
        assert_eq!(text.typography.font_weight, "bold");
        assert_eq!(text.typography.font_family, "Arial");
        assert!(text.has_text_modifier);
        assert_eq!(text.highlight.as_ref().unwrap().color, "#ffff00");
    }

    #[test]
    fn test_variant_tags() {
        for (json, expected) in [
            (r#"{"id":"a","type":"freeText","content":"x"}"#, ElementType::FreeText),
            (r#"{"id":"a","type":"jsCode","code":"1"}"#, ElementType::JsCode),
            (r#"{"id":"a","type":"logo","logoId":"L1"}"#, ElementType::Logo),
            (r#"{"id":"a","type":"line","thickness":2}"#, ElementType::Line),
            (r#"{"id":"a","type":"rectangle","borderWidth":1}"#, ElementType::Rectangle),
        ] {
            let el: Element = serde_json::from_str(json).unwrap();
            assert_eq!(el.element_type(), expected);
        }
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let result: std::result::Result<Element, _> =
            serde_json::from_str(r#"{"id":"a","x":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_group_children_parse() {
        let json = r#"{"id":"g","type":"group","x":20,"y":20,"width":40,"height":40,
            "children":[{"id":"c1","type":"freeText","content":"a","x":5,"y":5}]}"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.children().len(), 1);
        assert_eq!(el.children()[0].x, 5.0);
    }

    #[test]
    fn test_element_roundtrip_keeps_tag() {
        let el = Element::new(ElementKind::Table(TableElement::editor_default())).with_id("tbl");
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["type"], "table");
        assert_eq!(value["showHeader"], true);
        let back: Element = serde_json::from_value(value).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_background_transparent() {
        let mut el = Element::new(ElementKind::FreeText(FreeTextElement::default()));
        el.background_color = Some("transparent".into());
        assert_eq!(el.background(), None);
        el.background_color = Some("#fff".into());
        assert_eq!(el.background(), Some("#fff"));
    }

    #[test]
    fn test_default_element_by_tag() {
        let el = default_element("freeText").unwrap();
        assert_eq!(el.element_type(), ElementType::FreeText);
        assert!(!el.id.is_empty());
        assert!(default_element("hologram").is_none());
        assert_eq!(ElementKind::all_editor_defaults().len(), 9);
    }

    #[test]
    fn test_editing_lifecycle() {
        let mut template = Template::new("Labels", PageSetup::new(PageFormat::A5, Orientation::Portrait));
        assert!(template.elements().is_empty());

        let id = template.add_element(Element::new(ElementKind::FreeText(FreeTextElement {
            content: "Hello".into(),
            ..Default::default()
        })));
        assert!(!id.is_empty());

        assert!(template.update_element(&id, |el| el.x = 42.0));
        assert_eq!(template.element(&id).unwrap().x, 42.0);
        assert!(!template.update_element("nope", |el| el.x = 1.0));

        let removed = template.remove_element(&id).unwrap();
        assert_eq!(removed.x, 42.0);
        assert!(template.element(&id).is_none());
    }

    #[test]
    fn test_editing_group_children() {
        let mut template = Template::new("Grouped", PageSetup::default());
        let child = Element::new(ElementKind::FreeText(FreeTextElement::default())).with_id("child");
        template.add_element(
            Element::new(ElementKind::Group(GroupElement {
                children: vec![child],
            }))
            .with_id("group"),
        );

        assert!(template.update_element("child", |el| el.y = 3.0));
        assert_eq!(template.element("child").unwrap().y, 3.0);
        assert!(template.remove_element("child").is_some());
        assert!(template.element("group").unwrap().children().is_empty());
    }

    #[test]
    fn test_load_stored_template() {
        let json = r#"{
            "id": "tpl-1", "name": "Shelf", "format": "A4", "orientation": "portrait",
            "csvDelimiter": ";",
            "config": {"elements": [
                {"id": "a", "type": "text", "csvColumn": "ref", "x": 50, "y": 50, "width": 40, "height": 10}
            ]}
        }"#;
        let stored: StoredTemplate = serde_json::from_str(json).unwrap();
        let (template, report) = stored.load().unwrap();
        assert_eq!(template.csv_delimiter, ";");
        assert_eq!(template.config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(report.from_version, 1);
        assert_eq!(template.elements()[0].x, 50.0);
    }

    #[test]
    fn test_load_rejects_custom_without_dims() {
        let json = r#"{"id": "t", "format": "Custom", "config": {"elements": []}}"#;
        let stored: StoredTemplate = serde_json::from_str(json).unwrap();
        assert!(matches!(stored.load(), Err(GabaritError::Configuration(_))));
    }

    #[test]
    fn test_load_rejects_garbage_config() {
        let json = r#"{"id": "t", "format": "A4", "config": {"schemaVersion": 2, "elements": [{"id": "x"}]}}"#;
        let stored: StoredTemplate = serde_json::from_str(json).unwrap();
        assert!(matches!(stored.load(), Err(GabaritError::Configuration(_))));
    }
}
