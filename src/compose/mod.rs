//! # Compositing Engine
//!
//! Turns a (migrated) [`Template`] and one [`Row`] into [`RenderNode`]s.
//!
//! ## Per element
//!
//! | Element | Content |
//! |---------|---------|
//! | `text` | row field (field name when missing), prefix/suffix, text transform |
//! | `freeText` | literal content |
//! | `jsCode` | sandboxed script output, or a marker on timeout/fault |
//! | `image` | resolved URL, or an unresolved / not-found state |
//! | `logo` | stored asset source |
//! | `line`, `rectangle` | stroke and fill styling |
//! | `table` | optional header plus one row per sample row |
//! | `group` | children offset by the group origin |
//!
//! ## Guarantees
//!
//! - Output nodes are index-aligned with the element list, whatever order
//!   image lookups and scripts finish in. Drawing order is available via
//!   [`ComposedPage::paint_order`].
//! - A failing element degrades to a placeholder; only template-level
//!   problems (invalid structure, unusable page setup) return `Err`.
//! - Scraped image URLs are memoized per call (per batch for
//!   [`Compositor::compose_batch`]); nothing outlives the request, so a
//!   transient fetch failure is retried by the next call.
//! - Cancelling the token drops in-flight lookups and stops running
//!   scripts; the image cache is left consistent.
//!
//! ## Example
//!
//! ```ignore
//! let compositor = Compositor::from_config(&EngineConfig::from_env()?)?;
//! let nodes = compositor.compose(&template, &row).await?;
//! let pages = compositor.compose_batch(&template, &rows, &cancel).await?;
//! ```

pub mod batch;
pub mod node;

pub use node::{
    ComposedPage, GroupContent, ImageContent, ImageState, LineContent, NodeContent, RenderNode,
    ShapeContent, TableContent, TextContent, paint_order,
};

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::error::{GabaritError, Result};
use crate::resolve::{
    HttpPageFetcher, ImageResolver, ImageSource, PageFetcher, Resolution, resolve_field,
    resolve_text,
};
use crate::script::{self, ScriptSandbox};
use crate::template::{
    Element, ElementKind, ImageElement, LogoElement, Row, ScriptElement, TableElement,
    TextElement, Template, Typography, visible_color,
};

/// Per-call inputs shared by every element of one page.
struct RowContext<'a> {
    images: &'a ImageResolver,
    row: &'a Row,
    table_rows: &'a [Row],
    cancel: &'a CancellationToken,
}

/// Composes templates against rows.
///
/// Holds no per-request state: image lookups are memoized in a cache owned
/// by the call (or batch) that made them.
#[derive(Clone)]
pub struct Compositor {
    fetcher: Arc<dyn PageFetcher>,
    scripts: ScriptSandbox,
    concurrency: usize,
}

impl Compositor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            scripts: ScriptSandbox::new(),
            concurrency: EngineConfig::default().batch_concurrency,
        }
    }

    /// Compositor fetching product pages over HTTP.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher)).with_concurrency(config.batch_concurrency))
    }

    pub fn with_scripts(mut self, scripts: ScriptSandbox) -> Self {
        self.scripts = scripts;
        self
    }

    /// Rows composed in parallel by [`compose_batch`](Self::compose_batch).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Image resolver with an empty cache, scoped to one request or batch.
    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(self.fetcher.clone())
    }

    /// Compose one row. Tables show this row as their only sample.
    pub async fn compose(&self, template: &Template, row: &Row) -> Result<Vec<RenderNode>> {
        self.compose_with(template, row, &[], &CancellationToken::new())
            .await
    }

    /// Compose one row with explicit table sample rows and cancellation.
    ///
    /// Empty `table_rows` means tables show `row`.
    pub async fn compose_with(
        &self,
        template: &Template,
        row: &Row,
        table_rows: &[Row],
        cancel: &CancellationToken,
    ) -> Result<Vec<RenderNode>> {
        self.compose_nodes(&self.image_resolver(), template, row, table_rows, cancel)
            .await
    }

    async fn compose_nodes(
        &self,
        images: &ImageResolver,
        template: &Template,
        row: &Row,
        table_rows: &[Row],
        cancel: &CancellationToken,
    ) -> Result<Vec<RenderNode>> {
        template.validate()?;
        template.page_size()?;

        let ctx = RowContext {
            images,
            row,
            table_rows: if table_rows.is_empty() {
                std::slice::from_ref(row)
            } else {
                table_rows
            },
            cancel,
        };

        let pending = template
            .elements()
            .iter()
            .enumerate()
            .map(|(index, element)| self.compose_element(element, index, &ctx));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GabaritError::Cancelled),
            nodes = join_all(pending) => Ok(nodes),
        }
    }

    /// Compose one row into a full page (size, background, nodes).
    pub async fn compose_page(
        &self,
        template: &Template,
        row: &Row,
        row_index: usize,
        cancel: &CancellationToken,
    ) -> Result<ComposedPage> {
        self.page_with(&self.image_resolver(), template, row, row_index, cancel)
            .await
    }

    pub(crate) async fn page_with(
        &self,
        images: &ImageResolver,
        template: &Template,
        row: &Row,
        row_index: usize,
        cancel: &CancellationToken,
    ) -> Result<ComposedPage> {
        let size = template.page_size()?;
        let nodes = self
            .compose_nodes(images, template, row, &[], cancel)
            .await?;
        Ok(ComposedPage {
            row_index,
            size,
            background: visible_color(template.background_color.as_deref()).map(str::to_string),
            nodes,
        })
    }

    async fn compose_element(&self, element: &Element, index: usize, ctx: &RowContext<'_>) -> RenderNode {
        match &element.kind {
            ElementKind::Group(group) => {
                let origin = (element.x, element.y);
                let children = join_all(
                    group
                        .children
                        .iter()
                        .enumerate()
                        .map(|(i, child)| self.compose_leaf(child, i, origin, ctx)),
                )
                .await;
                RenderNode::new(
                    element,
                    index,
                    (0.0, 0.0),
                    NodeContent::Group(GroupContent { children }),
                )
            }
            _ => self.compose_leaf(element, index, (0.0, 0.0), ctx).await,
        }
    }

    async fn compose_leaf(
        &self,
        element: &Element,
        index: usize,
        origin: (f64, f64),
        ctx: &RowContext<'_>,
    ) -> RenderNode {
        let content = match &element.kind {
            ElementKind::Text(text) => bound_text(text, ctx.row),
            ElementKind::FreeText(free) => {
                NodeContent::Text(styled_text(&free.content, &free.typography, None, false))
            }
            ElementKind::JsCode(block) => self.script_text(element, block, ctx).await,
            ElementKind::Image(image) => image_content(element, image, ctx).await,
            ElementKind::Logo(logo) => logo_image(logo),
            ElementKind::Line(line) => NodeContent::Line(LineContent {
                thickness: line.thickness,
                color: line.color.clone(),
                style: line.line_style,
            }),
            ElementKind::Rectangle(rect) => NodeContent::Rectangle(ShapeContent {
                fill: visible_color(rect.fill_color.as_deref()).map(str::to_string),
                border_width: rect.border_width,
                border_color: rect.border_color.clone(),
                border_style: rect.border_style,
                border_radius: rect.border_radius,
            }),
            ElementKind::Table(table) => table_content(table, element.width, ctx.table_rows),
            // Groups only hold leaves; validation rejects nesting.
            ElementKind::Group(_) => NodeContent::Group(GroupContent::default()),
        };
        RenderNode::new(element, index, origin, content)
    }

    async fn script_text(
        &self,
        element: &Element,
        block: &ScriptElement,
        ctx: &RowContext<'_>,
    ) -> NodeContent {
        let (text, failed) = match self.scripts.run(&block.code, ctx.row, ctx.cancel).await {
            Ok(text) => (text, false),
            Err(err) => {
                tracing::warn!(element = %element.id, error = %err, "script block degraded");
                (script::marker(&err).to_string(), true)
            }
        };
        NodeContent::Text(styled_text(&text, &block.typography, None, failed))
    }
}

async fn image_content(element: &Element, image: &ImageElement, ctx: &RowContext<'_>) -> NodeContent {
    let value = ctx.row.text(&image.csv_column).unwrap_or_default();
    let source = ImageSource::from(image);
    let state = match ctx
        .images
        .resolve_for_element(&element.id, &value, &source, ctx.row)
        .await
    {
        Resolution::Resolved(url) => ImageState::Resolved { url },
        Resolution::Unresolved(reason) => ImageState::Unresolved { reason },
        Resolution::Failed(err) => {
            tracing::warn!(element = %element.id, reason = %err, "image not resolved");
            ImageState::NotFound { reason: err.0 }
        }
    };
    NodeContent::Image(ImageContent {
        state,
        style: image.style.clone(),
    })
}

fn styled_text(
    text: &str,
    typography: &Typography,
    highlight: Option<String>,
    placeholder: bool,
) -> TextContent {
    TextContent {
        text: typography.text_transform.apply(text),
        typography: typography.clone(),
        highlight,
        placeholder,
    }
}

fn bound_text(element: &TextElement, row: &Row) -> NodeContent {
    let missing = row.text(&element.csv_column).is_none();
    let highlight = element
        .highlight
        .as_ref()
        .filter(|h| h.enabled)
        .and_then(|h| visible_color(Some(&h.color)))
        .map(str::to_string);
    NodeContent::Text(styled_text(
        &resolve_text(element, row),
        &element.typography,
        highlight,
        missing,
    ))
}

fn logo_image(logo: &LogoElement) -> NodeContent {
    let state = match logo.src.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(src) => ImageState::Resolved {
            url: src.to_string(),
        },
        None => ImageState::Unresolved {
            reason: "no logo asset".into(),
        },
    };
    NodeContent::Image(ImageContent {
        state,
        style: logo.style.clone(),
    })
}

/// Explicit widths are kept; the other columns share what is left.
fn column_widths(table: &TableElement, total_width: f64) -> Vec<f64> {
    let fixed: f64 = table.columns.iter().filter_map(|c| c.width).sum();
    let flexible = table.columns.iter().filter(|c| c.width.is_none()).count();
    let share = if flexible == 0 {
        0.0
    } else {
        (total_width - fixed).max(0.0) / flexible as f64
    };
    table
        .columns
        .iter()
        .map(|c| c.width.unwrap_or(share))
        .collect()
}

fn table_content(table: &TableElement, total_width: f64, rows: &[Row]) -> NodeContent {
    let transform = table.typography.text_transform;
    let header = table.show_header.then(|| {
        table
            .columns
            .iter()
            .map(|c| transform.apply(c.header_label()))
            .collect()
    });
    let rows = rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .map(|c| transform.apply(&resolve_field(row, &c.csv_column)))
                .collect()
        })
        .collect();

    NodeContent::Table(TableContent {
        header,
        rows,
        column_widths: column_widths(table, total_width),
        typography: table.typography.clone(),
        header_background: visible_color(table.header_background.as_deref()).map(str::to_string),
        border_color: table.border_color.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageResolutionError;
    use crate::geometry::PageSetup;
    use crate::resolve::StaticPageFetcher;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Notify, Semaphore};
    use crate::template::{
        FreeTextElement, GroupElement, Highlight, TableColumn, TextTransform,
    };
    use pretty_assertions::assert_eq;
    use std::time::{Duration, Instant};

    const PAGE: &str = r#"<html><body><img class="main" src="/img/AB12.jpg"></body></html>"#;

    /// Times out on its first fetch, serves `PAGE` afterwards.
    #[derive(Default)]
    struct FlakyFetcher {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch_page(&self, _url: &str) -> std::result::Result<String, ImageResolutionError> {
            if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ImageResolutionError::new("product page timed out"))
            } else {
                Ok(PAGE.to_string())
            }
        }
    }

    /// Holds every fetch until a permit is released.
    struct GatedFetcher {
        gate: Semaphore,
        started: Notify,
        fetches: AtomicUsize,
    }

    impl GatedFetcher {
        fn closed() -> Self {
            Self {
                gate: Semaphore::new(0),
                started: Notify::new(),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for GatedFetcher {
        async fn fetch_page(&self, _url: &str) -> std::result::Result<String, ImageResolutionError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| ImageResolutionError::new("gate closed"))?;
            Ok(PAGE.to_string())
        }
    }

    fn compositor() -> Compositor {
        let fetcher = StaticPageFetcher::new().with_page("https://shop.test/p/AB12", PAGE);
        Compositor::new(Arc::new(fetcher))
            .with_scripts(ScriptSandbox::with_timeout(Duration::from_millis(300)))
    }

    fn template(elements: Vec<Element>) -> Template {
        let mut template = Template::new("test", PageSetup::default());
        for el in elements {
            template.add_element(el);
        }
        template
    }

    fn free_text(id: &str, x: f64, y: f64) -> Element {
        Element::new(ElementKind::FreeText(FreeTextElement {
            content: id.to_string(),
            ..Default::default()
        }))
        .with_id(id)
        .at(x, y)
    }

    fn scraped_image(id: &str) -> Element {
        Element::new(ElementKind::Image(ImageElement {
            csv_column: "ref".into(),
            page_url_template: Some("https://shop.test/p/%REF%".into()),
            selector: Some("img.main".into()),
            ..Default::default()
        }))
        .with_id(id)
    }

    fn text_of(node: &RenderNode) -> &str {
        match &node.content {
            NodeContent::Text(text) => &text.text,
            other => panic!("expected text content, got {:?}", other),
        }
    }

    fn image_state(node: &RenderNode) -> &ImageState {
        match &node.content {
            NodeContent::Image(image) => &image.state,
            other => panic!("expected image content, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_group_children_absolute_positions() {
        let group = Element::new(ElementKind::Group(GroupElement {
            children: vec![free_text("c1", 5.0, 5.0), free_text("c2", 10.0, 10.0)],
        }))
        .with_id("g")
        .at(20.0, 20.0);

        let nodes = compositor().compose(&template(vec![group]), &Row::new()).await.unwrap();
        let children = nodes[0].children();
        assert_eq!((children[0].rect.x, children[0].rect.y), (25.0, 25.0));
        assert_eq!((children[1].rect.x, children[1].rect.y), (30.0, 30.0));
    }

    #[tokio::test]
    async fn test_text_resolution_and_transform() {
        let el = Element::new(ElementKind::Text(TextElement {
            csv_column: "designation".into(),
            has_text_modifier: true,
            text_prefix: "Ref: ".into(),
            text_suffix: "!".into(),
            typography: Typography {
                text_transform: TextTransform::Uppercase,
                ..Default::default()
            },
            highlight: Some(Highlight {
                enabled: false,
                color: "#ff0".into(),
            }),
        }))
        .with_id("t");
        let row = Row::from_pairs([("designation", "Widget")]);

        let nodes = compositor().compose(&template(vec![el]), &row).await.unwrap();
        let NodeContent::Text(text) = &nodes[0].content else {
            panic!("expected text");
        };
        assert_eq!(text.text, "REF: WIDGET!");
        assert_eq!(text.highlight, None);
        assert!(!text.placeholder);
    }

    #[tokio::test]
    async fn test_missing_field_is_placeholder() {
        let el = Element::new(ElementKind::Text(TextElement {
            csv_column: "price".into(),
            ..Default::default()
        }))
        .with_id("t");
        let nodes = compositor().compose(&template(vec![el]), &Row::new()).await.unwrap();
        assert_eq!(text_of(&nodes[0]), "price");
        assert!(nodes[0].is_placeholder());
    }

    #[tokio::test]
    async fn test_failed_image_only_degrades_that_element() {
        let elements = vec![free_text("before", 0.0, 0.0), scraped_image("img"), free_text("after", 0.0, 0.0)];
        let row = Row::from_pairs([("ref", "MISSING")]);

        let nodes = compositor().compose(&template(elements), &row).await.unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(text_of(&nodes[0]), "before");
        assert!(matches!(image_state(&nodes[1]), ImageState::NotFound { .. }));
        assert_eq!(text_of(&nodes[2]), "after");
    }

    #[tokio::test]
    async fn test_scraped_image_resolved() {
        let row = Row::from_pairs([("ref", "AB12")]);
        let nodes = compositor()
            .compose(&template(vec![scraped_image("img")]), &row)
            .await
            .unwrap();
        assert_eq!(image_state(&nodes[0]).url(), Some("https://shop.test/img/AB12.jpg"));
    }

    #[tokio::test]
    async fn test_empty_reference_is_unresolved_not_error() {
        let row = Row::from_pairs([("ref", "")]);
        let nodes = compositor()
            .compose(&template(vec![scraped_image("img")]), &row)
            .await
            .unwrap();
        assert!(matches!(image_state(&nodes[0]), ImageState::Unresolved { .. }));
    }

    #[tokio::test]
    async fn test_output_is_index_aligned_and_paint_order_sorted() {
        let mut top = free_text("top", 0.0, 0.0);
        top.z_index = 5;
        let elements = vec![top, free_text("a", 0.0, 0.0), free_text("b", 0.0, 0.0)];

        let nodes = compositor().compose(&template(elements), &Row::new()).await.unwrap();
        let ids: Vec<&str> = nodes.iter().map(|n| n.element_id.as_str()).collect();
        assert_eq!(ids, vec!["top", "a", "b"]);

        let painted: Vec<&str> = paint_order(&nodes).iter().map(|n| n.element_id.as_str()).collect();
        assert_eq!(painted, vec!["a", "b", "top"]);
    }

    #[tokio::test]
    async fn test_script_faults_become_markers() {
        let ok = Element::new(ElementKind::JsCode(ScriptElement {
            code: r#"row.name + "!""#.into(),
            ..Default::default()
        }))
        .with_id("ok");
        let bad = Element::new(ElementKind::JsCode(ScriptElement {
            code: "return 1/0".into(),
            ..Default::default()
        }))
        .with_id("bad");
        let row = Row::from_pairs([("name", "Ada")]);

        let nodes = compositor().compose(&template(vec![ok, bad]), &row).await.unwrap();
        assert_eq!(text_of(&nodes[0]), "Ada!");
        assert_eq!(text_of(&nodes[1]), script::FAULT_MARKER);
        assert!(nodes[1].is_placeholder());
    }

    #[tokio::test]
    async fn test_table_expands_sample_rows() {
        let table = Element::new(ElementKind::Table(TableElement {
            columns: vec![
                TableColumn {
                    width: Some(20.0),
                    header: Some("Ref".into()),
                    ..TableColumn::new("ref")
                },
                TableColumn::new("name"),
                TableColumn::new("qty"),
            ],
            ..Default::default()
        }))
        .with_id("tbl")
        .sized(100.0, 30.0);
        let samples = vec![
            Row::from_pairs([("ref", "A1"), ("name", "Mug"), ("qty", "2")]),
            Row::from_pairs([("ref", "B2"), ("name", "Cup")]),
        ];

        let nodes = compositor()
            .compose_with(&template(vec![table]), &samples[0], &samples, &CancellationToken::new())
            .await
            .unwrap();
        let NodeContent::Table(content) = &nodes[0].content else {
            panic!("expected table");
        };
        assert_eq!(
            content.header,
            Some(vec!["Ref".to_string(), "name".to_string(), "qty".to_string()])
        );
        assert_eq!(content.rows.len(), 2);
        assert_eq!(content.rows[1], vec!["B2", "Cup", "qty"]);
        assert_eq!(content.column_widths, vec![20.0, 40.0, 40.0]);
    }

    #[tokio::test]
    async fn test_shapes_and_logo() {
        let rect = Element::new(ElementKind::Rectangle(crate::template::RectangleElement {
            fill_color: Some("transparent".into()),
            border_width: 0.5,
            ..Default::default()
        }))
        .with_id("r");
        let logo = Element::new(ElementKind::Logo(LogoElement {
            logo_id: "brand".into(),
            src: Some("https://assets.test/brand.png".into()),
            ..Default::default()
        }))
        .with_id("l");

        let nodes = compositor().compose(&template(vec![rect, logo]), &Row::new()).await.unwrap();
        let NodeContent::Rectangle(shape) = &nodes[0].content else {
            panic!("expected rectangle");
        };
        assert_eq!(shape.fill, None);
        assert_eq!(shape.border_width, 0.5);
        assert_eq!(image_state(&nodes[1]).url(), Some("https://assets.test/brand.png"));
    }

    #[tokio::test]
    async fn test_invalid_template_is_fatal() {
        let elements = vec![free_text("dup", 0.0, 0.0), free_text("dup", 1.0, 1.0)];
        let result = compositor().compose(&template(elements), &Row::new()).await;
        assert!(matches!(result, Err(GabaritError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_cancel_aborts_running_script() {
        let slow = Element::new(ElementKind::JsCode(ScriptElement {
            code: "loop {}".into(),
            ..Default::default()
        }))
        .with_id("slow");
        let compositor = compositor().with_scripts(ScriptSandbox::new());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = compositor
            .compose_with(&template(vec![slow]), &Row::new(), &[], &cancel)
            .await;
        assert!(matches!(result, Err(GabaritError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_failed_lookup_is_retried_on_next_compose() {
        let fetcher = Arc::new(FlakyFetcher::default());
        let compositor = Compositor::new(fetcher.clone());
        let template = template(vec![scraped_image("img")]);
        let row = Row::from_pairs([("ref", "AB12")]);

        let first = compositor.compose(&template, &row).await.unwrap();
        assert_eq!(
            image_state(&first[0]),
            &ImageState::NotFound {
                reason: "product page timed out".into()
            }
        );

        let second = compositor.compose(&template, &row).await.unwrap();
        assert_eq!(image_state(&second[0]).url(), Some("https://shop.test/img/AB12.jpg"));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_mid_fetch_leaves_cache_unsettled() {
        let fetcher = Arc::new(GatedFetcher::closed());
        let compositor = Compositor::new(fetcher.clone());
        let images = compositor.image_resolver();
        let template = template(vec![scraped_image("img")]);
        let row = Row::from_pairs([("ref", "AB12")]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let watched = fetcher.clone();
        tokio::spawn(async move {
            watched.started.notified().await;
            trigger.cancel();
        });

        let result = compositor
            .compose_nodes(&images, &template, &row, &[], &cancel)
            .await;
        assert!(matches!(result, Err(GabaritError::Cancelled)));
        assert_eq!(images.cache().settled().await, 0);

        fetcher.gate.add_permits(1);
        let source = match &template.elements()[0].kind {
            ElementKind::Image(image) => ImageSource::from(image),
            other => panic!("expected image, got {:?}", other),
        };
        let resolution = images.resolve_for_element("img", "AB12", &source, &row).await;
        assert_eq!(
            resolution,
            Resolution::Resolved("https://shop.test/img/AB12.jpg".into())
        );
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(images.cache().settled().await, 1);
    }
}
