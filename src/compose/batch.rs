//! Batch composition: many rows against one template.

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use super::{ComposedPage, Compositor};
use crate::error::Result;
use crate::template::{Row, Template};

impl Compositor {
    /// Compose every row, at most [`concurrency`](Self::concurrency) at a time.
    ///
    /// Pages come back in row order. Scraped image URLs are memoized for the
    /// duration of the batch only, so rows sharing a reference fetch once.
    /// Template-level errors and cancellation fail the whole batch; element
    /// failures stay inside their page.
    pub async fn compose_batch(
        &self,
        template: &Template,
        rows: &[Row],
        cancel: &CancellationToken,
    ) -> Result<Vec<ComposedPage>> {
        template.validate()?;
        template.page_size()?;

        let images = self.image_resolver();
        tracing::info!(
            rows = rows.len(),
            concurrency = self.concurrency(),
            template = %template.name,
            "composing batch"
        );

        let pages: Vec<ComposedPage> = stream::iter(rows.iter().enumerate())
            .map(|(index, row)| self.page_with(&images, template, row, index, cancel))
            .buffered(self.concurrency())
            .try_collect()
            .await?;

        let degraded = pages
            .iter()
            .filter(|page| page.nodes.iter().any(|n| n.is_placeholder()))
            .count();
        tracing::info!(pages = pages.len(), degraded, "batch composed");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{ImageState, NodeContent};
    use crate::error::GabaritError;
    use crate::geometry::PageSetup;
    use crate::resolve::StaticPageFetcher;
    use crate::template::{Element, ElementKind, ImageElement, TextElement};
    use std::sync::Arc;

    fn page(reference: &str) -> String {
        format!(r#"<html><body><img class="main" src="/img/{reference}.jpg"></body></html>"#)
    }

    fn label_template() -> Template {
        let mut template = Template::new("labels", PageSetup::default());
        template.add_element(
            Element::new(ElementKind::Text(TextElement {
                csv_column: "ref".into(),
                ..Default::default()
            }))
            .with_id("ref-text"),
        );
        template.add_element(
            Element::new(ElementKind::Image(ImageElement {
                csv_column: "ref".into(),
                page_url_template: Some("https://shop.test/p/%REF%".into()),
                selector: Some("img.main".into()),
                ..Default::default()
            }))
            .with_id("photo"),
        );
        template
    }

    fn image_state(page: &ComposedPage) -> &ImageState {
        match &page.nodes[1].content {
            NodeContent::Image(image) => &image.state,
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_failing_row_keeps_every_page_whole() {
        let mut fetcher = StaticPageFetcher::new();
        let mut rows = Vec::new();
        for i in 0..10 {
            let reference = format!("R{i}");
            if i != 6 {
                fetcher = fetcher.with_page(format!("https://shop.test/p/{reference}"), page(&reference));
            }
            rows.push(Row::from_pairs([("ref", reference)]));
        }
        let compositor = Compositor::new(Arc::new(fetcher)).with_concurrency(3);

        let pages = compositor
            .compose_batch(&label_template(), &rows, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(pages.len(), 10);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.row_index, i);
            assert_eq!(page.nodes.len(), 2);
            if i == 6 {
                assert!(matches!(image_state(page), ImageState::NotFound { .. }));
            } else {
                assert_eq!(
                    image_state(page).url(),
                    Some(format!("https://shop.test/img/R{i}.jpg").as_str())
                );
            }
        }
    }

    #[tokio::test]
    async fn test_shared_references_fetch_once_per_batch() {
        let fetcher = Arc::new(
            StaticPageFetcher::new().with_page("https://shop.test/p/SAME", page("SAME")),
        );
        let compositor = Compositor::new(fetcher.clone()).with_concurrency(4);
        let rows: Vec<Row> = (0..8).map(|_| Row::from_pairs([("ref", "SAME")])).collect();

        let cancel = CancellationToken::new();
        compositor.compose_batch(&label_template(), &rows, &cancel).await.unwrap();
        assert_eq!(fetcher.fetch_count(), 1);

        // A new batch starts with an empty cache.
        compositor.compose_batch(&label_template(), &rows, &cancel).await.unwrap();
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_batch_fails() {
        let compositor = Compositor::new(Arc::new(StaticPageFetcher::new()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let rows = vec![Row::from_pairs([("ref", "A")])];
        let result = compositor.compose_batch(&label_template(), &rows, &cancel).await;
        assert!(matches!(result, Err(GabaritError::Cancelled)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let compositor = Compositor::new(Arc::new(StaticPageFetcher::new()));
        let pages = compositor
            .compose_batch(&label_template(), &[], &CancellationToken::new())
            .await
            .unwrap();
        assert!(pages.is_empty());
    }
}
