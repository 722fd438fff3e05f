//! Image resolution: derives the final image URL for an image block.
//!
//! `ImageResolver` owns the fetch capability and the per-batch URL cache so
//! that the template model and the compositor stay free of HTTP concerns.
//!
//! ## Resolution order
//!
//! 1. No reference value → unresolved (nothing to resolve yet).
//! 2. `pageUrlTemplate` set → expand tokens. Without a selector the expanded
//!    URL is the image. With a selector the page is fetched and the
//!    `attribute` (default `src`) of the first match is the image.
//! 3. `baseUrl` set → `baseUrl + value + extension`.
//! 4. Value is already an absolute URL → used as is.
//! 5. Otherwise unresolved.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use kuchiki::traits::*;
use tokio::sync::{Mutex, OnceCell};
use url::Url;

use super::tokens::{encode_component, expand_url_template};
use crate::config::EngineConfig;
use crate::error::{GabaritError, ImageResolutionError, Result};
use crate::template::{ImageElement, Row};

/// Attribute read from the matched element when none is configured.
pub const DEFAULT_ATTRIBUTE: &str = "src";

/// Fetches the HTML of a product page.
///
/// Implementations return short user-facing diagnostics, never raw
/// transport errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> std::result::Result<String, ImageResolutionError>;
}

/// [`PageFetcher`] over HTTP.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| GabaritError::config(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> std::result::Result<String, ImageResolutionError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::debug!(%url, error = %e, "page fetch failed");
            if e.is_timeout() {
                ImageResolutionError::new("product page timed out")
            } else {
                ImageResolutionError::new("product page unreachable")
            }
        })?;

        if !response.status().is_success() {
            return Err(ImageResolutionError::new(format!(
                "product page returned HTTP {}",
                response.status().as_u16()
            )));
        }

        response.text().await.map_err(|e| {
            tracing::debug!(%url, error = %e, "page body unreadable");
            ImageResolutionError::new("product page unreadable")
        })
    }
}

/// In-memory [`PageFetcher`] serving fixed pages, for offline previews.
#[derive(Debug, Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
    fetches: std::sync::atomic::AtomicUsize,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Number of fetches served so far (hits and misses).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch_page(&self, url: &str) -> std::result::Result<String, ImageResolutionError> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        // Let concurrent callers interleave like a real fetch would.
        tokio::task::yield_now().await;
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ImageResolutionError::new("product page unreachable"))
    }
}

/// Image sourcing configuration of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ImageSource {
    pub page_url_template: Option<String>,
    pub selector: Option<String>,
    pub attribute: Option<String>,
    pub base_url: Option<String>,
    pub extension: Option<String>,
    pub encode: bool,
}

impl From<&ImageElement> for ImageSource {
    fn from(el: &ImageElement) -> Self {
        Self {
            page_url_template: el.page_url_template.clone(),
            selector: el.selector.clone(),
            attribute: el.attribute.clone(),
            base_url: el.base_url.clone(),
            extension: el.extension.clone(),
            encode: el.encode_value,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Where an image comes from, before any network access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTarget {
    /// The URL is known without fetching anything.
    Direct(String),
    /// The URL has to be scraped from a page.
    Scrape {
        page_url: String,
        selector: String,
        attribute: String,
    },
    /// Nothing to resolve yet; carries the reason.
    Unresolved(String),
}

impl ImageSource {
    /// Decide how to obtain the image for `value`.
    pub fn target(&self, value: &str, row: &Row) -> ImageTarget {
        let value = value.trim();
        if value.is_empty() {
            return ImageTarget::Unresolved("no reference value".into());
        }

        if let Some(template) = non_empty(&self.page_url_template) {
            let page_url = expand_url_template(template, value, row, self.encode);
            return match non_empty(&self.selector) {
                Some(selector) => ImageTarget::Scrape {
                    page_url,
                    selector: selector.to_string(),
                    attribute: non_empty(&self.attribute)
                        .unwrap_or(DEFAULT_ATTRIBUTE)
                        .to_string(),
                },
                None => ImageTarget::Direct(page_url),
            };
        }

        if let Some(base) = non_empty(&self.base_url) {
            let encoded = if self.encode {
                encode_component(value)
            } else {
                value.to_string()
            };
            return ImageTarget::Direct(format!(
                "{}{}{}",
                base,
                encoded,
                normalize_extension(non_empty(&self.extension))
            ));
        }

        if value.starts_with("http://") || value.starts_with("https://") {
            return ImageTarget::Direct(value.to_string());
        }

        ImageTarget::Unresolved("no image source configured".into())
    }
}

fn normalize_extension(extension: Option<&str>) -> String {
    match extension {
        Some(ext) if ext.starts_with('.') => ext.to_string(),
        Some(ext) => format!(".{}", ext),
        None => String::new(),
    }
}

/// Outcome of resolving one image element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved(String),
    Failed(ImageResolutionError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    element_id: String,
    value: String,
    page_url: String,
    selector: String,
    attribute: String,
}

type CacheCell = Arc<OnceCell<std::result::Result<String, ImageResolutionError>>>;

/// Scraped-URL memo shared by every row of a batch.
///
/// Each key is fetched at most once: concurrent lookups of the same key
/// wait on the same in-flight fetch. A fetch dropped mid-way (cancelled
/// render) leaves its cell empty for the next caller.
#[derive(Debug, Default)]
pub struct ImageUrlCache {
    cells: Mutex<HashMap<CacheKey, CacheCell>>,
}

impl ImageUrlCache {
    async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> std::result::Result<String, ImageResolutionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<String, ImageResolutionError>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(key).or_default().clone()
        };
        cell.get_or_init(fetch).await.clone()
    }

    /// Number of keys with a settled result.
    pub async fn settled(&self) -> usize {
        let cells = self.cells.lock().await;
        cells.values().filter(|cell| cell.initialized()).count()
    }
}

/// Resolves image URLs for elements, memoizing scraped results.
///
/// The cache lives as long as the resolver; create one per request or batch.
#[derive(Clone)]
pub struct ImageResolver {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<ImageUrlCache>,
}

impl ImageResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            cache: Arc::new(ImageUrlCache::default()),
        }
    }

    pub fn cache(&self) -> &ImageUrlCache {
        &self.cache
    }

    /// Resolve the image URL for `value` without element context.
    ///
    /// Unresolved outcomes are reported as errors here.
    pub async fn resolve_image_url(
        &self,
        value: &str,
        source: &ImageSource,
        row: &Row,
    ) -> std::result::Result<String, ImageResolutionError> {
        match self.resolve(None, value, source, row).await {
            Resolution::Resolved(url) => Ok(url),
            Resolution::Unresolved(reason) => Err(ImageResolutionError::new(reason)),
            Resolution::Failed(err) => Err(err),
        }
    }

    /// Resolve the image of element `element_id` for one row.
    pub async fn resolve_for_element(
        &self,
        element_id: &str,
        value: &str,
        source: &ImageSource,
        row: &Row,
    ) -> Resolution {
        self.resolve(Some(element_id), value, source, row).await
    }

    async fn resolve(
        &self,
        element_id: Option<&str>,
        value: &str,
        source: &ImageSource,
        row: &Row,
    ) -> Resolution {
        match source.target(value, row) {
            ImageTarget::Direct(url) => Resolution::Resolved(url),
            ImageTarget::Unresolved(reason) => Resolution::Unresolved(reason),
            ImageTarget::Scrape {
                page_url,
                selector,
                attribute,
            } => {
                let key = CacheKey {
                    element_id: element_id.unwrap_or_default().to_string(),
                    value: value.trim().to_string(),
                    page_url: page_url.clone(),
                    selector: selector.clone(),
                    attribute: attribute.clone(),
                };
                let fetcher = self.fetcher.clone();
                let result = self
                    .cache
                    .get_or_fetch(key, || async move {
                        tracing::debug!(url = %page_url, %selector, "fetching product page");
                        let html = fetcher.fetch_page(&page_url).await?;
                        extract_image_url(&html, &page_url, &selector, &attribute)
                    })
                    .await;
                match result {
                    Ok(url) => Resolution::Resolved(url),
                    Err(err) => Resolution::Failed(err),
                }
            }
        }
    }
}

/// Read `attribute` of the first element matching `selector` in `html`.
///
/// Relative URLs are resolved against `page_url`; for `srcset` the first
/// candidate is used.
pub fn extract_image_url(
    html: &str,
    page_url: &str,
    selector: &str,
    attribute: &str,
) -> std::result::Result<String, ImageResolutionError> {
    let document = kuchiki::parse_html().one(html);
    let element = document
        .select_first(selector)
        .map_err(|()| ImageResolutionError::new(format!("no element matches '{}'", selector)))?;

    let attributes = element.attributes.borrow();
    let raw = attributes
        .get(attribute)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ImageResolutionError::new(format!("matched element has no '{}' attribute", attribute))
        })?;

    let candidate = if attribute.eq_ignore_ascii_case("srcset") {
        raw.split(',')
            .next()
            .and_then(|c| c.split_whitespace().next())
            .unwrap_or(raw)
    } else {
        raw
    };

    let absolute = Url::parse(page_url)
        .and_then(|base| base.join(candidate))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| candidate.to_string());
    Ok(absolute)
}
