//! # Field, Token and Image Resolution
//!
//! Turns element bindings into row-specific values:
//!
//! | Module | Resolves |
//! |--------|----------|
//! | [`fields`] | text blocks bound to a row field |
//! | [`tokens`] | placeholder tokens in image URL templates |
//! | [`selector`] | pasted HTML snippets into CSS selectors (editor side) |
//! | [`image`] | final image URLs, scraping product pages when needed |

pub mod fields;
pub mod image;
pub mod selector;
pub mod tokens;

pub use fields::{resolve_field, resolve_text};
pub use image::{
    DEFAULT_ATTRIBUTE, HttpPageFetcher, ImageResolver, ImageSource, ImageTarget, ImageUrlCache,
    PageFetcher, Resolution, StaticPageFetcher, extract_image_url,
};
pub use selector::selector_from_input;
pub use tokens::{encode_component, expand_url_template};
