//! # Gabarit - Template Compositing Engine
//!
//! Gabarit merges page templates (positioned blocks in millimeters) with
//! tabular rows and produces render trees ready for a rasterizer. It provides:
//!
//! - **Template model**: typed elements, stored-config loading, editing
//! - **Schema migration**: versioned, idempotent upgrades of stored configs
//! - **Resolution**: row fields, URL tokens, scraped product images
//! - **Script sandbox**: time-boxed user expressions with no ambient access
//! - **Compositing**: per-row render nodes, batches with bounded parallelism
//!
//! ## Quick Start
//!
//! ```no_run
//! use gabarit::{Compositor, EngineConfig, Row, StoredTemplate};
//!
//! # async fn demo(json: &str) -> gabarit::error::Result<()> {
//! let stored: StoredTemplate = serde_json::from_str(json)?;
//! let (template, report) = stored.load()?;
//! if !report.converted.is_empty() {
//!     println!("converted from pixels: {:?}", report.converted);
//! }
//!
//! let compositor = Compositor::from_config(&EngineConfig::from_env()?)?;
//! let row = Row::from_pairs([("ref", "AB 12"), ("designation", "Blue mug")]);
//! let nodes = compositor.compose(&template, &row).await?;
//! println!("{}", serde_json::to_string_pretty(&nodes)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`geometry`] | Page sizes, mm↔px, grid snap, alignment guides |
//! | [`template`] | Element model, rows, stored templates |
//! | [`migrate`] | Schema migration |
//! | [`resolve`] | Field, token and image resolution |
//! | [`script`] | Script sandbox |
//! | [`compose`] | Compositing engine and render nodes |
//! | [`config`] | Runtime configuration from the environment |
//! | [`error`] | Error types |

pub mod compose;
pub mod config;
pub mod error;
pub mod geometry;
pub mod migrate;
pub mod resolve;
pub mod script;
pub mod template;

// Re-exports for convenience
pub use compose::{ComposedPage, Compositor, RenderNode};
pub use config::EngineConfig;
pub use error::GabaritError;
pub use template::{Row, StoredTemplate, Template};
