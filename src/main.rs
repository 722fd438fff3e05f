//! # Gabarit CLI
//!
//! Command-line driver for the compositing engine.
//!
//! ## Usage
//!
//! ```bash
//! # Compose every row of rows.json (a JSON array of objects)
//! gabarit compose --template shelf.json --rows rows.json
//!
//! # Compose a single row
//! gabarit compose --template shelf.json --rows rows.json --row 3
//!
//! # Upgrade a stored template and show what changed
//! gabarit migrate --template legacy.json
//!
//! # Effective page size
//! gabarit page-size --format a4 --orientation landscape
//! gabarit page-size --format custom --width 100 --height 150
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `gabarit=info`).
//! Engine knobs are read from the environment (and `.env`), see
//! [`EngineConfig::from_env`].

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gabarit::{
    Compositor, EngineConfig, GabaritError, Row, StoredTemplate,
    error::Result,
    geometry::{Orientation, PageFormat, resolve_page_size},
    migrate::MigrationReport,
};

/// Gabarit - template compositing engine
#[derive(Parser, Debug)]
#[command(name = "gabarit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose rows against a stored template and print the pages as JSON
    Compose {
        /// Stored template (JSON)
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Rows as a JSON array of objects
        #[arg(long, value_name = "FILE")]
        rows: PathBuf,

        /// Compose only this row (0-based)
        #[arg(long)]
        row: Option<usize>,
    },

    /// Migrate a stored template to the current schema
    Migrate {
        /// Stored template (JSON)
        #[arg(long, value_name = "FILE")]
        template: PathBuf,
    },

    /// Print the effective page size in millimeters and pixels
    PageSize {
        /// a4, a5, letter or custom
        #[arg(long, default_value = "a4", value_parser = parse_format)]
        format: PageFormat,

        /// portrait or landscape
        #[arg(long, default_value = "portrait", value_parser = parse_orientation)]
        orientation: Orientation,

        /// Custom width in mm
        #[arg(long)]
        width: Option<f64>,

        /// Custom height in mm
        #[arg(long)]
        height: Option<f64>,
    },
}

fn parse_format(s: &str) -> std::result::Result<PageFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "a4" => Ok(PageFormat::A4),
        "a5" => Ok(PageFormat::A5),
        "letter" => Ok(PageFormat::Letter),
        "custom" => Ok(PageFormat::Custom),
        other => Err(format!("unknown format '{}'", other)),
    }
}

fn parse_orientation(s: &str) -> std::result::Result<Orientation, String> {
    match s.to_ascii_lowercase().as_str() {
        "portrait" => Ok(Orientation::Portrait),
        "landscape" => Ok(Orientation::Landscape),
        other => Err(format!("unknown orientation '{}'", other)),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MigrateOutput {
    template: gabarit::Template,
    report: MigrationReport,
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gabarit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            template,
            rows,
            row,
        } => {
            let config = EngineConfig::from_env()?;
            let (template, report) = load_template(&template)?;
            if !report.is_noop() {
                tracing::info!(
                    from = report.from_version,
                    to = report.to_version,
                    "template migrated in memory"
                );
            }
            let rows: Vec<Row> = serde_json::from_str(&std::fs::read_to_string(&rows)?)?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(compose(&config, &template, &rows, row))
        }

        Commands::Migrate { template } => {
            let (template, report) = load_template(&template)?;
            for id in &report.converted {
                eprintln!("converted from pixels: {}", id);
            }
            print_json(&MigrateOutput { template, report })
        }

        Commands::PageSize {
            format,
            orientation,
            width,
            height,
        } => {
            let size = resolve_page_size(format, orientation, width, height)?;
            let (px_w, px_h) = size.to_px();
            println!(
                "{:.1} x {:.1} mm ({:.0} x {:.0} px)",
                size.width_mm, size.height_mm, px_w, px_h
            );
            Ok(())
        }
    }
}

async fn compose(
    config: &EngineConfig,
    template: &gabarit::Template,
    rows: &[Row],
    row: Option<usize>,
) -> Result<()> {
    let compositor = Compositor::from_config(config)?;
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match row {
        Some(index) => {
            let selected = rows.get(index).ok_or_else(|| {
                GabaritError::config(format!("row {} out of range ({} rows)", index, rows.len()))
            })?;
            let page = compositor
                .compose_page(template, selected, index, &cancel)
                .await?;
            print_json(&page)
        }
        None => {
            let pages = compositor.compose_batch(template, rows, &cancel).await?;
            print_json(&pages)
        }
    }
}

fn load_template(path: &Path) -> Result<(gabarit::Template, MigrationReport)> {
    let stored: StoredTemplate = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    stored.load()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
