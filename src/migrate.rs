//! # Schema Migration
//!
//! Stored template configurations carry a `schemaVersion`. [`migrate`] rewrites
//! older configurations up to [`CURRENT_SCHEMA_VERSION`]; configurations that
//! are already current come back unchanged apart from an integral
//! `schemaVersion`, so migration is idempotent.
//!
//! ## v1 → v2
//!
//! Version 1 editors stored geometry in screen pixels; version 2 stores
//! millimeters. Version 1 data is not reliably tagged, so each element is
//! classified with a size heuristic:
//!
//! ```text
//! pixel-valued  ⇔  width > page_w  ∨  height > page_h  ∨  x > page_w  ∨  y > page_h
//! ```
//!
//! Pixel-valued elements get `x`, `y`, `width`, `height` divided by
//! [`MM_TO_PX`]. A millimeter element legitimately larger than the page is
//! misclassified; every reclassification is listed in the [`MigrationReport`]
//! and logged so the outcome can be inspected.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{GabaritError, Result};
use crate::geometry::{GridSettings, MM_TO_PX, PageSetup, PageSize};

/// Schema version produced by this engine.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

const GEOMETRY_FIELDS: [&str; 4] = ["x", "y", "width", "height"];

/// What a migration pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Ids of elements reclassified as pixel-valued and converted.
    pub converted: Vec<String>,
    /// Geometry pass skipped because the config was already marked migrated.
    pub geometry_skipped: bool,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.from_version == self.to_version
    }
}

/// A migrated configuration and its report.
#[derive(Debug, Clone)]
pub struct Migration {
    pub config: Value,
    pub report: MigrationReport,
}

/// Schema version of a stored config. Untagged configs are version 1.
///
/// Integral floats (`2.0`) are accepted; negative, fractional, non-numeric
/// or out-of-range versions are configuration errors.
pub fn schema_version(config: &Value) -> Result<u32> {
    let Some(raw) = config.get("schemaVersion").filter(|v| !v.is_null()) else {
        return Ok(1);
    };

    let version = match raw {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };

    version
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| GabaritError::config(format!("invalid schemaVersion {}", raw)))
}

/// Migrate a stored configuration to the current schema.
///
/// `page` is the page setup stored with the template; it is needed to
/// classify legacy geometry. A null config is treated as an empty v1 config.
pub fn migrate(config: Value, page: &PageSetup) -> Result<Migration> {
    let from_version = schema_version(&config)?;
    let mut config = match config {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(GabaritError::config(format!(
                "template configuration must be an object, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut report = MigrationReport {
        from_version,
        to_version: from_version,
        ..Default::default()
    };

    if from_version >= CURRENT_SCHEMA_VERSION {
        // Normalize `2.0` to `2`; the stored config is otherwise untouched.
        config.insert("schemaVersion".into(), Value::from(from_version));
        return Ok(Migration {
            config: Value::Object(config),
            report,
        });
    }

    if from_version < 2 {
        migrate_v1_to_v2(&mut config, page, &mut report)?;
    }

    tracing::info!(
        from = report.from_version,
        to = report.to_version,
        converted = report.converted.len(),
        "template configuration migrated"
    );

    Ok(Migration {
        config: Value::Object(config),
        report,
    })
}

fn migrate_v1_to_v2(
    config: &mut Map<String, Value>,
    page: &PageSetup,
    report: &mut MigrationReport,
) -> Result<()> {
    let size = page.page_size()?;

    let already_mm = config
        .get("mmMigrated")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if already_mm {
        report.geometry_skipped = true;
    } else if let Some(Value::Array(elements)) = config.get_mut("elements") {
        for element in elements.iter_mut() {
            let Value::Object(obj) = element else {
                continue;
            };
            if !is_pixel_valued(obj, size) {
                continue;
            }
            let id = obj
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            tracing::warn!(
                element = %id,
                "element geometry exceeds page bounds; treating as pixels"
            );
            convert_geometry(obj);
            // Children are relative to the group, in the same unit.
            if let Some(Value::Array(children)) = obj.get_mut("children") {
                for child in children.iter_mut() {
                    if let Value::Object(child) = child {
                        convert_geometry(child);
                    }
                }
            }
            report.converted.push(id);
        }
    }

    config.insert("mmMigrated".into(), Value::Bool(true));
    if !config.contains_key("gridSettings") {
        let grid = serde_json::to_value(GridSettings::default())?;
        config.insert("gridSettings".into(), grid);
    }
    config.insert("schemaVersion".into(), Value::from(2u32));
    report.to_version = 2;
    Ok(())
}

fn geometry(obj: &Map<String, Value>, field: &str) -> f64 {
    obj.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

/// The pixel heuristic: any coordinate or extent beyond the page.
fn is_pixel_valued(obj: &Map<String, Value>, page: PageSize) -> bool {
    geometry(obj, "width") > page.width_mm
        || geometry(obj, "height") > page.height_mm
        || geometry(obj, "x") > page.width_mm
        || geometry(obj, "y") > page.height_mm
}

fn convert_geometry(obj: &mut Map<String, Value>) {
    for field in GEOMETRY_FIELDS {
        if let Some(px) = obj.get(field).and_then(Value::as_f64) {
            obj.insert(field.into(), Value::from(px / MM_TO_PX));
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
