//! Grid settings and coordinate snapping.

use serde::{Deserialize, Serialize};

/// Editor grid configuration stored in the template config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Grid pitch in millimeters.
    #[serde(default = "default_grid_size")]
    pub size: f64,
    #[serde(default)]
    pub snap_to_grid: bool,
    #[serde(default = "default_true")]
    pub show_smart_guides: bool,
}

fn default_grid_size() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            size: default_grid_size(),
            snap_to_grid: false,
            show_smart_guides: true,
        }
    }
}

impl GridSettings {
    /// Snap a coordinate according to these settings.
    pub fn snap(&self, value: f64) -> f64 {
        snap_to_grid(value, self.size, self.enabled && self.snap_to_grid)
    }
}

/// Round `value` to the nearest multiple of `pitch` (mm).
///
/// A no-op when snapping is disabled or the pitch is not a positive number.
pub fn snap_to_grid(value: f64, pitch: f64, enabled: bool) -> f64 {
    if !enabled || !(pitch > 0.0) || !pitch.is_finite() {
        return value;
    }
    (value / pitch).round() * pitch
}
