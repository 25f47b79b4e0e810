use crate::error::ViewerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use synteny_render::{LayoutConfig, RadialConfig, RibbonStyle, Theme};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Multiplier applied per zoom-in step (and divided per zoom-out).
    pub factor: f64,
    pub duration_ms: u64,
    pub pan_step_px: f64,
    pub pan_cadence_ms: u64,
    pub tooltip_debounce_ms: u64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 5.0,
            factor: 1.2,
            duration_ms: 250,
            pan_step_px: 50.0,
            pan_cadence_ms: 50,
            tooltip_debounce_ms: 30,
        }
    }
}

impl ZoomConfig {
    /// Bounds used by the radial detail view.
    pub fn detail() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 20.0,
            ..Self::default()
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn pan_cadence(&self) -> Duration {
        Duration::from_millis(self.pan_cadence_ms.max(1))
    }

    pub fn tooltip_debounce(&self) -> Duration {
        Duration::from_millis(self.tooltip_debounce_ms)
    }

    pub fn clamp(&self, k: f64) -> f64 {
        k.clamp(self.min_scale, self.max_scale.max(self.min_scale))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub layout: LayoutConfig,
    pub ribbon: RibbonStyle,
    pub zoom: ZoomConfig,
    pub detail_zoom: ZoomConfig,
    pub radial: RadialConfig,
    pub theme: Theme,
    pub species_colors: BTreeMap<String, String>,
    pub show_tooltips: bool,
    pub show_breakpoints: bool,
    pub show_minimap: bool,
    pub custom_coloring: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            ribbon: RibbonStyle::default(),
            zoom: ZoomConfig::default(),
            detail_zoom: ZoomConfig::detail(),
            radial: RadialConfig::default(),
            theme: Theme::Light,
            species_colors: BTreeMap::new(),
            show_tooltips: true,
            show_breakpoints: true,
            show_minimap: true,
            custom_coloring: false,
        }
    }
}

impl ViewerSettings {
    /// A missing file yields defaults; a malformed one is an error.
    pub fn from_json_file(path: &Path) -> Result<Self, ViewerError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_json_file(&self, path: &Path) -> Result<(), ViewerError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
