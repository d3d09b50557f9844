//! Configuration persistence for map view settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::LatLng;
use crate::render::geometry::{MarkerScale, OverlayStyle};

/// A fixed camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub center: LatLng,
    pub zoom: f64,
}

/// Map view configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial view and the view restored when the search is cleared
    #[serde(default = "default_view")]
    pub default_view: CameraPreset,
    /// View shown when switching to business markers
    #[serde(default = "default_business_region")]
    pub business_region: CameraPreset,
    /// Zoom for a search with exactly one match
    #[serde(default = "default_search_zoom")]
    pub search_zoom: f64,
    /// Padding around fitted bounds in pixels
    #[serde(default = "default_fit_padding")]
    pub fit_padding_px: f64,
    /// Zoom for an entity picked from autocomplete
    #[serde(default = "default_selection_zoom")]
    pub selection_zoom: f64,
    /// Zoom for resolver centers and entity centroids
    #[serde(default = "default_location_zoom")]
    pub location_zoom: f64,
    /// Closest zoom when fitting a selected ward
    #[serde(default = "default_boundary_max_zoom")]
    pub boundary_max_zoom: f64,
    /// Delay before resolving a selected administrative unit, so the
    /// dependent entity list can finish loading
    #[serde(default = "default_location_debounce_ms")]
    pub location_debounce_ms: u64,
    #[serde(default)]
    pub overlay: OverlayStyle,
    #[serde(default)]
    pub marker_scale: MarkerScale,
}

fn default_view() -> CameraPreset {
    CameraPreset {
        center: LatLng::new(21.0285, 105.8542), // Hà Nội
        zoom: 12.0,
    }
}

fn default_business_region() -> CameraPreset {
    CameraPreset {
        center: LatLng::new(21.0285, 105.8542),
        zoom: 13.0,
    }
}

fn default_search_zoom() -> f64 {
    16.0
}

fn default_fit_padding() -> f64 {
    50.0
}

fn default_selection_zoom() -> f64 {
    17.0
}

fn default_location_zoom() -> f64 {
    14.0
}

fn default_boundary_max_zoom() -> f64 {
    16.0
}

fn default_location_debounce_ms() -> u64 {
    300
}

impl MapConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "marketmap";

    /// Location of the persisted config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    pub fn location_debounce(&self) -> Duration {
        Duration::from_millis(self.location_debounce_ms)
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory available, not saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: MapConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_view: default_view(),
            business_region: default_business_region(),
            search_zoom: default_search_zoom(),
            fit_padding_px: default_fit_padding(),
            selection_zoom: default_selection_zoom(),
            location_zoom: default_location_zoom(),
            boundary_max_zoom: default_boundary_max_zoom(),
            location_debounce_ms: default_location_debounce_ms(),
            overlay: OverlayStyle::default(),
            marker_scale: MarkerScale::default(),
        }
    }
}
