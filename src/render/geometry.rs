//! Shared sizing and style math for rendered map features
//!
//! This module contains constants and math shared between the
//! marker registry, the boundary overlay and the in-memory renderer.

use serde::{Deserialize, Serialize};

/// Camera zoom constants
pub mod zoom {
    /// Lowest zoom the camera accepts
    pub const MIN: f64 = 0.0;
    /// Highest zoom the camera accepts
    pub const MAX: f64 = 19.0;
}

/// Boundary overlay defaults
pub mod overlay {
    /// Fill opacity of the highlighted polygon
    pub const FILL_OPACITY: f32 = 0.30;
    /// Outline width in pixels
    pub const STROKE_WIDTH: f32 = 2.0;
    /// Outline and fill color
    pub const COLOR: &str = "#2563eb";
}

/// Marker size as a function of zoom level
///
/// Grows linearly from `min_px` at `base_zoom` by `px_per_zoom` per zoom
/// level and saturates at `max_px`. Monotonically non-decreasing in zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerScale {
    pub min_px: f64,
    pub max_px: f64,
    pub base_zoom: f64,
    pub px_per_zoom: f64,
}

impl Default for MarkerScale {
    fn default() -> Self {
        Self {
            min_px: 16.0,
            max_px: 40.0,
            base_zoom: 10.0,
            px_per_zoom: 3.0,
        }
    }
}

impl MarkerScale {
    /// Marker icon edge length in pixels at the given zoom
    pub fn size_for_zoom(&self, zoom: f64) -> f64 {
        if !zoom.is_finite() {
            return self.min_px;
        }
        let steps = (zoom - self.base_zoom).max(0.0);
        let max_px = self.max_px.max(self.min_px);
        (self.min_px + steps * self.px_per_zoom.max(0.0)).clamp(self.min_px, max_px)
    }
}

/// Style applied to the boundary overlay polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub fill_opacity: f32,
    pub stroke_width: f32,
    pub color: String,
    /// Whether the polygon captures pointer events. Always false for the
    /// highlight so markers underneath stay clickable.
    #[serde(default)]
    pub interactive: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill_opacity: overlay::FILL_OPACITY,
            stroke_width: overlay::STROKE_WIDTH,
            color: overlay::COLOR.to_string(),
            interactive: false,
        }
    }
}
