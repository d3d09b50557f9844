//! Renderer boundary
//!
//! This module contains:
//! - The traits the tile-map renderer implements (camera, markers, overlay)
//! - The camera command and event vocabulary exchanged with the renderer
//! - Sizing math shared between components
//! - An in-memory renderer that records every draw operation

pub mod geometry;
pub mod recording;

use serde::{Deserialize, Serialize};

use crate::domain::{BoundaryOverlay, DisplayMeta, EntityId, LatLng, LatLngBounds, MarkerLayer};
use geometry::OverlayStyle;

/// Opaque handle of something drawn by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// Where the camera should go
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraTarget {
    /// Animate to a point at a fixed zoom
    FlyTo { center: LatLng, zoom: f64 },
    /// Animate so the bounds fit the viewport
    FitBounds {
        bounds: LatLngBounds,
        padding_px: f64,
        max_zoom: Option<f64>,
    },
}

/// Who started a camera movement, as tagged by the event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOrigin {
    /// Pan, zoom or drag gesture
    User,
    /// Animation issued by the viewport controller
    Programmatic,
}

/// Camera callbacks reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CameraEvent {
    MoveStarted { origin: MoveOrigin },
    MoveEnded { center: LatLng, zoom: f64 },
    ZoomChanged { zoom: f64 },
}

/// Marker to draw
#[derive(Debug, Clone, Copy)]
pub struct MarkerSpec<'a> {
    pub entity_id: &'a EntityId,
    pub layer: MarkerLayer,
    pub position: LatLng,
    pub meta: &'a DisplayMeta,
    pub size_px: f64,
}

/// The camera of the tile map. Only the viewport controller holds one.
pub trait Camera {
    /// Jump without animation (initial placement)
    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Start an animated transition. The renderer reports it back as a
    /// programmatic move.
    fn animate(&mut self, target: &CameraTarget);

    fn center(&self) -> LatLng;

    fn zoom(&self) -> f64;
}

/// Point marker drawing
pub trait MarkerSurface {
    fn add_marker(&mut self, spec: MarkerSpec<'_>) -> RenderHandle;

    fn remove_marker(&mut self, handle: RenderHandle);

    /// Resize every marker icon
    fn set_marker_size(&mut self, size_px: f64);

    fn open_popup(&mut self, handle: RenderHandle);
}

/// Boundary polygon drawing
pub trait OverlaySurface {
    fn show_overlay(&mut self, overlay: &BoundaryOverlay, style: &OverlayStyle) -> RenderHandle;

    fn remove_overlay(&mut self, handle: RenderHandle);
}

/// Everything except the camera
pub trait MapSurface: MarkerSurface + OverlaySurface {
    fn as_markers(&mut self) -> &mut dyn MarkerSurface;

    fn as_overlay(&mut self) -> &mut dyn OverlaySurface;
}

impl<T: MarkerSurface + OverlaySurface> MapSurface for T {
    fn as_markers(&mut self) -> &mut dyn MarkerSurface {
        self
    }

    fn as_overlay(&mut self) -> &mut dyn OverlaySurface {
        self
    }
}

/// Renderers that buffer camera callbacks for the host to pull
pub trait CameraFeedback {
    fn take_camera_events(&mut self) -> Vec<CameraEvent>;
}

impl CameraTarget {
    /// Anchor point of the target
    pub fn center(&self) -> LatLng {
        match self {
            CameraTarget::FlyTo { center, .. } => *center,
            CameraTarget::FitBounds { bounds, .. } => bounds.center(),
        }
    }
}
