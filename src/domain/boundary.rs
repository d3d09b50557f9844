//! Highlighted administrative boundary overlay

use serde::{Deserialize, Serialize};

use super::geometry::{LatLngBounds, Polygon};

/// Which administrative level an overlay outlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Ward,
    District,
}

/// The single active boundary overlay. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryOverlay {
    pub kind: BoundaryKind,
    /// Name of the outlined unit
    pub name: String,
    pub polygon: Polygon,
    pub bounds: LatLngBounds,
}

impl BoundaryOverlay {
    /// Build an overlay, or None when the polygon has no vertices
    pub fn new(kind: BoundaryKind, name: impl Into<String>, polygon: Polygon) -> Option<Self> {
        let bounds = polygon.bounds()?;
        Some(Self {
            kind,
            name: name.into(),
            polygon,
            bounds,
        })
    }
}
