//! Administrative boundary highlighting
//!
//! This module contains:
//! - The boundary polygon dataset interface and a static implementation
//! - The overlay manager (ward > district fallback, refit-on-change)

pub mod dataset;
pub mod overlay;

pub use dataset::{BoundaryDataset, StaticBoundaries};
pub use overlay::BoundaryOverlayManager;
