//! Point marker bookkeeping
//!
//! This module contains:
//! - Marker handles keyed by (layer, entity id)
//! - Set-difference reconciliation against incoming entity lists

pub mod registry;

pub use registry::{MarkerHandle, MarkerRegistry, ReconcileReport};
