//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the engine.
//! Types here should have no renderer or runtime dependencies
//! to avoid circular dependencies.

pub mod boundary;
pub mod entity;
pub mod geometry;
pub mod selection;

pub use boundary::*;
pub use entity::*;
pub use geometry::*;
pub use selection::*;
