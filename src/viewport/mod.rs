//! Viewport (camera) ownership
//!
//! This module contains:
//! - The explicit interaction state and its reducer
//! - The controller that owns the camera and applies the reducer's outcomes

pub mod controller;
pub mod state;

pub use controller::{MoveEnd, TransitionResult, ViewportController};
pub use state::{CameraPhase, ViewportEvent, ViewportInteractionState, ViewportOutcome};
