//! Auto-zoom policy engine
//!
//! This module contains:
//! - Camera intents and the precedence used to pick one per tick
//! - The policy that derives intents from search, selection and layer changes

pub mod auto_zoom;
pub mod intent;

pub use auto_zoom::{AutoZoomPolicy, LocationPlan};
pub use intent::{CameraIntent, PopupRequest, Trigger, most_specific};
