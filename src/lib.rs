//! Synchronization engine for the market surveillance map view
//!
//! Keeps business markers, department markers and the administrative
//! boundary highlight consistent with upstream data and selection state,
//! and keeps the camera in step with search and selection while leaving
//! user-driven camera movement alone.

pub mod boundary;
pub mod config;
pub mod core;
pub mod domain;
pub mod layers;
pub mod markers;
pub mod policy;
pub mod render;
pub mod session;
pub mod viewport;

pub use config::MapConfig;
pub use session::{Effect, MapSession, Msg, Notification};
