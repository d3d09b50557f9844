//! Runtime shell around the map session
//!
//! This module contains:
//! - Command-line entry point
//! - Geocoding resolver interface and static fixture
//! - Host listener callbacks
//! - Control handle and the tokio event loop
//! - Scenario replay against the in-memory renderer

pub mod app;
pub mod control;
pub mod geocode;
pub mod listener;
pub mod runtime;
pub mod scenario;
