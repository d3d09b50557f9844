//! Map session
//!
//! This module contains:
//! - Message types for everything the host and renderer report
//! - Effects the session asks the runtime to carry out
//! - Session state and per-family message handlers
//! - The session itself, processing messages one tick at a time

pub mod effects;
pub mod engine;
pub mod handlers;
pub mod messages;
pub mod state;

pub use effects::{Effect, Notification};
pub use engine::{MapSession, SessionSnapshot};
pub use messages::Msg;
