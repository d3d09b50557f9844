//! Effects requested by the session for the runtime to carry out

use std::time::Duration;

use serde::Serialize;

use crate::domain::{AdminUnit, EntityId, MarkerLayer};

/// Host-facing notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ViewportReady,
    MarkerClicked { entity_id: EntityId },
    BoundaryClicked { unit: String, parent: Option<String> },
    /// The previous layer is cleared; entities for `layer` may be sent
    LayerRequested { layer: MarkerLayer },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Deliver `DebounceElapsed { token }` after `delay`
    ScheduleDebounce { token: u64, delay: Duration },
    CancelDebounce { token: u64 },
    /// Resolve `unit` and deliver `GeocodeResolved { token, .. }`
    Geocode { token: u64, unit: AdminUnit },
    Notify(Notification),
}
