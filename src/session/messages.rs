//! Message types for a map session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - The phase each message is processed in within one tick

use serde::{Deserialize, Serialize};

use crate::domain::{AdminSelection, EntityId, LatLng, MapEntity, MarkerLayer, ResolvedLocation};
use crate::render::{CameraEvent, MoveOrigin, RenderHandle};

// ============================================================================
// Message Families
// ============================================================================

/// Session lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleMsg {
    /// Place the camera once; later calls are ignored
    Initialize { center: LatLng, zoom: f64 },
    /// Release the camera, cancel pending work, clear everything drawn
    Teardown,
}

/// Upstream selection and search state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectMsg {
    /// Province/district/ward selection changed
    Admin(AdminSelection),
    /// Entity picked from autocomplete, or the pick was cleared
    Entity(Option<EntityId>),
    /// Search text changed
    Search(String),
}

/// Pointer input reported by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerMsg {
    MarkerClicked { handle: RenderHandle },
    /// An administrative area of the base map was clicked
    BoundaryClicked { unit: String, parent: Option<String> },
}

/// Completions of work started through effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AsyncMsg {
    DebounceElapsed { token: u64 },
    /// `result` is None when the resolver failed or had no answer
    GeocodeResolved {
        token: u64,
        result: Option<ResolvedLocation>,
    },
}

// ============================================================================
// Main Message Type
// ============================================================================

/// Main message type for the map session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", content = "data", rename_all = "snake_case")]
pub enum Msg {
    Lifecycle(LifecycleMsg),
    /// Switch the visible marker layer
    Layer(MarkerLayer),
    /// Pre-filtered entity list for a layer
    Entities {
        layer: MarkerLayer,
        entities: Vec<MapEntity>,
    },
    Select(SelectMsg),
    Camera(CameraEvent),
    Pointer(PointerMsg),
    Async(AsyncMsg),
}

/// Processing order inside one tick, earliest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Lifecycle,
    LayerMode,
    Entities,
    AdminSelection,
    Search,
    EntitySelection,
    Renderer,
    Async,
}

impl Msg {
    pub fn phase(&self) -> Phase {
        match self {
            Msg::Lifecycle(_) => Phase::Lifecycle,
            Msg::Layer(_) => Phase::LayerMode,
            Msg::Entities { .. } => Phase::Entities,
            Msg::Select(SelectMsg::Admin(_)) => Phase::AdminSelection,
            Msg::Select(SelectMsg::Search(_)) => Phase::Search,
            Msg::Select(SelectMsg::Entity(_)) => Phase::EntitySelection,
            Msg::Camera(_) | Msg::Pointer(_) => Phase::Renderer,
            Msg::Async(_) => Phase::Async,
        }
    }

    // Lifecycle shortcuts
    pub fn initialize(center: LatLng, zoom: f64) -> Self {
        Self::Lifecycle(LifecycleMsg::Initialize { center, zoom })
    }
    pub fn teardown() -> Self {
        Self::Lifecycle(LifecycleMsg::Teardown)
    }

    // Data shortcuts
    pub fn layer(layer: MarkerLayer) -> Self {
        Self::Layer(layer)
    }
    pub fn entities(layer: MarkerLayer, entities: Vec<MapEntity>) -> Self {
        Self::Entities { layer, entities }
    }

    // Selection shortcuts
    pub fn select_admin(selection: AdminSelection) -> Self {
        Self::Select(SelectMsg::Admin(selection))
    }
    pub fn select_entity(id: impl Into<EntityId>) -> Self {
        Self::Select(SelectMsg::Entity(Some(id.into())))
    }
    pub fn clear_entity() -> Self {
        Self::Select(SelectMsg::Entity(None))
    }
    pub fn search(text: impl Into<String>) -> Self {
        Self::Select(SelectMsg::Search(text.into()))
    }

    // Renderer shortcuts
    pub fn camera(event: CameraEvent) -> Self {
        Self::Camera(event)
    }
    pub fn move_started(origin: MoveOrigin) -> Self {
        Self::Camera(CameraEvent::MoveStarted { origin })
    }
    pub fn marker_clicked(handle: RenderHandle) -> Self {
        Self::Pointer(PointerMsg::MarkerClicked { handle })
    }
    pub fn boundary_clicked(unit: impl Into<String>, parent: Option<String>) -> Self {
        Self::Pointer(PointerMsg::BoundaryClicked {
            unit: unit.into(),
            parent,
        })
    }

    // Async shortcuts
    pub fn debounce_elapsed(token: u64) -> Self {
        Self::Async(AsyncMsg::DebounceElapsed { token })
    }
    pub fn geocode_resolved(token: u64, result: Option<ResolvedLocation>) -> Self {
        Self::Async(AsyncMsg::GeocodeResolved { token, result })
    }
}
