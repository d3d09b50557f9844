//! In-memory renderer
//!
//! Implements every renderer trait without drawing anything. Each operation
//! is appended to an ordered log so callers can sample intermediate state,
//! and camera callbacks are buffered the way a real tile map would fire them.
//! Clones share the same state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use super::geometry::{OverlayStyle, zoom};
use super::{
    Camera, CameraEvent, CameraFeedback, CameraTarget, MarkerSpec, MarkerSurface, MoveOrigin,
    OverlaySurface, RenderHandle,
};
use crate::domain::{BoundaryKind, BoundaryOverlay, EntityId, LatLng, MarkerLayer, fit_zoom};

/// Default viewport size in pixels
pub const DEFAULT_SIZE: (f64, f64) = (1024.0, 768.0);

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    SetView {
        center: LatLng,
        zoom: f64,
    },
    Animate {
        target: CameraTarget,
    },
    AddMarker {
        handle: RenderHandle,
        layer: MarkerLayer,
        entity_id: EntityId,
    },
    RemoveMarker {
        handle: RenderHandle,
    },
    SetMarkerSize {
        size_px: f64,
    },
    OpenPopup {
        handle: RenderHandle,
    },
    ShowOverlay {
        handle: RenderHandle,
        kind: BoundaryKind,
        name: String,
        fill_opacity: f32,
        interactive: bool,
    },
    RemoveOverlay {
        handle: RenderHandle,
    },
}

#[derive(Debug)]
struct RecordingState {
    ops: Vec<DrawOp>,
    markers: HashMap<RenderHandle, (MarkerLayer, EntityId)>,
    overlay: Option<(RenderHandle, BoundaryOverlay, OverlayStyle)>,
    center: LatLng,
    zoom: f64,
    size: (f64, f64),
    marker_size_px: Option<f64>,
    popup: Option<RenderHandle>,
    pending_events: Vec<CameraEvent>,
    next_handle: u64,
}

/// Shared in-memory map
#[derive(Debug, Clone)]
pub struct RecordingMap {
    state: Rc<RefCell<RecordingState>>,
}

impl Default for RecordingMap {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl RecordingMap {
    pub fn new(size: (f64, f64)) -> Self {
        Self {
            state: Rc::new(RefCell::new(RecordingState {
                ops: Vec::new(),
                markers: HashMap::new(),
                overlay: None,
                center: LatLng::default(),
                zoom: zoom::MIN,
                size,
                marker_size_px: None,
                popup: None,
                pending_events: Vec::new(),
                next_handle: 1,
            })),
        }
    }

    /// Every operation recorded so far, in call order
    pub fn ops(&self) -> Vec<DrawOp> {
        self.state.borrow().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    /// Number of live markers on a layer
    pub fn marker_count(&self, layer: MarkerLayer) -> usize {
        self.state
            .borrow()
            .markers
            .values()
            .filter(|(l, _)| *l == layer)
            .count()
    }

    /// Entity ids of the live markers on a layer, sorted
    pub fn marker_ids(&self, layer: MarkerLayer) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .state
            .borrow()
            .markers
            .values()
            .filter(|(l, _)| *l == layer)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Render handle of the live marker for an entity
    pub fn marker_handle(&self, layer: MarkerLayer, id: &EntityId) -> Option<RenderHandle> {
        self.state
            .borrow()
            .markers
            .iter()
            .find(|(_, (l, e))| *l == layer && e == id)
            .map(|(handle, _)| *handle)
    }

    pub fn overlay(&self) -> Option<BoundaryOverlay> {
        self.state
            .borrow()
            .overlay
            .as_ref()
            .map(|(_, overlay, _)| overlay.clone())
    }

    pub fn overlay_style(&self) -> Option<OverlayStyle> {
        self.state
            .borrow()
            .overlay
            .as_ref()
            .map(|(_, _, style)| style.clone())
    }

    pub fn marker_size(&self) -> Option<f64> {
        self.state.borrow().marker_size_px
    }

    pub fn popup(&self) -> Option<RenderHandle> {
        self.state.borrow().popup
    }

    /// Simulate a user pan/zoom gesture ending at `center`/`zoom`
    pub fn user_gesture(&self, center: LatLng, zoom: f64) {
        let mut state = self.state.borrow_mut();
        state.pending_events.push(CameraEvent::MoveStarted {
            origin: MoveOrigin::User,
        });
        let zoom = zoom.clamp(zoom::MIN, zoom::MAX);
        if zoom != state.zoom {
            state.pending_events.push(CameraEvent::ZoomChanged { zoom });
        }
        state.center = center;
        state.zoom = zoom;
        state.pending_events.push(CameraEvent::MoveEnded { center, zoom });
    }

    /// Animations requested so far
    pub fn animations(&self) -> Vec<CameraTarget> {
        self.state
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Animate { target } => Some(*target),
                _ => None,
            })
            .collect()
    }

    fn allocate_handle(state: &mut RecordingState) -> RenderHandle {
        let handle = RenderHandle(state.next_handle);
        state.next_handle += 1;
        handle
    }
}

impl Camera for RecordingMap {
    fn set_view(&mut self, center: LatLng, zoom: f64) {
        let mut state = self.state.borrow_mut();
        state.center = center;
        state.zoom = zoom.clamp(zoom::MIN, zoom::MAX);
        let zoom = state.zoom;
        state.ops.push(DrawOp::SetView { center, zoom });
    }

    fn animate(&mut self, target: &CameraTarget) {
        let mut state = self.state.borrow_mut();
        let (center, new_zoom) = match *target {
            CameraTarget::FlyTo { center, zoom } => (center, zoom.clamp(zoom::MIN, zoom::MAX)),
            CameraTarget::FitBounds {
                bounds,
                padding_px,
                max_zoom,
            } => {
                let cap = max_zoom.unwrap_or(zoom::MAX).min(zoom::MAX);
                (
                    bounds.center(),
                    fit_zoom(&bounds, state.size, padding_px, zoom::MIN, cap),
                )
            }
        };

        state.ops.push(DrawOp::Animate { target: *target });
        state.pending_events.push(CameraEvent::MoveStarted {
            origin: MoveOrigin::Programmatic,
        });
        if new_zoom != state.zoom {
            state
                .pending_events
                .push(CameraEvent::ZoomChanged { zoom: new_zoom });
        }
        state.center = center;
        state.zoom = new_zoom;
        state.pending_events.push(CameraEvent::MoveEnded {
            center,
            zoom: new_zoom,
        });
    }

    fn center(&self) -> LatLng {
        self.state.borrow().center
    }

    fn zoom(&self) -> f64 {
        self.state.borrow().zoom
    }
}

impl MarkerSurface for RecordingMap {
    fn add_marker(&mut self, spec: MarkerSpec<'_>) -> RenderHandle {
        let mut state = self.state.borrow_mut();
        let handle = Self::allocate_handle(&mut state);
        state
            .markers
            .insert(handle, (spec.layer, spec.entity_id.clone()));
        state.ops.push(DrawOp::AddMarker {
            handle,
            layer: spec.layer,
            entity_id: spec.entity_id.clone(),
        });
        handle
    }

    fn remove_marker(&mut self, handle: RenderHandle) {
        let mut state = self.state.borrow_mut();
        if state.markers.remove(&handle).is_none() {
            log::warn!("Removing unknown marker handle {:?}", handle);
        }
        if state.popup == Some(handle) {
            state.popup = None;
        }
        state.ops.push(DrawOp::RemoveMarker { handle });
    }

    fn set_marker_size(&mut self, size_px: f64) {
        let mut state = self.state.borrow_mut();
        state.marker_size_px = Some(size_px);
        state.ops.push(DrawOp::SetMarkerSize { size_px });
    }

    fn open_popup(&mut self, handle: RenderHandle) {
        let mut state = self.state.borrow_mut();
        state.popup = Some(handle);
        state.ops.push(DrawOp::OpenPopup { handle });
    }
}

impl OverlaySurface for RecordingMap {
    fn show_overlay(&mut self, overlay: &BoundaryOverlay, style: &OverlayStyle) -> RenderHandle {
        let mut state = self.state.borrow_mut();
        let handle = Self::allocate_handle(&mut state);
        if state.overlay.is_some() {
            log::warn!("Showing a boundary overlay while another one is still drawn");
        }
        state.ops.push(DrawOp::ShowOverlay {
            handle,
            kind: overlay.kind,
            name: overlay.name.clone(),
            fill_opacity: style.fill_opacity,
            interactive: style.interactive,
        });
        state.overlay = Some((handle, overlay.clone(), style.clone()));
        handle
    }

    fn remove_overlay(&mut self, handle: RenderHandle) {
        let mut state = self.state.borrow_mut();
        if state.overlay.as_ref().is_some_and(|(h, _, _)| *h == handle) {
            state.overlay = None;
        }
        state.ops.push(DrawOp::RemoveOverlay { handle });
    }
}

impl CameraFeedback for RecordingMap {
    fn take_camera_events(&mut self) -> Vec<CameraEvent> {
        std::mem::take(&mut self.state.borrow_mut().pending_events)
    }
}
