//! Host callbacks

use std::cell::RefCell;
use std::rc::Rc;

use crate::domain::{EntityId, MarkerLayer};
use crate::session::Notification;

/// Receives host-facing notifications. Every callback defaults to a no-op.
pub trait MapListener {
    fn on_viewport_ready(&mut self) {}

    fn on_marker_click(&mut self, _entity_id: &EntityId) {}

    /// An administrative area was clicked on the base map
    fn on_boundary_click(&mut self, _unit: &str, _parent: Option<&str>) {}

    /// The previous layer is cleared; send entities for `layer`
    fn on_layer_requested(&mut self, _layer: MarkerLayer) {}
}

/// Route a notification to the matching callback
pub fn deliver(listener: &mut dyn MapListener, notification: &Notification) {
    match notification {
        Notification::ViewportReady => listener.on_viewport_ready(),
        Notification::MarkerClicked { entity_id } => listener.on_marker_click(entity_id),
        Notification::BoundaryClicked { unit, parent } => {
            listener.on_boundary_click(unit, parent.as_deref())
        }
        Notification::LayerRequested { layer } => listener.on_layer_requested(*layer),
    }
}

/// Listener that only logs
#[derive(Debug, Default)]
pub struct LogListener;

impl MapListener for LogListener {
    fn on_viewport_ready(&mut self) {
        log::info!("Viewport ready");
    }

    fn on_marker_click(&mut self, entity_id: &EntityId) {
        log::info!("Marker clicked: {}", entity_id);
    }

    fn on_boundary_click(&mut self, unit: &str, parent: Option<&str>) {
        log::info!("Boundary clicked: {} ({})", unit, parent.unwrap_or("-"));
    }
}

/// Listener keeping every notification. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    received: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingListener {
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    fn push(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}

impl MapListener for RecordingListener {
    fn on_viewport_ready(&mut self) {
        self.push(Notification::ViewportReady);
    }

    fn on_marker_click(&mut self, entity_id: &EntityId) {
        self.push(Notification::MarkerClicked {
            entity_id: entity_id.clone(),
        });
    }

    fn on_boundary_click(&mut self, unit: &str, parent: Option<&str>) {
        self.push(Notification::BoundaryClicked {
            unit: unit.to_string(),
            parent: parent.map(str::to_string),
        });
    }

    fn on_layer_requested(&mut self, layer: MarkerLayer) {
        self.push(Notification::LayerRequested { layer });
    }
}
