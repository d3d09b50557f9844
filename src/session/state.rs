use crate::domain::{AdminSelection, EntityId, LatLng, MapEntity, MarkerLayer, valid_positions};
use crate::policy::PopupRequest;

/// Popup waiting for the jump that carries it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPopup {
    /// Sequence number of the camera transition to wait for
    pub transition: u64,
    pub request: PopupRequest,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    pub admin: AdminSelection,
    pub selected_entity: Option<EntityId>,
    pub pending_popup: Option<PendingPopup>,
}

impl SelectionState {
    pub fn clear(&mut self) {
        self.admin = AdminSelection::default();
        self.selected_entity = None;
        self.pending_popup = None;
    }
}

/// Latest entity list of the active layer
#[derive(Clone, Debug, Default)]
pub struct DataState {
    pub layer: Option<MarkerLayer>,
    pub entities: Vec<MapEntity>,
}

impl DataState {
    pub fn set(&mut self, layer: MarkerLayer, entities: Vec<MapEntity>) {
        self.layer = Some(layer);
        self.entities = entities;
    }

    pub fn clear(&mut self) {
        self.layer = None;
        self.entities.clear();
    }

    pub fn find(&self, id: &EntityId) -> Option<&MapEntity> {
        self.entities.iter().find(|entity| &entity.id == id)
    }

    /// Positions of the entities with valid coordinates
    pub fn positions(&self) -> Vec<LatLng> {
        valid_positions(&self.entities)
    }
}
