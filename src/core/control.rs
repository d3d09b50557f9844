//! Control handle for a running map runtime
//!
//! Hosts push upstream changes (entities, selection, search) through a
//! cloneable [`MapHandle`]. Each send becomes one session tick.

use tokio::sync::mpsc;

use crate::domain::{AdminSelection, EntityId, MapEntity, MarkerLayer};
use crate::session::Msg;

/// Commands accepted by the runtime
#[derive(Debug, Clone)]
pub enum ControlCommand {
    /// Messages handled together in one tick
    Tick(Vec<Msg>),
    /// Stop the event loop after tearing the session down
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct MapHandle {
    tx: mpsc::UnboundedSender<ControlCommand>,
}

impl MapHandle {
    pub fn new(tx: mpsc::UnboundedSender<ControlCommand>) -> Self {
        Self { tx }
    }

    /// Returns false once the runtime is gone
    pub fn send(&self, msg: Msg) -> bool {
        self.send_batch(vec![msg])
    }

    pub fn send_batch(&self, msgs: Vec<Msg>) -> bool {
        self.tx.send(ControlCommand::Tick(msgs)).is_ok()
    }

    pub fn set_layer(&self, layer: MarkerLayer, entities: Vec<MapEntity>) -> bool {
        self.send_batch(vec![Msg::layer(layer), Msg::entities(layer, entities)])
    }

    pub fn set_entities(&self, layer: MarkerLayer, entities: Vec<MapEntity>) -> bool {
        self.send(Msg::entities(layer, entities))
    }

    pub fn select_admin(&self, selection: AdminSelection) -> bool {
        self.send(Msg::select_admin(selection))
    }

    pub fn select_entity(&self, id: Option<EntityId>) -> bool {
        self.send(match id {
            Some(id) => Msg::select_entity(id),
            None => Msg::clear_entity(),
        })
    }

    pub fn search(&self, text: impl Into<String>) -> bool {
        self.send(Msg::search(text))
    }

    pub fn shutdown(&self) -> bool {
        self.tx.send(ControlCommand::Shutdown).is_ok()
    }
}
