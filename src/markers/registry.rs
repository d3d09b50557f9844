//! Marker registry
//!
//! Keeps, per layer, the rendered marker handles keyed by entity id and
//! reconciles them against the latest entity list by set difference, so
//! unchanged markers are never touched.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::{EntityId, MapEntity, MarkerLayer};
use crate::render::geometry::MarkerScale;
use crate::render::{MarkerSpec, MarkerSurface, RenderHandle};

/// A rendered marker. Unique per (entity, layer), never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHandle {
    pub entity_id: EntityId,
    pub layer: MarkerLayer,
    pub render_handle: RenderHandle,
}

/// Outcome of one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
    pub kept: usize,
    /// Entities skipped for missing or non-finite coordinates
    pub invalid: usize,
}

#[derive(Debug)]
pub struct MarkerRegistry {
    layers: HashMap<MarkerLayer, HashMap<EntityId, MarkerHandle>>,
    last_invalid: usize,
    size_px: f64,
}

impl MarkerRegistry {
    pub fn new(size_px: f64) -> Self {
        Self {
            layers: HashMap::new(),
            last_invalid: 0,
            size_px,
        }
    }

    /// Bring the rendered markers of `layer` in line with `entities`.
    ///
    /// Removes markers whose id disappeared, adds markers for new ids and
    /// leaves the rest alone. Entities without a valid position are skipped.
    pub fn reconcile(
        &mut self,
        surface: &mut dyn MarkerSurface,
        layer: MarkerLayer,
        entities: &[MapEntity],
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut wanted: HashMap<&EntityId, &MapEntity> = HashMap::with_capacity(entities.len());
        for entity in entities {
            if !entity.has_valid_position() {
                report.invalid += 1;
                continue;
            }
            if wanted.insert(&entity.id, entity).is_some() {
                log::debug!("Duplicate entity id {} in {} layer", entity.id, layer.name());
            }
        }

        let rendered = self.layers.entry(layer).or_default();

        let stale: Vec<EntityId> = rendered
            .keys()
            .filter(|id| !wanted.contains_key(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(handle) = rendered.remove(&id) {
                surface.remove_marker(handle.render_handle);
                report.removed += 1;
            }
        }

        // Iterate the input order so handles are created deterministically
        let mut seen: HashSet<&EntityId> = HashSet::with_capacity(wanted.len());
        for entity in entities {
            let Some(position) = entity.position() else {
                continue;
            };
            if !seen.insert(&entity.id) {
                continue;
            }
            if rendered.contains_key(&entity.id) {
                report.kept += 1;
                continue;
            }
            let render_handle = surface.add_marker(MarkerSpec {
                entity_id: &entity.id,
                layer,
                position,
                meta: &entity.meta,
                size_px: self.size_px,
            });
            rendered.insert(
                entity.id.clone(),
                MarkerHandle {
                    entity_id: entity.id.clone(),
                    layer,
                    render_handle,
                },
            );
            report.added += 1;
        }

        self.last_invalid = report.invalid;
        if report.invalid > 0 {
            log::debug!(
                "Skipped {} {} entities without valid coordinates",
                report.invalid,
                layer.name()
            );
        }
        report
    }

    /// Remove every handle of a layer. Returns how many were removed.
    pub fn clear_layer(&mut self, surface: &mut dyn MarkerSurface, layer: MarkerLayer) -> usize {
        let Some(rendered) = self.layers.get_mut(&layer) else {
            return 0;
        };
        let count = rendered.len();
        for (_, handle) in rendered.drain() {
            surface.remove_marker(handle.render_handle);
        }
        count
    }

    /// Remove every handle of every layer
    pub fn clear_all(&mut self, surface: &mut dyn MarkerSurface) -> usize {
        self.clear_layer(surface, MarkerLayer::Business)
            + self.clear_layer(surface, MarkerLayer::Department)
    }

    pub fn handle(&self, layer: MarkerLayer, id: &EntityId) -> Option<&MarkerHandle> {
        self.layers.get(&layer)?.get(id)
    }

    /// Handle of the distinguished selected entity, when it is rendered
    pub fn selected_handle(
        &self,
        layer: MarkerLayer,
        selected: Option<&EntityId>,
    ) -> Option<&MarkerHandle> {
        self.handle(layer, selected?)
    }

    /// Reverse lookup used for click reporting
    pub fn find_by_render_handle(&self, render_handle: RenderHandle) -> Option<&MarkerHandle> {
        self.layers
            .values()
            .flat_map(|rendered| rendered.values())
            .find(|handle| handle.render_handle == render_handle)
    }

    pub fn len(&self, layer: MarkerLayer) -> usize {
        self.layers.get(&layer).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, layer: MarkerLayer) -> bool {
        self.len(layer) == 0
    }

    /// Invalid entities skipped by the most recent reconcile
    pub fn invalid_count(&self) -> usize {
        self.last_invalid
    }

    pub fn size_px(&self) -> f64 {
        self.size_px
    }

    /// Resize markers for a new zoom level
    pub fn rescale(&mut self, surface: &mut dyn MarkerSurface, zoom: f64, scale: &MarkerScale) {
        let size_px = scale.size_for_zoom(zoom);
        if size_px == self.size_px {
            return;
        }
        self.size_px = size_px;
        surface.set_marker_size(size_px);
    }
}
