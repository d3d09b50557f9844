//! Layer exclusivity
//!
//! Business and department markers are never populated at the same time.
//! A switch passes through `LayerMode::None` and clears every handle of the
//! previous layer before the new layer may receive markers.

use crate::domain::{LayerMode, MarkerLayer};
use crate::markers::MarkerRegistry;
use crate::render::MarkerSurface;

/// Result of a layer switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSwitch {
    pub previous: LayerMode,
    pub current: LayerMode,
    /// Handles removed from the previous layer
    pub cleared: usize,
}

#[derive(Debug, Default)]
pub struct LayerExclusivityCoordinator {
    mode: LayerMode,
}

impl LayerExclusivityCoordinator {
    pub fn mode(&self) -> LayerMode {
        self.mode
    }

    /// Whether markers for `layer` may be rendered right now
    pub fn accepts(&self, layer: MarkerLayer) -> bool {
        self.mode.layer() == Some(layer)
    }

    /// Switch to `target`. Returns None when already there.
    ///
    /// Everything except `target` is cleared synchronously before returning,
    /// so the caller can only request new markers afterwards.
    pub fn switch_to(
        &mut self,
        registry: &mut MarkerRegistry,
        surface: &mut dyn MarkerSurface,
        target: LayerMode,
    ) -> Option<LayerSwitch> {
        if self.mode == target {
            return None;
        }
        let previous = self.mode;
        self.mode = LayerMode::None;

        let cleared = match target.layer() {
            None => registry.clear_all(surface),
            Some(layer) => registry.clear_layer(surface, layer.other()),
        };
        debug_assert!(Self::exclusive(registry));

        self.mode = target;
        log::info!(
            "Layer mode {:?} -> {:?}, cleared {} markers",
            previous,
            target,
            cleared
        );
        Some(LayerSwitch {
            previous,
            current: target,
            cleared,
        })
    }

    /// The two layers never both hold handles
    pub fn exclusive(registry: &MarkerRegistry) -> bool {
        registry.is_empty(MarkerLayer::Business) || registry.is_empty(MarkerLayer::Department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MapEntity;
    use crate::render::recording::{DrawOp, RecordingMap};

    fn entities(prefix: &str, n: usize) -> Vec<MapEntity> {
        (0..n)
            .map(|i| MapEntity::new(format!("{prefix}{i}"), 21.0 + i as f64 * 0.01, 105.8))
            .collect()
    }

    #[test]
    fn test_switch_clears_other_layer_first() {
        let map = RecordingMap::default();
        let mut surface = map.clone();
        let mut registry = MarkerRegistry::new(16.0);
        let mut layers = LayerExclusivityCoordinator::default();

        layers.switch_to(&mut registry, &mut surface, LayerMode::Business);
        registry.reconcile(&mut surface, MarkerLayer::Business, &entities("b", 3));
        map.clear_ops();

        let switch = layers
            .switch_to(&mut registry, &mut surface, LayerMode::Department)
            .unwrap();
        assert_eq!(switch.cleared, 3);
        assert_eq!(switch.previous, LayerMode::Business);
        assert!(registry.is_empty(MarkerLayer::Business));
        assert!(layers.accepts(MarkerLayer::Department));
        assert!(!layers.accepts(MarkerLayer::Business));

        registry.reconcile(&mut surface, MarkerLayer::Department, &entities("d", 2));
        let ops = map.ops();
        let last_remove = ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::RemoveMarker { .. }))
            .unwrap();
        let first_add = ops
            .iter()
            .position(|op| matches!(op, DrawOp::AddMarker { .. }))
            .unwrap();
        assert!(last_remove < first_add);
        assert!(LayerExclusivityCoordinator::exclusive(&registry));
    }

    #[test]
    fn test_switch_to_same_mode_is_noop() {
        let map = RecordingMap::default();
        let mut surface = map.clone();
        let mut registry = MarkerRegistry::new(16.0);
        let mut layers = LayerExclusivityCoordinator::default();
        assert!(layers.switch_to(&mut registry, &mut surface, LayerMode::Business).is_some());
        assert!(layers.switch_to(&mut registry, &mut surface, LayerMode::Business).is_none());
    }

    #[test]
    fn test_switch_to_none_clears_everything() {
        let map = RecordingMap::default();
        let mut surface = map.clone();
        let mut registry = MarkerRegistry::new(16.0);
        let mut layers = LayerExclusivityCoordinator::default();
        layers.switch_to(&mut registry, &mut surface, LayerMode::Department);
        registry.reconcile(&mut surface, MarkerLayer::Department, &entities("d", 2));

        let switch = layers.switch_to(&mut registry, &mut surface, LayerMode::None).unwrap();
        assert_eq!(switch.cleared, 2);
        assert_eq!(map.marker_count(MarkerLayer::Department), 0);
        assert!(!layers.accepts(MarkerLayer::Department));
    }
}
