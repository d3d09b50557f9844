//! Camera intents and their precedence

use serde::Serialize;

use crate::domain::{EntityId, MarkerLayer};
use crate::render::CameraTarget;

/// What caused an intent. Declaration order is specificity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Default region of the business layer
    LayerDefaultRegion,
    /// Search matches appeared or the search was cleared
    Search,
    /// Geocoded administrative unit (or the entity centroid fallback)
    LocationResolve,
    /// Selected ward or district boundary changed
    BoundaryRefit,
    /// Entity picked from autocomplete
    EntitySelection,
}

/// Marker popup to open once the camera settles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupRequest {
    pub layer: MarkerLayer,
    pub entity_id: EntityId,
}

/// A camera transition proposed by the policy or the boundary overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraIntent {
    pub trigger: Trigger,
    pub target: CameraTarget,
    /// Overrides the user interaction lock
    pub forced: bool,
    pub popup: Option<PopupRequest>,
}

impl CameraIntent {
    pub fn new(trigger: Trigger, target: CameraTarget) -> Self {
        Self {
            trigger,
            target,
            forced: false,
            popup: None,
        }
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    pub fn with_popup(mut self, layer: MarkerLayer, entity_id: EntityId) -> Self {
        self.popup = Some(PopupRequest { layer, entity_id });
        self
    }
}

/// Pick the intent to apply. Ties go to the one issued last.
pub fn most_specific(intents: impl IntoIterator<Item = CameraIntent>) -> Option<CameraIntent> {
    intents.into_iter().fold(None, |best, intent| match best {
        Some(best) if best.trigger > intent.trigger => Some(best),
        _ => Some(intent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LatLng;

    fn fly(trigger: Trigger, lat: f64) -> CameraIntent {
        CameraIntent::new(
            trigger,
            CameraTarget::FlyTo {
                center: LatLng::new(lat, 105.8),
                zoom: 14.0,
            },
        )
    }

    #[test]
    fn test_most_specific_trigger_wins() {
        let picked = most_specific(vec![
            fly(Trigger::BoundaryRefit, 21.0),
            fly(Trigger::Search, 21.1),
            fly(Trigger::LayerDefaultRegion, 21.2),
        ])
        .unwrap();
        assert_eq!(picked.trigger, Trigger::BoundaryRefit);
    }

    #[test]
    fn test_tie_goes_to_last() {
        let picked =
            most_specific(vec![fly(Trigger::Search, 21.0), fly(Trigger::Search, 21.5)]).unwrap();
        assert_eq!(picked.target.center().lat, 21.5);
        assert!(most_specific(Vec::new()).is_none());
    }
}
