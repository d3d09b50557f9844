//! Auto-zoom policy
//!
//! Turns search, selection and layer-mode changes into camera intents.
//! The administrative location path is asynchronous: a selection change
//! schedules a debounce, the debounce issues a geocode request, and the
//! geocode answer becomes an intent. Every step carries a token and only
//! the latest token is honoured.

use crate::config::MapConfig;
use crate::domain::{
    AdminUnit, LatLng, LatLngBounds, LayerMode, MapEntity, MarkerLayer, ResolvedLocation, centroid,
};
use crate::render::CameraTarget;

use super::intent::{CameraIntent, Trigger};

/// Timer bookkeeping requested by a location change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationPlan {
    /// Pending debounce to abort
    pub cancel: Option<u64>,
    /// New debounce to start
    pub schedule: Option<u64>,
}

#[derive(Debug)]
pub struct AutoZoomPolicy {
    config: MapConfig,
    last_search: String,
    /// Search became non-empty before any match was known
    awaiting_matches: bool,
    location_token: u64,
    pending_location: Option<(u64, AdminUnit)>,
}

impl AutoZoomPolicy {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            last_search: String::new(),
            awaiting_matches: false,
            location_token: 0,
            pending_location: None,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.last_search
    }

    /// Latest issued location token
    pub fn location_token(&self) -> u64 {
        self.location_token
    }

    /// Search text changed. `matches` are the valid positions of the
    /// entities currently shown for the search.
    pub fn on_search_changed(&mut self, text: &str, matches: &[LatLng]) -> Option<CameraIntent> {
        let was_empty = self.last_search.trim().is_empty();
        let now_empty = text.trim().is_empty();
        self.last_search = text.to_string();

        match (was_empty, now_empty) {
            (false, true) => {
                self.awaiting_matches = false;
                log::debug!("Search cleared, resetting view");
                let view = self.config.default_view;
                Some(CameraIntent::new(
                    Trigger::Search,
                    CameraTarget::FlyTo {
                        center: view.center,
                        zoom: view.zoom,
                    },
                ))
            }
            (true, false) => {
                let intent = self.fit_matches(matches);
                self.awaiting_matches = intent.is_none();
                intent
            }
            (false, false) if self.awaiting_matches => {
                let intent = self.fit_matches(matches);
                self.awaiting_matches = intent.is_none();
                intent
            }
            _ => None,
        }
    }

    /// Entity list changed while a search is active
    pub fn on_entities_changed(&mut self, matches: &[LatLng]) -> Option<CameraIntent> {
        if !self.awaiting_matches || self.last_search.trim().is_empty() {
            return None;
        }
        let intent = self.fit_matches(matches)?;
        self.awaiting_matches = false;
        Some(intent)
    }

    fn fit_matches(&self, matches: &[LatLng]) -> Option<CameraIntent> {
        let target = match matches {
            [] => return None,
            [only] => CameraTarget::FlyTo {
                center: *only,
                zoom: self.config.search_zoom,
            },
            _ => CameraTarget::FitBounds {
                bounds: LatLngBounds::from_points(matches.iter().copied())?,
                padding_px: self.config.fit_padding_px,
                max_zoom: None,
            },
        };
        log::debug!("Search matched {} entities", matches.len());
        Some(CameraIntent::new(Trigger::Search, target))
    }

    /// Entity picked from autocomplete: forced jump, popup on settle
    pub fn on_entity_selected(
        &self,
        entity: &MapEntity,
        layer: MarkerLayer,
    ) -> Option<CameraIntent> {
        let Some(center) = entity.position() else {
            log::warn!("Selected entity {} has no valid position", entity.id);
            return None;
        };
        Some(
            CameraIntent::new(
                Trigger::EntitySelection,
                CameraTarget::FlyTo {
                    center,
                    zoom: self.config.selection_zoom,
                },
            )
            .forced()
            .with_popup(layer, entity.id.clone()),
        )
    }

    pub fn on_layer_mode(&self, mode: LayerMode) -> Option<CameraIntent> {
        if mode != LayerMode::Business {
            return None;
        }
        let region = self.config.business_region;
        Some(CameraIntent::new(
            Trigger::LayerDefaultRegion,
            CameraTarget::FlyTo {
                center: region.center,
                zoom: region.zoom,
            },
        ))
    }

    /// The most specific selected unit changed. Bumps the token so any
    /// in-flight debounce or geocode answer becomes stale.
    pub fn on_location_changed(&mut self, unit: Option<AdminUnit>) -> LocationPlan {
        let cancel = self.pending_location.take().map(|(token, _)| token);
        self.location_token += 1;
        let schedule = unit.map(|unit| {
            log::debug!("Location {} scheduled as #{}", unit.name, self.location_token);
            self.pending_location = Some((self.location_token, unit));
            self.location_token
        });
        LocationPlan { cancel, schedule }
    }

    /// Debounce fired. Returns the unit to geocode when still current.
    pub fn on_debounce_elapsed(&mut self, token: u64) -> Option<(u64, AdminUnit)> {
        match self.pending_location.take() {
            Some((pending, unit)) if pending == token => Some((token, unit)),
            other => {
                self.pending_location = other;
                log::debug!("Stale location debounce #{}", token);
                None
            }
        }
    }

    /// Geocode answer. `visible` are the valid positions of the rendered
    /// entities, used when the resolver had nothing.
    pub fn on_geocode_resolved(
        &mut self,
        token: u64,
        result: Option<ResolvedLocation>,
        visible: &[LatLng],
    ) -> Option<CameraIntent> {
        if token != self.location_token {
            log::debug!(
                "Discarding stale geocode #{} (latest #{})",
                token,
                self.location_token
            );
            return None;
        }

        let target = match result {
            Some(ResolvedLocation {
                bounds: Some(bounds),
                ..
            }) if bounds.is_finite() => CameraTarget::FitBounds {
                bounds,
                padding_px: self.config.fit_padding_px,
                max_zoom: None,
            },
            Some(location) if location.center.is_finite() => CameraTarget::FlyTo {
                center: location.center,
                zoom: self.config.location_zoom,
            },
            _ => {
                let Some(center) = centroid(visible) else {
                    log::debug!("No location and no visible entities, leaving camera");
                    return None;
                };
                log::debug!("Location unresolved, using centroid of {} entities", visible.len());
                CameraTarget::FlyTo {
                    center,
                    zoom: self.config.location_zoom,
                }
            }
        };
        Some(CameraIntent::new(Trigger::LocationResolve, target))
    }

    /// Invalidate all location work. Returns the debounce to abort.
    pub fn cancel_all(&mut self) -> Option<u64> {
        self.location_token += 1;
        self.pending_location.take().map(|(token, _)| token)
    }
}
