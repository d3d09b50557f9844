//! The map session
//!
//! Owns every component and the renderer handles. Input arrives as batches
//! of messages (`tick`), output leaves as effects for the runtime. Nothing
//! here blocks or performs IO.

use serde::Serialize;

use crate::boundary::{BoundaryDataset, BoundaryOverlayManager};
use crate::config::MapConfig;
use crate::domain::{BoundaryKind, LayerMode, MarkerLayer};
use crate::layers::LayerExclusivityCoordinator;
use crate::markers::MarkerRegistry;
use crate::policy::{AutoZoomPolicy, CameraIntent, most_specific};
use crate::render::recording::RecordingMap;
use crate::render::{Camera, MapSurface};
use crate::viewport::{TransitionResult, ViewportController, ViewportInteractionState};

use super::effects::Effect;
use super::handlers::{self, TickContext};
use super::messages::Msg;
use super::state::{DataState, PendingPopup, SelectionState};

pub struct MapSession {
    pub(crate) config: MapConfig,
    pub(crate) viewport: ViewportController,
    pub(crate) surface: Box<dyn MapSurface>,
    pub(crate) boundaries: Box<dyn BoundaryDataset>,
    pub(crate) markers: MarkerRegistry,
    pub(crate) overlay: BoundaryOverlayManager,
    pub(crate) layers: LayerExclusivityCoordinator,
    pub(crate) policy: AutoZoomPolicy,
    pub(crate) selection: SelectionState,
    pub(crate) data: DataState,
    pub(crate) torn_down: bool,
}

/// Observable state after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub viewport: ViewportInteractionState,
    pub layer_mode: LayerMode,
    pub business_markers: usize,
    pub department_markers: usize,
    pub invalid_entities: usize,
    pub marker_size_px: f64,
    pub overlay: Option<(BoundaryKind, String)>,
    pub search: String,
    pub torn_down: bool,
}

impl MapSession {
    pub fn new(
        config: MapConfig,
        camera: Box<dyn Camera>,
        surface: Box<dyn MapSurface>,
        boundaries: Box<dyn BoundaryDataset>,
    ) -> Self {
        let overlay = BoundaryOverlayManager::new(
            config.overlay.clone(),
            config.fit_padding_px,
            config.boundary_max_zoom,
        );
        Self {
            viewport: ViewportController::new(camera),
            surface,
            boundaries,
            markers: MarkerRegistry::new(config.marker_scale.min_px),
            overlay,
            layers: LayerExclusivityCoordinator::default(),
            policy: AutoZoomPolicy::new(config.clone()),
            selection: SelectionState::default(),
            data: DataState::default(),
            torn_down: false,
            config,
        }
    }

    /// Session drawing into an in-memory map
    pub fn recording(
        config: MapConfig,
        map: &RecordingMap,
        boundaries: impl BoundaryDataset + 'static,
    ) -> Self {
        Self::new(
            config,
            Box::new(map.clone()),
            Box::new(map.clone()),
            Box::new(boundaries),
        )
    }

    /// Handle a batch of messages in phase order and apply at most one
    /// camera intent.
    pub fn tick(&mut self, mut msgs: Vec<Msg>) -> Vec<Effect> {
        if self.torn_down {
            log::debug!("Session torn down, dropping {} messages", msgs.len());
            return Vec::new();
        }

        msgs.sort_by_key(Msg::phase);
        let mut ctx = TickContext::default();
        for msg in msgs {
            if self.torn_down {
                break;
            }
            self.handle(msg, &mut ctx);
        }

        if !self.torn_down {
            self.apply_intents(std::mem::take(&mut ctx.intents));
        }
        ctx.effects
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        self.tick(vec![msg])
    }

    fn handle(&mut self, msg: Msg, ctx: &mut TickContext) {
        match msg {
            Msg::Lifecycle(msg) => handlers::handle_lifecycle(self, msg, ctx),
            Msg::Layer(layer) => handlers::handle_layer(self, layer, ctx),
            Msg::Entities { layer, entities } => {
                handlers::handle_entities(self, layer, entities, ctx)
            }
            Msg::Select(msg) => handlers::handle_select(self, msg, ctx),
            Msg::Camera(event) => handlers::handle_camera(self, event, ctx),
            Msg::Pointer(msg) => handlers::handle_pointer(self, msg, ctx),
            Msg::Async(msg) => handlers::handle_async(self, msg, ctx),
        }
    }

    fn apply_intents(&mut self, intents: Vec<CameraIntent>) {
        let proposed = intents.len();
        let Some(intent) = most_specific(intents) else {
            return;
        };
        match self.viewport.request_transition(&intent.target, intent.forced) {
            TransitionResult::Applied(transition) => {
                log::debug!(
                    "Applied {:?} transition #{} ({} proposed)",
                    intent.trigger,
                    transition,
                    proposed
                );
                self.selection.pending_popup = intent
                    .popup
                    .map(|request| PendingPopup { transition, request });
            }
            TransitionResult::Suppressed => {}
            TransitionResult::Unavailable => {
                log::debug!("Camera unavailable, dropped {:?} transition", intent.trigger);
            }
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn overlay(&self) -> &BoundaryOverlayManager {
        &self.overlay
    }

    pub fn layer_mode(&self) -> LayerMode {
        self.layers.mode()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            viewport: *self.viewport.state(),
            layer_mode: self.layers.mode(),
            business_markers: self.markers.len(MarkerLayer::Business),
            department_markers: self.markers.len(MarkerLayer::Department),
            invalid_entities: self.markers.invalid_count(),
            marker_size_px: self.markers.size_px(),
            overlay: self
                .overlay
                .active()
                .map(|overlay| (overlay.kind, overlay.name.clone())),
            search: self.policy.search_text().to_string(),
            torn_down: self.torn_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::boundary::StaticBoundaries;
    use crate::domain::{
        AdminLevel, AdminSelection, EntityId, LatLng, LatLngBounds, MapEntity, Polygon,
        ResolvedLocation,
    };
    use crate::render::recording::DrawOp;
    use crate::render::{CameraEvent, CameraFeedback, CameraTarget};
    use crate::session::effects::Notification;

    fn square(lat: f64, lng: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            LatLng::new(lat, lng),
            LatLng::new(lat + size, lng),
            LatLng::new(lat + size, lng + size),
            LatLng::new(lat, lng + size),
        ])
    }

    fn boundaries() -> StaticBoundaries {
        StaticBoundaries::default()
            .with_ward("Phường A", square(21.03, 105.83, 0.01))
            .with_district("Ba Đình", square(21.0, 105.8, 0.08))
    }

    fn ward(name: &str) -> AdminSelection {
        AdminSelection::province("Hà Nội")
            .with_district("Ba Đình")
            .with_ward(name)
    }

    fn pho() -> Vec<MapEntity> {
        vec![
            MapEntity::new("p1", 21.02, 105.84).with_title("Phở Thìn"),
            MapEntity::new("p2", 21.04, 105.81).with_title("Phở Bát Đàn"),
            MapEntity::new("p3", 21.00, 105.86).with_title("Phở 10"),
        ]
    }

    fn start(boundaries: StaticBoundaries) -> (MapSession, RecordingMap) {
        let map = RecordingMap::default();
        let mut session = MapSession::recording(MapConfig::default(), &map, boundaries);
        let view = session.config().default_view;
        session.update(Msg::initialize(view.center, view.zoom));
        (session, map)
    }

    /// Feed buffered camera callbacks back until the map is quiet
    fn settle(session: &mut MapSession, map: &RecordingMap) -> Vec<Effect> {
        let mut feedback = map.clone();
        let mut effects = Vec::new();
        loop {
            let events = feedback.take_camera_events();
            if events.is_empty() {
                return effects;
            }
            effects.extend(session.tick(events.into_iter().map(Msg::camera).collect()));
        }
    }

    fn business(session: &mut MapSession, map: &RecordingMap, entities: Vec<MapEntity>) {
        session.tick(vec![
            Msg::layer(MarkerLayer::Business),
            Msg::entities(MarkerLayer::Business, entities),
        ]);
        settle(session, map);
        map.clear_ops();
    }

    #[test]
    fn test_initialize_notifies_once() {
        let map = RecordingMap::default();
        let mut session = MapSession::recording(MapConfig::default(), &map, boundaries());
        let effects = session.update(Msg::initialize(LatLng::new(21.0, 105.8), 12.0));
        assert_eq!(effects, vec![Effect::Notify(Notification::ViewportReady)]);
        assert!(session.update(Msg::initialize(LatLng::new(10.8, 106.6), 12.0)).is_empty());
        assert_eq!(map.marker_size(), Some(22.0));
    }

    #[test]
    fn test_marker_count_matches_valid_entities() {
        let (mut session, map) = start(boundaries());
        let mut missing = MapEntity::new("missing", 21.0, 105.8);
        missing.lat = None;
        let entities = vec![
            MapEntity::new("origin", 0.0, 0.0),
            MapEntity::new("nan", f64::NAN, 105.8),
            missing,
            MapEntity::new("shop", 21.03, 105.85),
        ];
        business(&mut session, &map, entities);

        assert_eq!(map.marker_count(MarkerLayer::Business), 2);
        assert_eq!(session.markers().len(MarkerLayer::Business), 2);
        assert_eq!(session.snapshot().invalid_entities, 2);
    }

    #[test]
    fn test_layer_switch_clears_before_creating() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());

        let departments = vec![
            MapEntity::new("d1", 21.01, 105.82),
            MapEntity::new("d2", 21.05, 105.84),
        ];
        let effects = session.tick(vec![
            Msg::entities(MarkerLayer::Department, departments.clone()),
            Msg::layer(MarkerLayer::Department),
        ]);
        assert!(effects.contains(&Effect::Notify(Notification::LayerRequested {
            layer: MarkerLayer::Department
        })));
        assert_eq!(map.marker_count(MarkerLayer::Business), 0);
        assert_eq!(map.marker_count(MarkerLayer::Department), 2);

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

        // Stale business data arriving late is refused
        session.update(Msg::entities(MarkerLayer::Business, pho()));
        assert_eq!(map.marker_count(MarkerLayer::Business), 0);
        assert_eq!(map.marker_count(MarkerLayer::Department), 2);
    }

    #[test]
    fn test_business_layer_flies_to_default_region() {
        let (mut session, map) = start(boundaries());
        session.update(Msg::layer(MarkerLayer::Business));
        let region = session.config().business_region;
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FlyTo {
                center: region.center,
                zoom: region.zoom
            }]
        );

        map.clear_ops();
        settle(&mut session, &map);
        session.update(Msg::layer(MarkerLayer::Department));
        assert!(map.animations().is_empty());
    }

    #[test]
    fn test_search_fits_matches_then_resets() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, Vec::new());

        session.tick(vec![
            Msg::search("Phở"),
            Msg::entities(MarkerLayer::Business, pho()),
        ]);
        let positions: Vec<LatLng> = pho().iter().filter_map(MapEntity::position).collect();
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FitBounds {
                bounds: LatLngBounds::from_points(positions).unwrap(),
                padding_px: 50.0,
                max_zoom: None,
            }]
        );

        settle(&mut session, &map);
        map.clear_ops();
        session.tick(vec![
            Msg::search(""),
            Msg::entities(MarkerLayer::Business, Vec::new()),
        ]);
        let view = session.config().default_view;
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FlyTo {
                center: view.center,
                zoom: view.zoom
            }]
        );
    }

    #[test]
    fn test_user_lock_blocks_search_but_not_selection() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());

        map.user_gesture(LatLng::new(21.1, 105.9), 13.0);
        settle(&mut session, &map);
        assert!(session.viewport().is_locked());
        let before = *session.viewport().state();

        session.update(Msg::search("Phở"));
        assert!(map.animations().is_empty());
        assert_eq!(*session.viewport().state(), before);

        session.update(Msg::select_entity("p2"));
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FlyTo {
                center: LatLng::new(21.04, 105.81),
                zoom: 17.0
            }]
        );
        assert!(!session.viewport().is_locked());
    }

    #[test]
    fn test_selected_entity_popup_opens_after_settle() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());

        session.update(Msg::select_entity("p3"));
        assert!(map.popup().is_none());
        settle(&mut session, &map);

        let expected = map
            .marker_handle(MarkerLayer::Business, &EntityId::from("p3"))
            .unwrap();
        assert_eq!(map.popup(), Some(expected));
        assert!(session.selection().pending_popup.is_none());
    }

    #[test]
    fn test_user_gesture_during_flight_drops_popup() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());

        session.update(Msg::select_entity("p1"));
        session.update(Msg::move_started(crate::render::MoveOrigin::User));
        settle(&mut session, &map);
        assert!(map.popup().is_none());
    }

    #[test]
    fn test_ward_overlay_refits_with_cap() {
        let (mut session, map) = start(boundaries());
        let effects = session.update(Msg::select_admin(ward("Phường A")));

        let overlay = map.overlay().unwrap();
        assert_eq!(overlay.kind, BoundaryKind::Ward);
        let style = map.overlay_style().unwrap();
        assert_eq!(style.fill_opacity, 0.30);
        assert!(!style.interactive);
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FitBounds {
                bounds: square(21.03, 105.83, 0.01).bounds().unwrap(),
                padding_px: 50.0,
                max_zoom: Some(16.0),
            }]
        );
        assert_eq!(
            effects,
            vec![Effect::ScheduleDebounce {
                token: 1,
                delay: Duration::from_millis(300)
            }]
        );

        // Same ward under a renamed province: no refit, no new lookup
        settle(&mut session, &map);
        map.clear_ops();
        let mut renamed = ward("Phường A");
        renamed.province = Some("Thành phố Hà Nội".to_string());
        let effects = session.update(Msg::select_admin(renamed));
        assert!(map.animations().is_empty());
        assert!(effects.is_empty());
        assert_eq!(map.overlay().unwrap().name, "Phường A");
    }

    #[test]
    fn test_ward_without_polygon_uses_district() {
        let (mut session, map) = start(boundaries());
        session.update(Msg::select_admin(ward("Phường Z")));

        let overlay = map.overlay().unwrap();
        assert_eq!(overlay.kind, BoundaryKind::District);
        assert_eq!(overlay.name, "Ba Đình");
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FitBounds {
                bounds: square(21.0, 105.8, 0.08).bounds().unwrap(),
                padding_px: 50.0,
                max_zoom: Some(16.0),
            }]
        );
    }

    #[test]
    fn test_boundary_refit_beats_layer_region_in_one_tick() {
        let (mut session, map) = start(boundaries());
        session.tick(vec![
            Msg::select_admin(AdminSelection::province("Hà Nội").with_district("Ba Đình")),
            Msg::layer(MarkerLayer::Business),
        ]);
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FitBounds {
                bounds: square(21.0, 105.8, 0.08).bounds().unwrap(),
                padding_px: 50.0,
                max_zoom: None,
            }]
        );
    }

    #[test]
    fn test_stale_geocode_does_not_move_camera() {
        let (mut session, map) = start(StaticBoundaries::default());
        business(&mut session, &map, Vec::new());

        let effects = session.update(Msg::select_admin(ward("Phường A")));
        assert!(matches!(effects[..], [Effect::ScheduleDebounce { token: 1, .. }]));
        let effects = session.update(Msg::debounce_elapsed(1));
        let [Effect::Geocode { token: 1, unit }] = &effects[..] else {
            panic!("expected a geocode request, got {:?}", effects);
        };
        assert_eq!(unit.level, AdminLevel::Ward);
        assert_eq!(unit.name, "Phường A");

        let effects = session.update(Msg::select_admin(ward("Phường B")));
        assert!(matches!(effects[..], [Effect::ScheduleDebounce { token: 2, .. }]));

        let ward_a = ResolvedLocation {
            center: LatLng::new(21.035, 105.835),
            bounds: None,
        };
        session.update(Msg::geocode_resolved(1, Some(ward_a)));
        assert!(map.animations().is_empty());

        let ward_b = ResolvedLocation {
            center: LatLng::new(21.045, 105.815),
            bounds: None,
        };
        session.update(Msg::debounce_elapsed(2));
        session.update(Msg::geocode_resolved(2, Some(ward_b)));
        assert_eq!(
            map.animations(),
            vec![CameraTarget::FlyTo {
                center: ward_b.center,
                zoom: 14.0
            }]
        );
    }

    #[test]
    fn test_failed_geocode_falls_back_to_centroid() {
        let (mut session, map) = start(StaticBoundaries::default());
        let entities = vec![
            MapEntity::new("a", 21.0, 105.8),
            MapEntity::new("b", 21.1, 105.9),
        ];
        business(&mut session, &map, entities);

        session.update(Msg::select_admin(AdminSelection::province("Hà Nội")));
        session.update(Msg::debounce_elapsed(1));
        session.update(Msg::geocode_resolved(1, None));
        let animations = map.animations();
        let [CameraTarget::FlyTo { center, zoom }] = animations.as_slice() else {
            panic!("expected one fly-to, got {:?}", animations);
        };
        assert!((center.lat - 21.05).abs() < 1e-9);
        assert!((center.lng - 105.85).abs() < 1e-9);
        assert_eq!(*zoom, 14.0);
    }

    #[test]
    fn test_marker_click_is_forwarded() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());
        let handle = map
            .marker_handle(MarkerLayer::Business, &EntityId::from("p1"))
            .unwrap();

        let effects = session.update(Msg::marker_clicked(handle));
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::MarkerClicked {
                entity_id: EntityId::from("p1")
            })]
        );
        let effects =
            session.update(Msg::boundary_clicked("Phường A", Some("Ba Đình".into())));
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::BoundaryClicked {
                unit: "Phường A".into(),
                parent: Some("Ba Đình".into())
            })]
        );
    }

    #[test]
    fn test_zoom_rescales_markers() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());
        map.user_gesture(LatLng::new(21.02, 105.84), 14.0);
        settle(&mut session, &map);
        assert_eq!(map.marker_size(), Some(28.0));
        assert_eq!(session.markers().size_px(), 28.0);
    }

    #[test]
    fn test_zoom_reported_only_by_move_end_rescales() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());
        let center = LatLng::new(21.02, 105.84);
        session.tick(vec![
            Msg::move_started(crate::render::MoveOrigin::User),
            Msg::camera(CameraEvent::MoveEnded { center, zoom: 16.0 }),
        ]);
        session.update(Msg::camera(CameraEvent::ZoomChanged { zoom: 16.0 }));
        assert_eq!(map.marker_size(), Some(34.0));
        assert_eq!(session.viewport().state().zoom, 16.0);
    }

    #[test]
    fn test_popup_waits_for_its_own_jump() {
        let (mut session, mut map) = start(boundaries());
        business(&mut session, &map, pho());

        let district = AdminSelection::province("Hà Nội").with_district("Ba Đình");
        session.update(Msg::select_admin(district));
        session.update(Msg::select_entity("p1"));
        let events = map.take_camera_events();
        let first_end = events
            .iter()
            .position(|event| matches!(event, CameraEvent::MoveEnded { .. }))
            .unwrap();
        assert!(first_end + 1 < events.len());

        let (refit, jump) = events.split_at(first_end + 1);
        session.tick(refit.iter().copied().map(Msg::camera).collect());
        assert!(map.popup().is_none());
        assert!(session.selection().pending_popup.is_some());

        session.tick(jump.iter().copied().map(Msg::camera).collect());
        let expected = map
            .marker_handle(MarkerLayer::Business, &EntityId::from("p1"))
            .unwrap();
        assert_eq!(map.popup(), Some(expected));
    }

    #[test]
    fn test_cleared_selection_keeps_popup_closed() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());

        session.update(Msg::select_entity("p2"));
        session.update(Msg::clear_entity());
        settle(&mut session, &map);
        assert!(map.popup().is_none());
    }

    #[test]
    fn test_teardown_cancels_and_releases() {
        let (mut session, map) = start(boundaries());
        business(&mut session, &map, pho());
        session.update(Msg::select_admin(ward("Phường A")));
        settle(&mut session, &map);

        let effects = session.update(Msg::teardown());
        assert_eq!(effects, vec![Effect::CancelDebounce { token: 1 }]);
        assert!(session.is_torn_down());
        assert_eq!(map.marker_count(MarkerLayer::Business), 0);
        assert!(map.overlay().is_none());

        map.clear_ops();
        assert!(session.update(Msg::debounce_elapsed(1)).is_empty());
        session.update(Msg::geocode_resolved(
            1,
            Some(ResolvedLocation {
                center: LatLng::new(21.0, 105.8),
                bounds: None,
            }),
        ));
        session.update(Msg::select_entity("p1"));
        assert!(map.ops().is_empty());
    }
}
