//! Scripted sessions against the in-memory renderer
//!
//! A scenario file names the boundary dataset, the geocoder fixture and a
//! list of steps. Replaying it drives a full runtime (timers included) and
//! reports the session state after every step.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::boundary::StaticBoundaries;
use crate::config::MapConfig;
use crate::domain::{AdminSelection, EntityId, LatLng, MapEntity, MarkerLayer};
use crate::render::recording::{DrawOp, RecordingMap};
use crate::session::{MapSession, Msg, Notification, SessionSnapshot};

use super::geocode::StaticGeocoder;
use super::listener::RecordingListener;
use super::runtime::MapRuntime;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Overrides the configuration passed to [`run_scenario`]
    #[serde(default)]
    pub config: Option<MapConfig>,
    /// Viewport size in pixels
    #[serde(default)]
    pub viewport: Option<(f64, f64)>,
    #[serde(default)]
    pub boundaries: StaticBoundaries,
    #[serde(default)]
    pub geocoder: StaticGeocoder,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Defaults to the configured view
    Initialize {
        #[serde(default)]
        center: Option<LatLng>,
        #[serde(default)]
        zoom: Option<f64>,
    },
    Layer {
        layer: MarkerLayer,
        #[serde(default)]
        entities: Option<Vec<MapEntity>>,
    },
    Entities {
        layer: MarkerLayer,
        entities: Vec<MapEntity>,
    },
    Select {
        selection: AdminSelection,
    },
    Search {
        text: String,
    },
    SelectEntity {
        id: Option<EntityId>,
    },
    UserGesture {
        center: LatLng,
        zoom: f64,
    },
    ClickMarker {
        layer: MarkerLayer,
        id: EntityId,
    },
    /// Let timers and lookups run
    Wait {
        ms: u64,
    },
    /// Raw messages handled in one tick
    Batch {
        msgs: Vec<Msg>,
    },
    Teardown,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub state: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
    pub notifications: Vec<Notification>,
    pub ops: Vec<DrawOp>,
    pub popup: Option<EntityId>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&json)
            .with_context(|| format!("Invalid scenario: {}", path.display()))?;
        Ok(scenario)
    }
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Initialize { .. } => "initialize",
            Step::Layer { .. } => "layer",
            Step::Entities { .. } => "entities",
            Step::Select { .. } => "select",
            Step::Search { .. } => "search",
            Step::SelectEntity { .. } => "select_entity",
            Step::UserGesture { .. } => "user_gesture",
            Step::ClickMarker { .. } => "click_marker",
            Step::Wait { .. } => "wait",
            Step::Batch { .. } => "batch",
            Step::Teardown => "teardown",
        }
    }
}

/// Replay `scenario` and collect the state after every step
pub async fn run_scenario(scenario: Scenario, config: MapConfig) -> Result<ScenarioReport> {
    let config = scenario.config.unwrap_or(config);
    let map = match scenario.viewport {
        Some(size) => RecordingMap::new(size),
        None => RecordingMap::default(),
    };
    let listener = RecordingListener::default();
    let session = MapSession::recording(config.clone(), &map, scenario.boundaries);
    let mut runtime = MapRuntime::new(
        session,
        Arc::new(scenario.geocoder),
        Box::new(listener.clone()),
    )
    .with_feedback(Box::new(map.clone()));

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.into_iter().enumerate() {
        let op = step.name();
        log::debug!("Step {}: {}", index, op);
        match step {
            Step::Initialize { center, zoom } => runtime.dispatch(vec![Msg::initialize(
                center.unwrap_or(config.default_view.center),
                zoom.unwrap_or(config.default_view.zoom),
            )]),
            Step::Layer { layer, entities } => {
                let mut msgs = vec![Msg::layer(layer)];
                msgs.extend(entities.map(|entities| Msg::entities(layer, entities)));
                runtime.dispatch(msgs);
            }
            Step::Entities { layer, entities } => {
                runtime.dispatch(vec![Msg::entities(layer, entities)])
            }
            Step::Select { selection } => runtime.dispatch(vec![Msg::select_admin(selection)]),
            Step::Search { text } => runtime.dispatch(vec![Msg::search(text)]),
            Step::SelectEntity { id } => runtime.dispatch(vec![match id {
                Some(id) => Msg::select_entity(id),
                None => Msg::clear_entity(),
            }]),
            Step::UserGesture { center, zoom } => {
                map.user_gesture(center, zoom);
                runtime.dispatch(Vec::new());
            }
            Step::ClickMarker { layer, id } => match map.marker_handle(layer, &id) {
                Some(handle) => runtime.dispatch(vec![Msg::marker_clicked(handle)]),
                None => log::warn!("Step {}: no {} marker for {}", index, layer.name(), id),
            },
            Step::Wait { ms } => {
                runtime
                    .pump_until(Instant::now() + Duration::from_millis(ms))
                    .await
            }
            Step::Batch { msgs } => runtime.dispatch(msgs),
            Step::Teardown => runtime.dispatch(vec![Msg::teardown()]),
        }
        steps.push(StepReport {
            index,
            op,
            state: runtime.session().snapshot(),
        });
    }

    let popup = map.popup().and_then(|handle| {
        runtime
            .session()
            .markers()
            .find_by_render_handle(handle)
            .map(|marker| marker.entity_id.clone())
    });
    Ok(ScenarioReport {
        steps,
        notifications: listener.notifications(),
        ops: map.ops(),
        popup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LayerMode;
    use std::io::Write;

    const SCENARIO: &str = r#"{
        "boundaries": {
            "wards": {
                "Phường A": {"rings": [[
                    {"lat": 21.03, "lng": 105.83}, {"lat": 21.04, "lng": 105.83},
                    {"lat": 21.04, "lng": 105.84}, {"lat": 21.03, "lng": 105.84}
                ]]}
            }
        },
        "geocoder": {
            "locations": {"Phường A": {"center": {"lat": 21.035, "lng": 105.835}}}
        },
        "steps": [
            {"op": "initialize"},
            {"op": "layer", "layer": "business", "entities": [
                {"id": "p1", "lat": 21.02, "lng": 105.84, "meta": {"title": "Phở Thìn"}},
                {"id": "p2", "lat": 21.04, "lng": 105.81},
                {"id": "p3", "lat": null, "lng": 105.86}
            ]},
            {"op": "select", "selection": {
                "province": "Hà Nội", "district": "Ba Đình", "ward": "Phường A"
            }},
            {"op": "wait", "ms": 1000},
            {"op": "select_entity", "id": "p2"},
            {"op": "click_marker", "layer": "business", "id": "p1"},
            {"op": "teardown"}
        ]
    }"#;

    #[tokio::test(start_paused = true)]
    async fn test_replay_reports_each_step() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let report = run_scenario(scenario, MapConfig::default()).await.unwrap();

        assert_eq!(report.steps.len(), 7);
        let layer = &report.steps[1].state;
        assert_eq!(layer.layer_mode, LayerMode::Business);
        assert_eq!(layer.business_markers, 2);
        assert_eq!(layer.invalid_entities, 1);

        let selected = &report.steps[2].state;
        assert!(selected.overlay.is_some());

        let waited = &report.steps[3].state;
        assert_eq!(waited.viewport.center, LatLng::new(21.035, 105.835));

        let picked = &report.steps[4].state;
        assert_eq!(picked.viewport.center, LatLng::new(21.04, 105.81));
        assert_eq!(picked.viewport.zoom, 17.0);

        assert!(report.steps[6].state.torn_down);
        assert!(report.notifications.contains(&Notification::MarkerClicked {
            entity_id: EntityId::from("p1")
        }));
        assert!(
            report
                .ops
                .iter()
                .any(|op| matches!(op, DrawOp::OpenPopup { .. }))
        );
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"steps\": 3}}").unwrap();
        let err = Scenario::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid scenario"));
    }
}
