//! Message handlers for the map session
//!
//! Each function handles one message family. Handlers mutate the session
//! directly, queue effects, and propose camera intents; the session applies
//! at most one intent once the whole tick has been handled.

use crate::domain::{LayerMode, MapEntity, MarkerLayer};
use crate::policy::{CameraIntent, PopupRequest, Trigger};
use crate::render::{CameraEvent, MoveOrigin};

use super::effects::{Effect, Notification};
use super::engine::MapSession;
use super::messages::{AsyncMsg, LifecycleMsg, PointerMsg, SelectMsg};

/// Output collected while handling one tick
#[derive(Debug, Default)]
pub struct TickContext {
    pub effects: Vec<Effect>,
    pub intents: Vec<CameraIntent>,
}

impl TickContext {
    fn notify(&mut self, notification: Notification) {
        self.effects.push(Effect::Notify(notification));
    }

    fn propose(&mut self, intent: Option<CameraIntent>) {
        if let Some(intent) = intent {
            log::debug!("Camera intent from {:?}", intent.trigger);
            self.intents.push(intent);
        }
    }
}

pub fn handle_lifecycle(session: &mut MapSession, msg: LifecycleMsg, ctx: &mut TickContext) {
    match msg {
        LifecycleMsg::Initialize { center, zoom } => {
            if session.viewport.initialize(center, zoom) {
                session.markers.rescale(
                    session.surface.as_markers(),
                    zoom,
                    &session.config.marker_scale,
                );
                ctx.notify(Notification::ViewportReady);
            }
        }
        LifecycleMsg::Teardown => {
            if let Some(token) = session.policy.cancel_all() {
                ctx.effects.push(Effect::CancelDebounce { token });
            }
            let cleared = session.markers.clear_all(session.surface.as_markers());
            session.overlay.teardown(session.surface.as_overlay());
            session.viewport.teardown();
            session.selection.clear();
            session.data.clear();
            session.torn_down = true;
            log::info!("Map session torn down, removed {} markers", cleared);
        }
    }
}

pub fn handle_layer(session: &mut MapSession, layer: MarkerLayer, ctx: &mut TickContext) {
    let target = LayerMode::from(layer);
    let Some(switch) =
        session
            .layers
            .switch_to(&mut session.markers, session.surface.as_markers(), target)
    else {
        log::debug!("Layer {} already active", layer.name());
        return;
    };
    // Entities of the previous layer are gone; the popup target went with them
    session.data.clear();
    session.selection.pending_popup = None;
    ctx.notify(Notification::LayerRequested { layer });
    ctx.propose(session.policy.on_layer_mode(switch.current));
}

pub fn handle_entities(
    session: &mut MapSession,
    layer: MarkerLayer,
    entities: Vec<MapEntity>,
    ctx: &mut TickContext,
) {
    if !session.layers.accepts(layer) {
        log::debug!(
            "Refusing {} {} entities while layer mode is {:?}",
            entities.len(),
            layer.name(),
            session.layers.mode()
        );
        return;
    }

    let report = session
        .markers
        .reconcile(session.surface.as_markers(), layer, &entities);
    log::trace!("Reconciled {} markers: {:?}", layer.name(), report);
    session.data.set(layer, entities);
    ctx.propose(session.policy.on_entities_changed(&session.data.positions()));
}

pub fn handle_select(session: &mut MapSession, msg: SelectMsg, ctx: &mut TickContext) {
    match msg {
        SelectMsg::Admin(selection) => {
            if selection == session.selection.admin {
                return;
            }
            let previous_unit = session.selection.admin.most_specific();
            session.selection.admin = selection;

            let refit = session.overlay.apply_selection(
                session.surface.as_overlay(),
                &*session.boundaries,
                &session.selection.admin,
            );
            ctx.propose(refit.map(|target| CameraIntent::new(Trigger::BoundaryRefit, target)));

            let unit = session.selection.admin.most_specific();
            if unit == previous_unit {
                return;
            }
            let plan = session.policy.on_location_changed(unit);
            if let Some(token) = plan.cancel {
                ctx.effects.push(Effect::CancelDebounce { token });
            }
            if let Some(token) = plan.schedule {
                ctx.effects.push(Effect::ScheduleDebounce {
                    token,
                    delay: session.config.location_debounce(),
                });
            }
        }
        SelectMsg::Search(text) => {
            let matches = if text.trim().is_empty() {
                Vec::new()
            } else {
                session.data.positions()
            };
            ctx.propose(session.policy.on_search_changed(&text, &matches));
        }
        SelectMsg::Entity(id) => {
            session.selection.selected_entity = id.clone();
            let Some(id) = id else {
                session.selection.pending_popup = None;
                return;
            };
            let Some(layer) = session.layers.mode().layer() else {
                log::debug!("Entity {} selected with no active layer", id);
                return;
            };
            let Some(entity) = session.data.find(&id) else {
                log::warn!("Selected entity {} is not in the {} list", id, layer.name());
                return;
            };
            ctx.propose(session.policy.on_entity_selected(entity, layer));
        }
    }
}

pub fn handle_camera(session: &mut MapSession, event: CameraEvent, _ctx: &mut TickContext) {
    match event {
        CameraEvent::MoveStarted { origin } => {
            session.viewport.record_user_interaction_start(origin);
            if origin == MoveOrigin::User && session.selection.pending_popup.take().is_some() {
                log::debug!("User took the camera, dropping pending popup");
            }
        }
        CameraEvent::MoveEnded { center, zoom } => {
            let moved = session.viewport.on_move_end(center, zoom);
            if let Some(zoom) = moved.rescale {
                rescale(session, zoom);
            }
            if let Some(transition) = moved.settled {
                open_settled_popup(session, transition);
            }
        }
        CameraEvent::ZoomChanged { zoom } => {
            if let Some(zoom) = session.viewport.on_zoom_changed(zoom) {
                rescale(session, zoom);
            }
        }
    }
}

fn rescale(session: &mut MapSession, zoom: f64) {
    session
        .markers
        .rescale(session.surface.as_markers(), zoom, &session.config.marker_scale);
}

/// Open the pending popup once the jump it belongs to has settled. Earlier
/// transitions ending in the meantime leave it waiting.
fn open_settled_popup(session: &mut MapSession, transition: u64) {
    let Some(pending) = session.selection.pending_popup.take_if(|p| p.transition <= transition)
    else {
        return;
    };
    let PopupRequest { layer, entity_id } = pending.request;
    if session.selection.selected_entity.as_ref() != Some(&entity_id) {
        log::debug!("Selection moved away from {}, popup not opened", entity_id);
        return;
    }
    let selected = session
        .markers
        .selected_handle(layer, session.selection.selected_entity.as_ref())
        .map(|handle| handle.render_handle);
    match selected {
        Some(render_handle) => session.surface.as_markers().open_popup(render_handle),
        None => log::debug!("No marker for {}, popup not opened", entity_id),
    }
}

pub fn handle_pointer(session: &mut MapSession, msg: PointerMsg, ctx: &mut TickContext) {
    match msg {
        PointerMsg::MarkerClicked { handle } => {
            match session.markers.find_by_render_handle(handle) {
                Some(marker) => ctx.notify(Notification::MarkerClicked {
                    entity_id: marker.entity_id.clone(),
                }),
                None => log::debug!("Click on unknown marker {:?}", handle),
            }
        }
        PointerMsg::BoundaryClicked { unit, parent } => {
            ctx.notify(Notification::BoundaryClicked { unit, parent });
        }
    }
}

pub fn handle_async(session: &mut MapSession, msg: AsyncMsg, ctx: &mut TickContext) {
    match msg {
        AsyncMsg::DebounceElapsed { token } => {
            if let Some((token, unit)) = session.policy.on_debounce_elapsed(token) {
                ctx.effects.push(Effect::Geocode { token, unit });
            }
        }
        AsyncMsg::GeocodeResolved { token, result } => {
            let visible = session.data.positions();
            ctx.propose(session.policy.on_geocode_resolved(token, result, &visible));
        }
    }
}
