//! Viewport controller
//!
//! The only owner of the camera. Other components ask for camera changes
//! through [`ViewportController::request_transition`].

use crate::domain::LatLng;
use crate::render::{Camera, CameraTarget, MoveOrigin};

use super::state::{ViewportEvent, ViewportInteractionState, ViewportOutcome};

/// Result of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// Carries the sequence number reported back by [`MoveEnd::settled`]
    Applied(u64),
    /// Dropped because the user holds the interaction lock
    Suppressed,
    /// Camera not initialized or already released
    Unavailable,
}

/// What a camera move-end means for the rest of the session
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveEnd {
    /// Programmatic transition that came to rest
    pub settled: Option<u64>,
    /// New zoom when the move changed it
    pub rescale: Option<f64>,
}

pub struct ViewportController {
    state: ViewportInteractionState,
    camera: Option<Box<dyn Camera>>,
}

impl ViewportController {
    pub fn new(camera: Box<dyn Camera>) -> Self {
        Self {
            state: ViewportInteractionState::default(),
            camera: Some(camera),
        }
    }

    pub fn state(&self) -> &ViewportInteractionState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.user_interaction_lock
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// One-time camera placement. Returns false (and does nothing) when the
    /// viewport was already initialized.
    pub fn initialize(&mut self, center: LatLng, zoom: f64) -> bool {
        match self.dispatch(ViewportEvent::Initialize { center, zoom }) {
            ViewportOutcome::Place { center, zoom } => {
                if let Some(camera) = self.camera.as_mut() {
                    camera.set_view(center, zoom);
                }
                log::info!(
                    "Viewport initialized at ({:.5}, {:.5}) zoom {}",
                    center.lat,
                    center.lng,
                    zoom
                );
                true
            }
            _ => {
                log::debug!("Viewport already initialized, ignoring initialize");
                false
            }
        }
    }

    /// Move the camera unless the user holds the lock. A forced request
    /// always runs and clears the lock.
    pub fn request_transition(&mut self, target: &CameraTarget, forced: bool) -> TransitionResult {
        match self.dispatch(ViewportEvent::Transition {
            target: *target,
            forced,
        }) {
            ViewportOutcome::Animate(target) => match self.camera.as_mut() {
                Some(camera) => {
                    camera.animate(&target);
                    TransitionResult::Applied(self.state.issued)
                }
                None => TransitionResult::Unavailable,
            },
            ViewportOutcome::Suppressed => {
                log::debug!("Camera transition suppressed by user interaction lock");
                TransitionResult::Suppressed
            }
            _ => TransitionResult::Unavailable,
        }
    }

    /// Camera move started. Only user gestures set the lock.
    pub fn record_user_interaction_start(&mut self, origin: MoveOrigin) {
        if self.dispatch(ViewportEvent::MoveStarted(origin)) == ViewportOutcome::Locked {
            log::debug!("User moved the camera, automatic transitions locked");
        }
    }

    /// Camera came to rest
    pub fn on_move_end(&mut self, center: LatLng, zoom: f64) -> MoveEnd {
        match self.dispatch(ViewportEvent::MoveEnded { center, zoom }) {
            ViewportOutcome::Moved { settled, rescale } => MoveEnd { settled, rescale },
            _ => MoveEnd::default(),
        }
    }

    /// Zoom level changed. Returns the rescale signal for the marker registry.
    pub fn on_zoom_changed(&mut self, zoom: f64) -> Option<f64> {
        match self.dispatch(ViewportEvent::ZoomChanged(zoom)) {
            ViewportOutcome::Rescale(zoom) => Some(zoom),
            _ => None,
        }
    }

    /// Release the camera. Every later call is a no-op.
    pub fn teardown(&mut self) {
        if self.dispatch(ViewportEvent::Teardown) == ViewportOutcome::Release {
            self.camera = None;
            log::info!("Viewport torn down");
        }
    }

    fn dispatch(&mut self, event: ViewportEvent) -> ViewportOutcome {
        let (next, outcome) = self.state.reduce(event);
        self.state = next;
        outcome
    }
}
