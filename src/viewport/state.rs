//! Viewport interaction state and reducer
//!
//! Every lock decision goes through [`ViewportInteractionState::reduce`]:
//! a user gesture sets the lock, a non-forced transition is dropped while
//! locked, and a forced transition always runs and clears the lock.

use serde::Serialize;

use crate::domain::LatLng;
use crate::render::{CameraTarget, MoveOrigin};

/// Lifecycle of the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPhase {
    #[default]
    Uninitialized,
    /// Resting, no programmatic move pending
    Idle,
    /// A programmatic transition was issued and has not settled yet
    Animating,
    TornDown,
}

/// Camera center/zoom plus the user interaction lock
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewportInteractionState {
    pub center: LatLng,
    pub zoom: f64,
    /// Set when the user has moved the camera since the last programmatic move
    pub user_interaction_lock: bool,
    pub phase: CameraPhase,
    /// Programmatic transitions issued so far
    pub issued: u64,
    /// Programmatic transitions that came to rest or were taken over by the user
    pub settled: u64,
}

/// Inputs to the reducer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Initialize { center: LatLng, zoom: f64 },
    Transition { target: CameraTarget, forced: bool },
    MoveStarted(MoveOrigin),
    MoveEnded { center: LatLng, zoom: f64 },
    ZoomChanged(f64),
    Teardown,
}

/// What the controller must do after a reduction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportOutcome {
    /// Place the camera without animation
    Place { center: LatLng, zoom: f64 },
    /// Animate the camera to the target
    Animate(CameraTarget),
    /// Transition refused because the user holds the lock
    Suppressed,
    /// User gesture recorded
    Locked,
    /// Camera came to rest. `settled` is the sequence number of the
    /// programmatic transition that ended, `rescale` the new zoom when it
    /// changed with the move.
    Moved {
        settled: Option<u64>,
        rescale: Option<f64>,
    },
    /// Zoom changed, markers need resizing
    Rescale(f64),
    /// Nothing to do
    Ignored,
    /// Release the camera
    Release,
}

impl ViewportInteractionState {
    pub fn is_initialized(&self) -> bool {
        matches!(self.phase, CameraPhase::Idle | CameraPhase::Animating)
    }

    /// Apply one event, returning the next state and the required action
    pub fn reduce(self, event: ViewportEvent) -> (Self, ViewportOutcome) {
        use ViewportEvent as E;
        use ViewportOutcome as O;

        if self.phase == CameraPhase::TornDown {
            return (self, O::Ignored);
        }

        match event {
            E::Initialize { center, zoom } => {
                if self.phase != CameraPhase::Uninitialized {
                    return (self, O::Ignored);
                }
                let next = Self {
                    center,
                    zoom,
                    phase: CameraPhase::Idle,
                    ..Self::default()
                };
                (next, O::Place { center, zoom })
            }
            E::Teardown => (
                Self {
                    phase: CameraPhase::TornDown,
                    ..self
                },
                O::Release,
            ),
            _ if self.phase == CameraPhase::Uninitialized => (self, O::Ignored),
            E::Transition { target, forced } => {
                if self.user_interaction_lock && !forced {
                    return (self, O::Suppressed);
                }
                let next = Self {
                    user_interaction_lock: if forced {
                        false
                    } else {
                        self.user_interaction_lock
                    },
                    phase: CameraPhase::Animating,
                    issued: self.issued + 1,
                    ..self
                };
                (next, O::Animate(target))
            }
            E::MoveStarted(MoveOrigin::User) => (
                Self {
                    user_interaction_lock: true,
                    phase: CameraPhase::Idle,
                    settled: self.issued,
                    ..self
                },
                O::Locked,
            ),
            E::MoveStarted(MoveOrigin::Programmatic) => (self, O::Ignored),
            E::MoveEnded { center, zoom } => {
                let settled = (self.phase == CameraPhase::Animating).then_some(self.settled + 1);
                let rescale = (zoom != self.zoom).then_some(zoom);
                let count = settled.unwrap_or(self.settled);
                let next = Self {
                    center,
                    zoom,
                    phase: if count < self.issued {
                        CameraPhase::Animating
                    } else {
                        CameraPhase::Idle
                    },
                    settled: count,
                    ..self
                };
                if settled.is_none() && rescale.is_none() {
                    return (next, O::Ignored);
                }
                (next, O::Moved { settled, rescale })
            }
            E::ZoomChanged(zoom) => {
                if zoom == self.zoom {
                    return (self, O::Ignored);
                }
                (Self { zoom, ..self }, O::Rescale(zoom))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> ViewportInteractionState {
        let (state, _) = ViewportInteractionState::default().reduce(ViewportEvent::Initialize {
            center: LatLng::new(21.0, 105.8),
            zoom: 12.0,
        });
        state
    }

    fn target() -> CameraTarget {
        CameraTarget::FlyTo {
            center: LatLng::new(10.0, 106.0),
            zoom: 15.0,
        }
    }

    #[test]
    fn test_initialize_once() {
        let state = ready();
        assert_eq!(state.phase, CameraPhase::Idle);
        let (again, outcome) = state.reduce(ViewportEvent::Initialize {
            center: LatLng::new(0.0, 0.0),
            zoom: 3.0,
        });
        assert_eq!(outcome, ViewportOutcome::Ignored);
        assert_eq!(again, state);
    }

    #[test]
    fn test_lock_blocks_non_forced_transition() {
        let (locked, outcome) = ready().reduce(ViewportEvent::MoveStarted(MoveOrigin::User));
        assert_eq!(outcome, ViewportOutcome::Locked);
        assert!(locked.user_interaction_lock);

        let (after, outcome) = locked.reduce(ViewportEvent::Transition {
            target: target(),
            forced: false,
        });
        assert_eq!(outcome, ViewportOutcome::Suppressed);
        assert_eq!(after, locked);
    }

    #[test]
    fn test_forced_transition_clears_lock() {
        let (locked, _) = ready().reduce(ViewportEvent::MoveStarted(MoveOrigin::User));
        let (after, outcome) = locked.reduce(ViewportEvent::Transition {
            target: target(),
            forced: true,
        });
        assert_eq!(outcome, ViewportOutcome::Animate(target()));
        assert!(!after.user_interaction_lock);
        assert_eq!(after.phase, CameraPhase::Animating);
    }

    #[test]
    fn test_programmatic_move_does_not_lock() {
        let (animating, _) = ready().reduce(ViewportEvent::Transition {
            target: target(),
            forced: false,
        });
        let (state, outcome) =
            animating.reduce(ViewportEvent::MoveStarted(MoveOrigin::Programmatic));
        assert_eq!(outcome, ViewportOutcome::Ignored);
        assert!(!state.user_interaction_lock);

        let (state, outcome) = state.reduce(ViewportEvent::MoveEnded {
            center: LatLng::new(10.0, 106.0),
            zoom: 15.0,
        });
        assert_eq!(
            outcome,
            ViewportOutcome::Moved {
                settled: Some(1),
                rescale: Some(15.0)
            }
        );
        assert_eq!(state.phase, CameraPhase::Idle);
        assert_eq!(state.zoom, 15.0);
    }

    #[test]
    fn test_overlapping_transitions_settle_in_order() {
        let (first, _) = ready().reduce(ViewportEvent::Transition {
            target: target(),
            forced: false,
        });
        let (second, _) = first.reduce(ViewportEvent::Transition {
            target: target(),
            forced: true,
        });
        assert_eq!(second.issued, 2);

        let (state, outcome) = second.reduce(ViewportEvent::MoveEnded {
            center: LatLng::new(10.0, 106.0),
            zoom: 12.0,
        });
        assert_eq!(
            outcome,
            ViewportOutcome::Moved {
                settled: Some(1),
                rescale: None
            }
        );
        assert_eq!(state.phase, CameraPhase::Animating);

        let (state, outcome) = state.reduce(ViewportEvent::MoveEnded {
            center: LatLng::new(10.0, 106.0),
            zoom: 15.0,
        });
        assert_eq!(
            outcome,
            ViewportOutcome::Moved {
                settled: Some(2),
                rescale: Some(15.0)
            }
        );
        assert_eq!(state.phase, CameraPhase::Idle);
    }

    #[test]
    fn test_zoom_reported_with_move_end_rescales() {
        let (state, _) = ready().reduce(ViewportEvent::MoveStarted(MoveOrigin::User));
        let (state, outcome) = state.reduce(ViewportEvent::MoveEnded {
            center: LatLng::new(21.0, 105.8),
            zoom: 16.0,
        });
        assert_eq!(
            outcome,
            ViewportOutcome::Moved {
                settled: None,
                rescale: Some(16.0)
            }
        );
        let (_, outcome) = state.reduce(ViewportEvent::ZoomChanged(16.0));
        assert_eq!(outcome, ViewportOutcome::Ignored);
    }

    #[test]
    fn test_teardown_is_terminal() {
        let (gone, outcome) = ready().reduce(ViewportEvent::Teardown);
        assert_eq!(outcome, ViewportOutcome::Release);
        let (still, outcome) = gone.reduce(ViewportEvent::Transition {
            target: target(),
            forced: true,
        });
        assert_eq!(outcome, ViewportOutcome::Ignored);
        assert_eq!(still.phase, CameraPhase::TornDown);
    }

    #[test]
    fn test_uninitialized_ignores_transitions() {
        let transition = ViewportEvent::Transition {
            target: target(),
            forced: true,
        };
        let (state, outcome) = ViewportInteractionState::default().reduce(transition);
        assert_eq!(outcome, ViewportOutcome::Ignored);
        assert_eq!(state.phase, CameraPhase::Uninitialized);
    }
}
