//! Event loop around a [`MapSession`]
//!
//! Executes the effects a tick produces: debounce timers and geocode
//! lookups run as tokio tasks and report back through the control channel,
//! notifications go to the listener, and buffered camera callbacks from the
//! renderer are fed back as further ticks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::render::CameraFeedback;
use crate::session::{Effect, MapSession, Msg};

use super::control::{ControlCommand, MapHandle};
use super::geocode::GeocodeResolver;
use super::listener::{self, MapListener};

pub struct MapRuntime {
    session: MapSession,
    resolver: Arc<dyn GeocodeResolver>,
    listener: Box<dyn MapListener>,
    feedback: Option<Box<dyn CameraFeedback>>,
    tx: mpsc::UnboundedSender<ControlCommand>,
    rx: mpsc::UnboundedReceiver<ControlCommand>,
    timers: HashMap<u64, JoinHandle<()>>,
    lookup: Option<JoinHandle<()>>,
    stopped: bool,
}

impl MapRuntime {
    pub fn new(
        session: MapSession,
        resolver: Arc<dyn GeocodeResolver>,
        listener: Box<dyn MapListener>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            resolver,
            listener,
            feedback: None,
            tx,
            rx,
            timers: HashMap::new(),
            lookup: None,
            stopped: false,
        }
    }

    /// Pull camera callbacks from the renderer after every tick
    pub fn with_feedback(mut self, feedback: Box<dyn CameraFeedback>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn handle(&self) -> MapHandle {
        MapHandle::new(self.tx.clone())
    }

    pub fn session(&self) -> &MapSession {
        &self.session
    }

    /// Debounce timers still alive
    pub fn pending_timers(&self) -> usize {
        self.timers
            .values()
            .filter(|timer| !timer.is_finished())
            .count()
    }

    /// Run one tick, execute its effects and feed camera callbacks back
    /// until the renderer is quiet.
    pub fn dispatch(&mut self, msgs: Vec<Msg>) {
        let mut batch = msgs;
        loop {
            let effects = self.session.tick(batch);
            for effect in effects {
                self.execute(effect);
            }
            if self.session.is_torn_down() {
                self.abort_all();
                return;
            }
            let Some(feedback) = self.feedback.as_mut() else {
                return;
            };
            let events = feedback.take_camera_events();
            if events.is_empty() {
                return;
            }
            batch = events.into_iter().map(Msg::camera).collect();
        }
    }

    /// Wait for the next command. Returns false once the loop should stop.
    pub async fn next(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        match self.rx.recv().await {
            Some(command) => self.apply(command),
            None => false,
        }
    }

    /// Process commands until shutdown or teardown
    pub async fn run(mut self) {
        while self.next().await {}
        log::info!("Map runtime stopped");
    }

    /// Process commands until `deadline`
    pub async fn pump_until(&mut self, deadline: Instant) {
        while !self.stopped {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(command)) => {
                    self.apply(command);
                }
                Ok(None) | Err(_) => break,
            }
        }
    }

    fn apply(&mut self, command: ControlCommand) -> bool {
        match command {
            ControlCommand::Tick(msgs) => self.dispatch(msgs),
            ControlCommand::Shutdown => self.dispatch(vec![Msg::teardown()]),
        }
        if self.session.is_torn_down() {
            self.stopped = true;
        }
        !self.stopped
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleDebounce { token, delay } => {
                let tx = self.tx.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(ControlCommand::Tick(vec![Msg::debounce_elapsed(token)]));
                });
                self.timers.retain(|_, timer| !timer.is_finished());
                if let Some(previous) = self.timers.insert(token, timer) {
                    previous.abort();
                }
            }
            Effect::CancelDebounce { token } => {
                if let Some(timer) = self.timers.remove(&token) {
                    timer.abort();
                    log::debug!("Cancelled location debounce #{}", token);
                }
            }
            Effect::Geocode { token, unit } => {
                // A newer lookup makes the in-flight one irrelevant
                if let Some(previous) = self.lookup.take() {
                    previous.abort();
                }
                let tx = self.tx.clone();
                let request = self.resolver.resolve(&unit);
                self.lookup = Some(tokio::spawn(async move {
                    let result = match request.await {
                        Ok(result) => result,
                        Err(err) => {
                            log::warn!("Geocoding {} failed: {:?}", unit.name, err);
                            None
                        }
                    };
                    let _ = tx.send(ControlCommand::Tick(vec![Msg::geocode_resolved(
                        token, result,
                    )]));
                }));
            }
            Effect::Notify(notification) => {
                listener::deliver(&mut *self.listener, &notification);
            }
        }
    }

    fn abort_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        if let Some(lookup) = self.lookup.take() {
            lookup.abort();
        }
    }
}

impl Drop for MapRuntime {
    fn drop(&mut self) {
        self.abort_all();
    }
}
