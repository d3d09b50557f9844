//! Geocoding resolver interface and a fixture-backed implementation

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::anyhow;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{AdminUnit, ResolvedLocation};

/// Pending answer of a resolver. `Ok(None)` when the unit is unknown.
pub type GeocodeFuture = BoxFuture<'static, anyhow::Result<Option<ResolvedLocation>>>;

/// External service resolving an administrative unit to a map location
pub trait GeocodeResolver: Send + Sync {
    fn resolve(&self, unit: &AdminUnit) -> GeocodeFuture;
}

/// Resolver answering from a fixed table, keyed by unit name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticGeocoder {
    #[serde(default)]
    pub locations: HashMap<String, ResolvedLocation>,
    /// Units whose lookup fails with an error
    #[serde(default)]
    pub failing: HashSet<String>,
    /// Per-unit response delay
    #[serde(default)]
    pub latency_ms: HashMap<String, u64>,
    #[serde(default)]
    pub default_latency_ms: u64,
}

impl StaticGeocoder {
    pub fn with_location(mut self, name: impl Into<String>, location: ResolvedLocation) -> Self {
        self.locations.insert(name.into(), location);
        self
    }

    pub fn with_failure(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    pub fn with_latency(mut self, name: impl Into<String>, latency: Duration) -> Self {
        self.latency_ms
            .insert(name.into(), latency.as_millis() as u64);
        self
    }

    fn latency(&self, name: &str) -> Duration {
        Duration::from_millis(
            self.latency_ms
                .get(name)
                .copied()
                .unwrap_or(self.default_latency_ms),
        )
    }
}

impl GeocodeResolver for StaticGeocoder {
    fn resolve(&self, unit: &AdminUnit) -> GeocodeFuture {
        let delay = self.latency(&unit.name);
        let result = if self.failing.contains(&unit.name) {
            Err(anyhow!("Geocoder unavailable for {}", unit.name))
        } else {
            Ok(self.locations.get(&unit.name).copied())
        };
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
        .boxed()
    }
}
