//! Map entities (points of interest) supplied by the upstream list/filter logic

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::LatLng;

/// Upstream identifier of an entity
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    #[default]
    Business,
    Department,
    Officer,
    #[serde(other)]
    Other,
}

/// Presentation data carried through to the renderer untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A point of interest with possibly missing coordinates
///
/// Immutable for the duration of a render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    pub id: EntityId,
    #[serde(default)]
    pub category: EntityCategory,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub meta: DisplayMeta,
}

impl MapEntity {
    pub fn new(id: impl Into<EntityId>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            category: EntityCategory::default(),
            lat: Some(lat),
            lng: Some(lng),
            meta: DisplayMeta::default(),
        }
    }

    pub fn with_category(mut self, category: EntityCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = title.into();
        self
    }

    /// Position when both coordinates are present and finite.
    ///
    /// `(0, 0)` is a valid coordinate, not a missing-value sentinel.
    pub fn position(&self) -> Option<LatLng> {
        let point = LatLng::new(self.lat?, self.lng?);
        point.is_finite().then_some(point)
    }

    pub fn has_valid_position(&self) -> bool {
        self.position().is_some()
    }
}

/// Positions of every entity with valid coordinates
pub fn valid_positions(entities: &[MapEntity]) -> Vec<LatLng> {
    entities.iter().filter_map(MapEntity::position).collect()
}
