//! Selection and layer-mode types

use serde::{Deserialize, Serialize};

use super::geometry::{LatLng, LatLngBounds};

/// Administrative hierarchy level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Province,
    District,
    Ward,
}

/// A single administrative unit, named together with its parent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminUnit {
    pub level: AdminLevel,
    pub name: String,
    pub parent: Option<String>,
}

/// Province > district > ward selection as chosen by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSelection {
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
}

impl AdminSelection {
    pub fn province(name: impl Into<String>) -> Self {
        Self {
            province: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_district(mut self, name: impl Into<String>) -> Self {
        self.district = Some(name.into());
        self
    }

    pub fn with_ward(mut self, name: impl Into<String>) -> Self {
        self.ward = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.province.is_none() && self.district.is_none() && self.ward.is_none()
    }

    /// The deepest selected unit (ward > district > province)
    pub fn most_specific(&self) -> Option<AdminUnit> {
        if let Some(ward) = &self.ward {
            return Some(AdminUnit {
                level: AdminLevel::Ward,
                name: ward.clone(),
                parent: self.district.clone(),
            });
        }
        if let Some(district) = &self.district {
            return Some(AdminUnit {
                level: AdminLevel::District,
                name: district.clone(),
                parent: self.province.clone(),
            });
        }
        self.province.as_ref().map(|province| AdminUnit {
            level: AdminLevel::Province,
            name: province.clone(),
            parent: None,
        })
    }
}

/// Geocoding resolver answer for an administrative unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub center: LatLng,
    #[serde(default)]
    pub bounds: Option<LatLngBounds>,
}

/// A marker layer that can hold handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerLayer {
    Business,
    Department,
}

impl MarkerLayer {
    /// The mutually-exclusive counterpart
    pub fn other(self) -> Self {
        match self {
            MarkerLayer::Business => MarkerLayer::Department,
            MarkerLayer::Department => MarkerLayer::Business,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MarkerLayer::Business => "business",
            MarkerLayer::Department => "department",
        }
    }
}

/// Which marker category is currently rendered
///
/// `None` is the initial state and the transient state during a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMode {
    #[default]
    None,
    Business,
    Department,
}

impl LayerMode {
    pub fn layer(self) -> Option<MarkerLayer> {
        match self {
            LayerMode::None => None,
            LayerMode::Business => Some(MarkerLayer::Business),
            LayerMode::Department => Some(MarkerLayer::Department),
        }
    }
}

impl From<MarkerLayer> for LayerMode {
    fn from(layer: MarkerLayer) -> Self {
        match layer {
            MarkerLayer::Business => LayerMode::Business,
            MarkerLayer::Department => LayerMode::Department,
        }
    }
}
