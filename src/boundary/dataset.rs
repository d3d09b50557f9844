//! Boundary polygon datasets

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Polygon;

/// Static ward/district geometry lookup by unit name
pub trait BoundaryDataset {
    /// Ward polygon, or None when the dataset has no entry for the ward
    fn ward_polygon(&self, name: &str) -> Option<&Polygon>;

    fn district_polygon(&self, name: &str) -> Option<&Polygon>;
}

/// In-memory dataset, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticBoundaries {
    #[serde(default)]
    pub wards: HashMap<String, Polygon>,
    #[serde(default)]
    pub districts: HashMap<String, Polygon>,
}

impl StaticBoundaries {
    pub fn with_ward(mut self, name: impl Into<String>, polygon: Polygon) -> Self {
        self.wards.insert(name.into(), polygon);
        self
    }

    pub fn with_district(mut self, name: impl Into<String>, polygon: Polygon) -> Self {
        self.districts.insert(name.into(), polygon);
        self
    }

    /// Load a dataset file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read boundary dataset: {}", path.display()))?;
        let dataset: StaticBoundaries = serde_json::from_str(&json)
            .with_context(|| format!("Invalid boundary dataset: {}", path.display()))?;
        log::info!(
            "Loaded {} ward and {} district boundaries",
            dataset.wards.len(),
            dataset.districts.len()
        );
        Ok(dataset)
    }
}

impl BoundaryDataset for StaticBoundaries {
    fn ward_polygon(&self, name: &str) -> Option<&Polygon> {
        self.wards.get(name).filter(|polygon| !polygon.is_empty())
    }

    fn district_polygon(&self, name: &str) -> Option<&Polygon> {
        self.districts.get(name).filter(|polygon| !polygon.is_empty())
    }
}
