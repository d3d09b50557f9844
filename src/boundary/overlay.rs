//! Boundary overlay manager
//!
//! Renders at most one highlighted administrative polygon:
//! - ward selected and its polygon known: ward polygon, capped refit
//! - ward selected but polygon missing: parent district polygon instead
//! - only district selected: district polygon
//! - otherwise nothing
//!
//! A refit is requested only when the selected ward or district actually
//! changed since the previous render. Province-only changes never refit.

use crate::domain::{AdminSelection, BoundaryKind, BoundaryOverlay};
use crate::render::geometry::OverlayStyle;
use crate::render::{CameraTarget, OverlaySurface, RenderHandle};

use super::dataset::BoundaryDataset;

#[derive(Debug)]
pub struct BoundaryOverlayManager {
    active: Option<(BoundaryOverlay, RenderHandle)>,
    prev_ward: Option<String>,
    prev_district: Option<String>,
    style: OverlayStyle,
    padding_px: f64,
    ward_max_zoom: f64,
}

impl BoundaryOverlayManager {
    pub fn new(style: OverlayStyle, padding_px: f64, ward_max_zoom: f64) -> Self {
        // The highlight must never swallow clicks meant for markers
        let style = OverlayStyle {
            interactive: false,
            ..style
        };
        Self {
            active: None,
            prev_ward: None,
            prev_district: None,
            style,
            padding_px,
            ward_max_zoom,
        }
    }

    pub fn active(&self) -> Option<&BoundaryOverlay> {
        self.active.as_ref().map(|(overlay, _)| overlay)
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Re-render for a new selection. Returns the fit target when the
    /// effective unit changed and an overlay is shown.
    pub fn apply_selection(
        &mut self,
        surface: &mut dyn OverlaySurface,
        dataset: &dyn BoundaryDataset,
        selection: &AdminSelection,
    ) -> Option<CameraTarget> {
        let overlay = resolve_overlay(dataset, selection);

        if let Some((_, handle)) = self.active.take() {
            surface.remove_overlay(handle);
        }

        let changed =
            selection.ward != self.prev_ward || selection.district != self.prev_district;
        self.prev_ward = selection.ward.clone();
        self.prev_district = selection.district.clone();

        let overlay = overlay?;
        let handle = surface.show_overlay(&overlay, &self.style);
        log::debug!(
            "Boundary overlay: {:?} {} (ward selected: {})",
            overlay.kind,
            overlay.name,
            selection.ward.is_some()
        );

        let target = changed.then(|| CameraTarget::FitBounds {
            bounds: overlay.bounds,
            padding_px: self.padding_px,
            // Ward selections (including the district fallback) zoom no closer than the cap
            max_zoom: selection.ward.is_some().then_some(self.ward_max_zoom),
        });
        self.active = Some((overlay, handle));
        target
    }

    /// Remove the overlay and forget the previous selection
    pub fn teardown(&mut self, surface: &mut dyn OverlaySurface) {
        if let Some((_, handle)) = self.active.take() {
            surface.remove_overlay(handle);
        }
        self.prev_ward = None;
        self.prev_district = None;
    }
}

fn resolve_overlay(
    dataset: &dyn BoundaryDataset,
    selection: &AdminSelection,
) -> Option<BoundaryOverlay> {
    if let Some(ward) = &selection.ward {
        if let Some(polygon) = dataset.ward_polygon(ward) {
            return BoundaryOverlay::new(BoundaryKind::Ward, ward.clone(), polygon.clone());
        }
        log::debug!("No polygon for ward {}, falling back to its district", ward);
    }
    let district = selection.district.as_ref()?;
    let Some(polygon) = dataset.district_polygon(district) else {
        log::warn!("No polygon for district {}", district);
        return None;
    };
    BoundaryOverlay::new(BoundaryKind::District, district.clone(), polygon.clone())
}
