//! Geographic types for markers, overlays and camera targets

use serde::{Deserialize, Serialize};

/// Web Mercator latitude limit
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Tile size in pixels at zoom 0
const TILE_SIZE: f64 = 256.0;

/// A geographic coordinate in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Project onto the Web Mercator plane at zoom 0 (pixels)
    pub fn project(&self) -> (f64, f64) {
        let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (self.lng + 180.0) / 360.0 * TILE_SIZE;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * TILE_SIZE;
        (x, y)
    }
}

/// Axis-aligned geographic bounds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Create bounds from two corners in any order
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Degenerate bounds around a single point
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Smallest bounds covering every point, or None for an empty input
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn is_finite(&self) -> bool {
        self.south_west.is_finite() && self.north_east.is_finite()
    }

    /// Grow the bounds to include a point
    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

/// Administrative boundary polygon. The first ring is the outer ring.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Vec<LatLng>>,
}

impl Polygon {
    pub fn new(outer: Vec<LatLng>) -> Self {
        Self { rings: vec![outer] }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(|ring| ring.is_empty())
    }

    /// Bounds of every vertex in every ring
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.rings.iter().flatten().copied())
    }
}

/// Arithmetic mean of the given points
pub fn centroid(points: &[LatLng]) -> Option<LatLng> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(LatLng::new(lat / n, lng / n))
}

/// Highest integer zoom at which `bounds` fits inside a viewport of
/// `size` pixels with `padding` on every side, clamped to `[min_zoom, max_zoom]`
pub fn fit_zoom(
    bounds: &LatLngBounds,
    size: (f64, f64),
    padding: f64,
    min_zoom: f64,
    max_zoom: f64,
) -> f64 {
    let (x0, y0) = LatLng::new(bounds.north_east.lat, bounds.south_west.lng).project();
    let (x1, y1) = LatLng::new(bounds.south_west.lat, bounds.north_east.lng).project();
    let width = (x1 - x0).abs();
    let height = (y1 - y0).abs();

    let avail_w = (size.0 - 2.0 * padding).max(1.0);
    let avail_h = (size.1 - 2.0 * padding).max(1.0);

    let zoom_w = if width > 0.0 {
        (avail_w / width).log2()
    } else {
        f64::INFINITY
    };
    let zoom_h = if height > 0.0 {
        (avail_h / height).log2()
    } else {
        f64::INFINITY
    };

    let zoom = zoom_w.min(zoom_h);
    if zoom.is_finite() {
        zoom.floor().clamp(min_zoom, max_zoom)
    } else {
        max_zoom
    }
}
