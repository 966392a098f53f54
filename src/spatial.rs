//! Distance calculation and circular query shapes.
//!
//! The index itself never measures distances: it only asks a [`Shape`]
//! whether a rectangle or a decoded coordinate is inside. This module supplies
//! the distance calculators (backed by the `geo` crate) and the [`Circle`]
//! shape built from them.

use geo::{Distance, Geodesic, Haversine, Point, Rhumb};
use geoquad_types::bbox::{BBox, Shape};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters (GRS80), the radius `geo`'s Haversine uses.
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.8;

/// Earth circumference along a meridian, in meters.
pub const EARTH_CIRCUMFERENCE: f64 = 2.0 * std::f64::consts::PI * EARTH_MEAN_RADIUS;

const METERS_PER_DEGREE: f64 = EARTH_CIRCUMFERENCE / 360.0;

/// Headroom for metrics that measure shorter than the mean sphere; the
/// ellipsoid is up to ~0.6% shorter along meridians near the equator.
const REACH_MARGIN: f64 = 1.01;

/// Measures distances between coordinates, in meters.
pub trait DistanceCalc {
    /// Distance between two coordinates in meters.
    fn calc_dist(&self, from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> f64;

    /// Rectangle enclosing the circle of `radius` meters around a coordinate.
    ///
    /// The rectangle never leaves ±90° latitude and ±180° longitude. A circle
    /// that reaches a pole or crosses the antimeridian gets the full
    /// longitude range.
    fn create_bbox(&self, lat: f64, lon: f64, radius: f64) -> BBox {
        if lat.abs() > 90.0 {
            return BBox::create_earth_max();
        }

        let (d_lat, d_lon) = reach(lat, radius);
        let min_lat = (lat - d_lat).max(-90.0);
        let max_lat = (lat + d_lat).min(90.0);
        match d_lon {
            Some(d_lon) if lon - d_lon >= -180.0 && lon + d_lon <= 180.0 => {
                BBox::new(lon - d_lon, min_lat, lon + d_lon, max_lat)
            }
            _ => BBox::new(-180.0, min_lat, 180.0, max_lat),
        }
    }
}

/// Latitude and longitude half-extents in degrees of a circle of `radius`
/// meters centered at `lat`.
///
/// The longitude extent is `None` when the circle reaches a pole, since it
/// then spans every meridian. Otherwise it is taken at the poleward edge of
/// the latitude band, where meridians are closest together.
fn reach(lat: f64, radius: f64) -> (f64, Option<f64>) {
    let d_lat = radius * REACH_MARGIN / METERS_PER_DEGREE;
    let edge = lat.abs() + d_lat;
    if edge >= 90.0 {
        return (d_lat, None);
    }
    let d_lon = d_lat / edge.to_radians().cos();
    (d_lat, (d_lon < 180.0).then_some(d_lon))
}

/// Smallest longitude difference in degrees between `lon` and any meridian
/// of `rect`, across the antimeridian too. 0 when `lon` lies inside.
fn lon_gap(lon: f64, rect: &BBox) -> f64 {
    let width = rect.width();
    if width >= 360.0 {
        return 0.0;
    }
    let start = (rect.min_lon - lon).rem_euclid(360.0);
    if start + width >= 360.0 {
        0.0
    } else {
        start.min(360.0 - start - width)
    }
}

/// Distance metrics for spatial calculations.
///
/// - **Haversine**: spherical distance, good for most lon/lat calculations
/// - **Geodesic**: ellipsoidal distance (Karney 2013), slower
/// - **Rhumb**: constant bearing distance
/// - **PlaneProjection**: equirectangular approximation, fastest, only
///   accurate for short distances away from the poles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Geodesic,
    Rhumb,
    PlaneProjection,
}

impl DistanceCalc for DistanceMetric {
    fn calc_dist(&self, from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> f64 {
        let from = Point::new(from_lon, from_lat);
        let to = Point::new(to_lon, to_lat);
        match self {
            DistanceMetric::Haversine => Haversine.distance(from, to),
            DistanceMetric::Geodesic => Geodesic.distance(from, to),
            DistanceMetric::Rhumb => Rhumb.distance(from, to),
            DistanceMetric::PlaneProjection => {
                let d_lat = (to_lat - from_lat).to_radians();
                let d_lon = (to_lon - from_lon).to_radians();
                let shrink = ((from_lat + to_lat) / 2.0).to_radians().cos();
                let x = d_lon * shrink;
                EARTH_MEAN_RADIUS * (d_lat * d_lat + x * x).sqrt()
            }
        }
    }
}

/// A circle of `radius` meters around a center coordinate.
///
/// # Examples
///
/// ```rust
/// use geoquad::spatial::{Circle, DistanceMetric};
/// use geoquad_types::bbox::{BBox, Shape};
///
/// let circle = Circle::new(52.52, 13.405, 1000.0, DistanceMetric::Haversine);
/// assert!(circle.contains(52.521, 13.405));
/// assert!(!circle.contains(52.6, 13.405));
/// assert!(circle.intersects(&BBox::new(13.0, 52.0, 14.0, 53.0)));
/// ```
#[derive(Debug, Clone)]
pub struct Circle<C = DistanceMetric> {
    lat: f64,
    lon: f64,
    radius: f64,
    calc: C,
    bbox: BBox,
    d_lon: Option<f64>,
}

impl<C: DistanceCalc> Circle<C> {
    pub fn new(lat: f64, lon: f64, radius: f64, calc: C) -> Self {
        let bbox = calc.create_bbox(lat, lon, radius);
        let d_lon = if lat.abs() > 90.0 {
            None
        } else {
            reach(lat, radius).1
        };
        Self {
            lat,
            lon,
            radius,
            calc,
            bbox,
            d_lon,
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn reaches(&self, lat: f64, lon: f64) -> bool {
        self.calc.calc_dist(self.lat, self.lon, lat, lon) <= self.radius
    }
}

impl<C: DistanceCalc> Shape for Circle<C> {
    /// Conservative: may accept a rectangle the circle misses, never the
    /// other way round.
    fn intersects(&self, b: &BBox) -> bool {
        if !self.bbox.intersects(b) {
            return false;
        }
        let Some(d_lon) = self.d_lon else {
            // every meridian is in reach
            return true;
        };

        let gap = lon_gap(self.lon, b);
        if gap > d_lon {
            return false;
        }
        if gap == 0.0 || gap >= 90.0 {
            return true;
        }

        // Nearest point of the rectangle on the sphere: on its closest
        // meridian, at the foot of the perpendicular from the center,
        // clamped into the latitude range.
        let foot = (self.lat.to_radians().tan() / gap.to_radians().cos())
            .atan()
            .to_degrees();
        let nearest_lat = foot.max(b.min_lat).min(b.max_lat);
        let lower_bound = Haversine.distance(
            Point::new(self.lon, self.lat),
            Point::new(self.lon + gap, nearest_lat),
        );
        lower_bound <= self.radius * REACH_MARGIN
    }

    fn contains(&self, lat: f64, lon: f64) -> bool {
        self.reaches(lat, lon)
    }

    fn bounds(&self) -> BBox {
        self.bbox
    }
}
