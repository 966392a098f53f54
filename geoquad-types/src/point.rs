use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
///
/// Stored latitude-first, unlike `geo::Point` which is x (longitude) first.
/// Use the `From` conversions to move between the two.
///
/// # Examples
///
/// ```
/// use geoquad_types::point::GeoPoint;
/// use geo::Point;
///
/// let berlin = GeoPoint::new(52.52, 13.405);
/// let point: Point = berlin.into();
/// assert_eq!(point.x(), 13.405);
/// assert_eq!(point.y(), 52.52);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::new(point.lon, point.lat)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A coordinate paired with the value stored at it.
///
/// Index queries return these. The coordinate is the one reconstructed from
/// the stored spatial key, so it is close to, but not always bit-identical
/// with, the coordinate originally inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntry<V> {
    pub point: GeoPoint,
    pub value: V,
}

impl<V> GeoEntry<V> {
    pub fn new(lat: f64, lon: f64, value: V) -> Self {
        Self {
            point: GeoPoint::new(lat, lon),
            value,
        }
    }

    pub fn lat(&self) -> f64 {
        self.point.lat
    }

    pub fn lon(&self) -> f64 {
        self.point.lon
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }
}
