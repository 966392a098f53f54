use crate::point::GeoPoint;
use serde::{Deserialize, Serialize};

/// A region that can be tested against rectangles and points.
///
/// Index traversals use `intersects` to decide whether a subtree can hold
/// matches and `contains` to decide whether a single entry is one.
pub trait Shape {
    /// Check if this shape overlaps the given rectangle.
    fn intersects(&self, rect: &BBox) -> bool;

    /// Check if the coordinate lies inside this shape.
    fn contains(&self, lat: f64, lon: f64) -> bool;

    /// The smallest rectangle enclosing this shape.
    fn bounds(&self) -> BBox;
}

/// A 2D axis-aligned rectangle in degrees.
///
/// Longitude is the x axis and latitude the y axis. Edges are inclusive for
/// both containment and intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Western boundary
    pub min_lon: f64,
    /// Southern boundary
    pub min_lat: f64,
    /// Eastern boundary
    pub max_lon: f64,
    /// Northern boundary
    pub max_lat: f64,
}

impl BBox {
    /// Create a new rectangle from minimum and maximum coordinates.
    ///
    /// # Arguments
    ///
    /// * `min_lon` - Minimum longitude (western boundary)
    /// * `min_lat` - Minimum latitude (southern boundary)
    /// * `max_lon` - Maximum longitude (eastern boundary)
    /// * `max_lat` - Maximum latitude (northern boundary)
    ///
    /// # Examples
    ///
    /// ```
    /// use geoquad_types::bbox::BBox;
    ///
    /// let manhattan = BBox::new(-74.02, 40.70, -73.93, 40.80);
    /// assert!(manhattan.is_valid());
    /// ```
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The whole earth: ±90° latitude, ±180° longitude.
    pub fn create_earth_max() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// A square window of `±err` degrees around a coordinate.
    pub fn around(lat: f64, lon: f64, err: f64) -> Self {
        Self::new(lon - err, lat - err, lon + err, lat + err)
    }

    /// Check if this rectangle overlaps another, edges included.
    pub fn intersects(&self, other: &BBox) -> bool {
        !(self.max_lon < other.min_lon
            || self.min_lon > other.max_lon
            || self.max_lat < other.min_lat
            || self.min_lat > other.max_lat)
    }

    /// Check if a coordinate lies inside this rectangle, edges included.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat <= self.max_lat && lat >= self.min_lat && lon <= self.max_lon && lon >= self.min_lon
    }

    /// Check if `other` lies completely inside this rectangle.
    pub fn contains_bbox(&self, other: &BBox) -> bool {
        self.max_lat >= other.max_lat
            && self.min_lat <= other.min_lat
            && self.max_lon >= other.max_lon
            && self.min_lon <= other.min_lon
    }

    /// Finite coordinates with min strictly below max on both axes.
    pub fn is_valid(&self) -> bool {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lon < self.max_lon
            && self.min_lat < self.max_lat
    }

    /// Get the center point of the rectangle.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::create_earth_max()
    }
}

impl Shape for BBox {
    fn intersects(&self, rect: &BBox) -> bool {
        BBox::intersects(self, rect)
    }

    fn contains(&self, lat: f64, lon: f64) -> bool {
        BBox::contains(self, lat, lon)
    }

    fn bounds(&self) -> BBox {
        *self
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earth_max_contains_extremes() {
        let earth = BBox::create_earth_max();
        assert!(earth.contains(90.0, 180.0));
        assert!(earth.contains(-90.0, -180.0));
        assert!(!earth.contains(90.1, 0.0));
        assert!(earth.is_valid());
    }

    #[test]
    fn test_intersects_is_edge_inclusive() {
        let left = BBox::new(0.0, 0.0, 10.0, 10.0);
        let right = BBox::new(10.0, 0.0, 20.0, 10.0);
        let far = BBox::new(10.5, 0.0, 20.0, 10.0);

        assert!(left.intersects(&right));
        assert!(right.intersects(&left));
        assert!(!left.intersects(&far));
    }

    #[test]
    fn test_degenerate_window_hits_boundary() {
        let lower = BBox::new(-180.0, -90.0, 180.0, 0.0);
        let upper = BBox::new(-180.0, 0.0, 180.0, 90.0);
        let point = BBox::around(0.0, 5.0, 0.0);

        assert!(lower.intersects(&point));
        assert!(upper.intersects(&point));
    }

    #[test]
    fn test_contains_bbox() {
        let outer = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains_bbox(&BBox::new(1.0, 1.0, 9.0, 9.0)));
        assert!(!outer.contains_bbox(&BBox::new(1.0, 1.0, 11.0, 9.0)));
    }

    #[test]
    fn test_invalid_boxes() {
        assert!(!BBox::new(10.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!BBox::new(0.0, 0.0, 10.0, f64::NAN).is_valid());
        assert!(!BBox::new(0.0, 5.0, 10.0, 5.0).is_valid());
    }

    #[test]
    fn test_center() {
        let bbox = BBox::new(-10.0, 20.0, 10.0, 40.0);
        let center = bbox.center();
        assert_eq!(center.lat, 30.0);
        assert_eq!(center.lon, 0.0);
    }
}
