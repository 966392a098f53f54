//! Spatial key codec.
//!
//! A spatial key is a geohash without the string: latitude and longitude are
//! each bisected `bits / 2` times against the configured bounds and the
//! resulting bits are interleaved, latitude first, most significant first.
//! Read two bits at a time from the top, a key is the path through a quad
//! tree down to the cell that holds the coordinate.
//!
//! ```text
//!  2 bits per axis, whole earth:
//!
//!  |----|----|----|----|
//!  |1010|1011|1110|1111|
//!  |----|----|----|----|  lat0 == 1
//!  |1000|1001|1100|1101|
//! -|----|----|----|----|------
//!  |0010|0011|0110|0111|
//!  |----|----|----|----|  lat0 == 0
//!  |0000|0001|0100|0101|
//!  |----|----|----|----|
//!            |
//!  lon0 == 0 | lon0 == 1
//! ```
//!
//! A 32 bit key resolves roughly 600 m (40 000 km / 2^16), a 64 bit key a
//! few millimeters.

use crate::compute::validation::{validate_bounds, validate_key_bits};
use crate::error::Result;
use geoquad_types::bbox::BBox;
use geoquad_types::point::GeoPoint;

/// Upper limit for [`SpatialKeyAlgo::exact_precision`]. More fractional digits
/// than this vanish next to coordinates of magnitude 180 in an `f64`.
pub const MAX_EXACT_PRECISION: u32 = 12;

/// Encodes coordinates to bit-interleaved spatial keys and back.
///
/// Keys produced with different widths or bounds are not interchangeable.
///
/// # Examples
///
/// ```
/// use geoquad::compute::spatial::key::SpatialKeyAlgo;
///
/// let algo = SpatialKeyAlgo::new(32)?;
/// let key = algo.encode(52.52, 13.405);
/// let decoded = algo.decode(key);
/// assert_eq!(algo.encode(decoded.lat, decoded.lon), key);
/// # Ok::<(), geoquad::GeoQuadError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialKeyAlgo {
    bits: u32,
    initial_bit: u64,
    bounds: BBox,
}

impl SpatialKeyAlgo {
    /// Create a codec for `bits`-wide keys over the whole earth.
    ///
    /// `bits` must be even and within `2..=64`.
    pub fn new(bits: u32) -> Result<Self> {
        validate_key_bits(bits)?;
        Ok(Self {
            bits,
            initial_bit: 1u64 << (bits - 1),
            bounds: BBox::create_earth_max(),
        })
    }

    /// Replace the bounds used by both `encode` and `decode`.
    pub fn with_bounds(mut self, bounds: BBox) -> Result<Self> {
        validate_bounds(&bounds)?;
        self.bounds = bounds;
        Ok(self)
    }

    /// Reconfigure the bounding rectangle in place.
    ///
    /// Keys encoded before this call cannot be decoded afterwards.
    pub fn set_bounds(
        &mut self,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> Result<()> {
        let bounds = BBox::new(min_lon, min_lat, max_lon, max_lat);
        validate_bounds(&bounds)?;
        self.bounds = bounds;
        Ok(())
    }

    /// Number of bits in a key.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn bounds(&self) -> &BBox {
        &self.bounds
    }

    /// Mask of the most significant key bit, the first latitude bit.
    pub fn initial_bit(&self) -> u64 {
        self.initial_bit
    }

    /// Decimal digits of precision a key of this width carries for these bounds.
    ///
    /// `10^-exact_precision()` degrees is below the size of one key cell and is
    /// used as the search window around a coordinate for exact lookups.
    pub fn exact_precision(&self) -> u32 {
        let span = self.bounds.width().max(self.bounds.height());
        let cells_per_degree = 2f64.powi((self.bits / 2) as i32) / span;
        let digits = (cells_per_degree + 1.0).log10().floor();
        (digits.max(0.0) as u32).min(MAX_EXACT_PRECISION)
    }

    /// Degrees of the epsilon window derived from [`Self::exact_precision`].
    pub fn exact_epsilon(&self) -> f64 {
        1.0 / 10f64.powi(self.exact_precision() as i32)
    }

    /// Encode a coordinate into a `bits`-wide key.
    ///
    /// Coordinates outside the bounds are clamped to the border cells;
    /// non-finite input yields a defined but meaningless key.
    pub fn encode(&self, lat: f64, lon: f64) -> u64 {
        let mut key = 0u64;
        let mut min_lat = self.bounds.min_lat;
        let mut max_lat = self.bounds.max_lat;
        let mut min_lon = self.bounds.min_lon;
        let mut max_lon = self.bounds.max_lon;

        for i in 0..self.bits {
            if i % 2 == 0 {
                if min_lat < max_lat {
                    let mid = (min_lat + max_lat) / 2.0;
                    if lat < mid {
                        max_lat = mid;
                    } else {
                        key |= 1;
                        min_lat = mid;
                    }
                }
            } else if min_lon < max_lon {
                let mid = (min_lon + max_lon) / 2.0;
                if lon < mid {
                    max_lon = mid;
                } else {
                    key |= 1;
                    min_lon = mid;
                }
            }

            if i + 1 < self.bits {
                key <<= 1;
            }
        }
        key
    }

    /// Decode a key into the center of the cell it addresses.
    ///
    /// Returning the center, not the lower corner, keeps
    /// `encode(decode(key)) == key` stable under floating point rounding.
    pub fn decode(&self, key: u64) -> GeoPoint {
        let mut half_lat = self.bounds.height() / 2.0;
        let mut half_lon = self.bounds.width() / 2.0;
        let mut lat = self.bounds.min_lat;
        let mut lon = self.bounds.min_lon;
        let mut bit = self.initial_bit;

        loop {
            if key & bit != 0 {
                lat += half_lat;
            }
            half_lat /= 2.0;
            bit >>= 1;

            if key & bit != 0 {
                lon += half_lon;
            }
            half_lon /= 2.0;

            if bit > 1 {
                bit >>= 1;
            } else {
                break;
            }
        }

        GeoPoint::new(lat + half_lat, lon + half_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{DistanceCalc, DistanceMetric};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TESTED_WIDTHS: [u32; 5] = [24, 32, 48, 56, 64];

    fn to_bit_string(key: u64, bits: u32) -> String {
        (0..bits)
            .rev()
            .map(|i| if key >> i & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    #[test]
    fn test_rejects_bad_widths() {
        assert!(SpatialKeyAlgo::new(0).is_err());
        assert!(SpatialKeyAlgo::new(33).is_err());
        assert!(SpatialKeyAlgo::new(65).is_err());
        assert!(SpatialKeyAlgo::new(2).is_ok());
    }

    #[test]
    fn test_quadrant_bits() {
        let algo = SpatialKeyAlgo::new(2).unwrap();
        assert_eq!(algo.encode(-45.0, -90.0), 0b00);
        assert_eq!(algo.encode(-45.0, 90.0), 0b01);
        assert_eq!(algo.encode(45.0, -90.0), 0b10);
        assert_eq!(algo.encode(45.0, 90.0), 0b11);
    }

    #[test]
    fn test_encode_grid() {
        let algo = SpatialKeyAlgo::new(4).unwrap();
        // matches the 2 bit per axis grid in the module docs
        assert_eq!(to_bit_string(algo.encode(80.0, -170.0), 4), "1010");
        assert_eq!(to_bit_string(algo.encode(80.0, 170.0), 4), "1111");
        assert_eq!(to_bit_string(algo.encode(-80.0, -170.0), 4), "0000");
        assert_eq!(to_bit_string(algo.encode(-10.0, 10.0), 4), "0110");
    }

    #[test]
    fn test_encode_known_prefix() {
        let algo = SpatialKeyAlgo::new(32).unwrap();
        let key = algo.encode(-24.235345, 47.234234);
        // southern hemisphere, eastern hemisphere
        assert_eq!(key >> 30, 0b01);
    }

    #[test]
    fn test_decode_is_cell_center() {
        let algo = SpatialKeyAlgo::new(2).unwrap();
        let p = algo.decode(0b11);
        assert_eq!(p.lat, 45.0);
        assert_eq!(p.lon, 90.0);

        let p = algo.decode(0b00);
        assert_eq!(p.lat, -45.0);
        assert_eq!(p.lon, -90.0);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let algo = SpatialKeyAlgo::new(8).unwrap();
        assert_eq!(algo.encode(95.0, 200.0), algo.encode(89.999, 179.999));
        assert_eq!(algo.encode(-95.0, -200.0), 0);
    }

    #[test]
    fn test_round_trip_stability() {
        let mut rng = StdRng::seed_from_u64(42);
        for bits in TESTED_WIDTHS {
            let algo = SpatialKeyAlgo::new(bits).unwrap();
            for _ in 0..2_000 {
                let lat = rng.random_range(-90.0..90.0);
                let lon = rng.random_range(-180.0..180.0);
                let key = algo.encode(lat, lon);
                let decoded = algo.decode(key);
                assert_eq!(
                    algo.encode(decoded.lat, decoded.lon),
                    key,
                    "bits {} coordinate {},{} -> {}",
                    bits,
                    lat,
                    lon,
                    decoded
                );
            }
        }
    }

    #[test]
    fn test_round_trip_with_custom_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = BBox::new(12.0, 47.0, 14.0, 49.0);
        for bits in TESTED_WIDTHS {
            let algo = SpatialKeyAlgo::new(bits).unwrap().with_bounds(bounds).unwrap();
            for _ in 0..500 {
                let lat = rng.random_range(47.0..49.0);
                let lon = rng.random_range(12.0..14.0);
                let key = algo.encode(lat, lon);
                let decoded = algo.decode(key);
                assert_eq!(algo.encode(decoded.lat, decoded.lon), key);
            }
        }
    }

    #[test]
    fn test_decode_accuracy() {
        let calc = DistanceMetric::Haversine;
        let circumference = 2.0 * std::f64::consts::PI * crate::spatial::EARTH_MEAN_RADIUS;
        let mut rng = StdRng::seed_from_u64(1234);
        for bits in TESTED_WIDTHS {
            let algo = SpatialKeyAlgo::new(bits).unwrap();
            let max_error = circumference / 2f64.powi((bits / 2) as i32);
            for _ in 0..1_000 {
                let lat = rng.random_range(-85.0..85.0);
                let lon = rng.random_range(-180.0..180.0);
                let decoded = algo.decode(algo.encode(lat, lon));
                let dist = calc.calc_dist(lat, lon, decoded.lat, decoded.lon);
                assert!(
                    dist < max_error,
                    "bits {}: {} m off, bound {} m",
                    bits,
                    dist,
                    max_error
                );
            }
        }
    }

    #[test]
    fn test_custom_bounds_gain_precision() {
        let world = SpatialKeyAlgo::new(32).unwrap();
        let local = SpatialKeyAlgo::new(32)
            .unwrap()
            .with_bounds(BBox::new(13.0, 52.0, 14.0, 53.0))
            .unwrap();

        let (lat, lon) = (52.5163, 13.3777);
        let l = local.decode(local.encode(lat, lon));
        assert!((l.lat - lat).abs() <= 1.0 / 65536.0);
        assert!((l.lon - lon).abs() <= 1.0 / 65536.0);
        assert!(local.exact_precision() > world.exact_precision());
    }

    #[test]
    fn test_set_bounds() {
        let mut algo = SpatialKeyAlgo::new(16).unwrap();
        assert!(algo.set_bounds(10.0, 0.0, 0.0, 10.0).is_err());
        assert_eq!(*algo.bounds(), BBox::create_earth_max());

        algo.set_bounds(0.0, 10.0, 0.0, 20.0).unwrap();
        assert_eq!(algo.bounds().max_lon, 20.0);
        assert_eq!(algo.decode(algo.encode(5.0, 10.0)).lat.round(), 5.0);
    }

    #[test]
    fn test_exact_precision() {
        assert_eq!(SpatialKeyAlgo::new(8).unwrap().exact_precision(), 0);
        assert_eq!(SpatialKeyAlgo::new(32).unwrap().exact_precision(), 2);
        assert_eq!(SpatialKeyAlgo::new(64).unwrap().exact_precision(), 7);

        let tiny = SpatialKeyAlgo::new(64)
            .unwrap()
            .with_bounds(BBox::new(0.0, 0.0, 1e-6, 1e-6))
            .unwrap();
        assert_eq!(tiny.exact_precision(), MAX_EXACT_PRECISION);
    }
}
