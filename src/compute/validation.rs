//! Validation for coordinates, bounds and index parameters.

use crate::error::{GeoQuadError, Result};
use geoquad_types::bbox::BBox;
use geoquad_types::point::GeoPoint;

/// Widest spatial key supported, one `u64`.
pub const MAX_KEY_BITS: u32 = 64;

/// Validates that a coordinate consists of finite numbers.
///
/// Range is not checked: coordinates outside the codec bounds still map to a
/// (border) cell.
///
/// # Examples
///
/// ```
/// use geoquad::compute::validation::validate_coordinate;
///
/// assert!(validate_coordinate(40.7128, -74.0060).is_ok());
/// assert!(validate_coordinate(95.0, -74.0).is_ok());
/// assert!(validate_coordinate(f64::NAN, -74.0).is_err());
/// ```
pub fn validate_coordinate(lat: f64, lon: f64) -> Result<()> {
    let point = GeoPoint::new(lat, lon);
    if !point.is_finite() {
        return Err(GeoQuadError::InvalidInput(format!(
            "Coordinate must be finite, got: {}",
            point
        )));
    }

    Ok(())
}

/// Validates codec bounds: finite, non-empty on both axes and on earth.
///
/// # Examples
///
/// ```
/// use geoquad::compute::validation::validate_bounds;
/// use geoquad_types::bbox::BBox;
///
/// assert!(validate_bounds(&BBox::new(10.0, 50.0, 11.0, 51.0)).is_ok());
/// assert!(validate_bounds(&BBox::new(11.0, 50.0, 10.0, 51.0)).is_err());
/// ```
pub fn validate_bounds(bounds: &BBox) -> Result<()> {
    validate_coordinate(bounds.min_lat, bounds.min_lon)
        .and_then(|_| validate_coordinate(bounds.max_lat, bounds.max_lon))
        .map_err(|e| GeoQuadError::InvalidInput(format!("Bounds {}: {}", bounds, e)))?;

    let earth = BBox::create_earth_max();
    if !earth.contains_bbox(bounds) {
        return Err(GeoQuadError::InvalidInput(format!(
            "Bounds {} must lie within {}",
            bounds, earth
        )));
    }

    if bounds.min_lat >= bounds.max_lat {
        return Err(GeoQuadError::InvalidInput(format!(
            "min_lat ({}) must be < max_lat ({})",
            bounds.min_lat, bounds.max_lat
        )));
    }

    if bounds.min_lon >= bounds.max_lon {
        return Err(GeoQuadError::InvalidInput(format!(
            "min_lon ({}) must be < max_lon ({})",
            bounds.min_lon, bounds.max_lon
        )));
    }

    Ok(())
}

/// Validates a spatial key width: even and within `2..=64`.
pub fn validate_key_bits(bits: u32) -> Result<()> {
    if bits == 0 || bits > MAX_KEY_BITS {
        return Err(GeoQuadError::InvalidInput(format!(
            "Key bits must be between 2 and {}, got: {}",
            MAX_KEY_BITS, bits
        )));
    }

    if bits % 2 != 0 {
        return Err(GeoQuadError::InvalidInput(format!(
            "Key bits must be even (one latitude and one longitude bit per level), got: {}",
            bits
        )));
    }

    Ok(())
}

/// Validates a search radius in meters.
pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeoQuadError::InvalidInput(format!(
            "Radius must be finite and positive, got: {}",
            radius
        )));
    }
    Ok(())
}
