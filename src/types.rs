//! Index configuration.
//!
//! Plain, serializable settings that can be loaded from JSON (or TOML with
//! the `toml` feature) and turned into a [`QuadTree`](crate::QuadTree).
use crate::compute::validation::{validate_bounds, validate_key_bits};
use crate::spatial::DistanceMetric;
use geoquad_types::bbox::BBox;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Quad-tree configuration
///
/// # Example
///
/// ```rust
/// use geoquad::{Config, DistanceMetric};
///
/// let config = Config::default();
/// assert_eq!(config.key_bits, 64);
///
/// // Missing fields fall back to their defaults
/// let json = r#"{
///     "entries_per_leaf": 8,
///     "distance_metric": "geodesic"
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.entries_per_leaf, 8);
/// assert_eq!(config.distance_metric, DistanceMetric::Geodesic);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Entries a leaf holds before it is split (at least 1, default: 4)
    #[serde(default = "Config::default_entries_per_leaf")]
    pub entries_per_leaf: usize,

    /// Width of the spatial key in bits (even, 2-64, default: 64)
    /// More bits mean smaller cells and a deeper tree
    #[serde(default = "Config::default_key_bits")]
    pub key_bits: u32,

    /// Rectangle the key codec subdivides (default: the whole earth)
    #[serde(default)]
    pub bounds: BBox,

    /// Metric used to build radius query circles
    #[serde(default)]
    pub distance_metric: DistanceMetric,
}

impl Config {
    const fn default_entries_per_leaf() -> usize {
        4
    }

    const fn default_key_bits() -> u32 {
        64
    }

    pub fn with_entries_per_leaf(mut self, entries_per_leaf: usize) -> Self {
        self.entries_per_leaf = entries_per_leaf;
        self
    }

    pub fn with_key_bits(mut self, key_bits: u32) -> Self {
        self.key_bits = key_bits;
        self
    }

    /// Restrict the codec to a sub-rectangle for more precision inside it.
    pub fn with_bounds(mut self, bounds: BBox) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.entries_per_leaf == 0 {
            return Err("Entries per leaf must be greater than zero".to_string());
        }

        validate_key_bits(self.key_bits).map_err(|e| e.to_string())?;
        validate_bounds(&self.bounds).map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entries_per_leaf: Self::default_entries_per_leaf(),
            key_bits: Self::default_key_bits(),
            bounds: BBox::create_earth_max(),
            distance_metric: DistanceMetric::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.entries_per_leaf, 4);
        assert_eq!(config.key_bits, 64);
        assert_eq!(config.bounds, BBox::create_earth_max());
        assert_eq!(config.distance_metric, DistanceMetric::Haversine);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(
            Config::default()
                .with_entries_per_leaf(0)
                .validate()
                .is_err()
        );
        assert!(Config::default().with_key_bits(33).validate().is_err());
        assert!(Config::default().with_key_bits(128).validate().is_err());
        assert!(
            Config::default()
                .with_bounds(BBox::new(10.0, 50.0, 10.0, 51.0))
                .validate()
                .is_err()
        );
        assert!(
            Config::default()
                .with_bounds(BBox::new(10.0, 50.0, 11.0, 51.0))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_entries_per_leaf(16)
            .with_key_bits(48)
            .with_bounds(BBox::new(5.0, 45.0, 15.0, 55.0))
            .with_distance_metric(DistanceMetric::Rhumb);

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_json_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_json_rejects_invalid_values() {
        let err = Config::from_json(r#"{"key_bits": 7}"#).unwrap_err();
        assert!(err.to_string().contains("even"));

        assert!(Config::from_json(r#"{"entries_per_leaf": 0}"#).is_err());
        assert!(Config::from_json(r#"{"distance_metric": "manhattan"}"#).is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml() {
        let toml_str = r#"
entries_per_leaf = 8
key_bits = 32
distance_metric = "plane_projection"

[bounds]
min_lon = 13.0
min_lat = 52.3
max_lon = 13.8
max_lat = 52.7
"#;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.entries_per_leaf, 8);
        assert_eq!(config.key_bits, 32);
        assert_eq!(config.bounds, BBox::new(13.0, 52.3, 13.8, 52.7));
        assert_eq!(config.distance_metric, DistanceMetric::PlaneProjection);

        let round_trip = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(round_trip, config);

        assert!(Config::from_toml("key_bits = 0").is_err());
    }
}
