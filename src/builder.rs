//! Quad-tree builder for flexible configuration
//!
//! This module provides a builder pattern for creating trees with custom
//! key widths, codec bounds and distance metrics.

use crate::compute::spatial::quadtree::QuadTree;
use crate::error::Result;
use crate::spatial::DistanceMetric;
use crate::types::Config;
use geoquad_types::bbox::BBox;

/// Builder for quad-tree configuration.
///
/// ```rust
/// use geoquad::{DistanceMetric, QuadTreeBuilder};
/// use geoquad_types::bbox::BBox;
///
/// let tree = QuadTreeBuilder::new()
///     .entries_per_leaf(8)
///     .key_bits(48)
///     .bounds(BBox::new(5.0, 45.0, 15.0, 55.0))
///     .distance_metric(DistanceMetric::PlaneProjection)
///     .build::<u64>()?;
/// assert_eq!(tree.entries_per_leaf(), 8);
/// # Ok::<(), geoquad::GeoQuadError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuadTreeBuilder {
    config: Config,
}

impl QuadTreeBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Entries a leaf holds before it splits.
    pub fn entries_per_leaf(mut self, entries_per_leaf: usize) -> Self {
        self.config.entries_per_leaf = entries_per_leaf;
        self
    }

    /// Width of the spatial key in bits.
    pub fn key_bits(mut self, key_bits: u32) -> Self {
        self.config.key_bits = key_bits;
        self
    }

    /// Rectangle the key codec subdivides.
    pub fn bounds(mut self, bounds: BBox) -> Self {
        self.config.bounds = bounds;
        self
    }

    /// Metric used for radius queries.
    pub fn distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.config.distance_metric = metric;
        self
    }

    /// Validate the configuration and build an empty tree.
    pub fn build<V>(self) -> Result<QuadTree<V>> {
        QuadTree::from_config(&self.config)
    }
}
