//! Backend-neutral point index interface.
//!
//! Callers that only insert, remove and query can be written against
//! [`SpatialIndex`] and stay independent of the tree layout behind it.

use crate::compute::spatial::quadtree::QuadTree;
use crate::error::Result;
use geoquad_types::bbox::Shape;
use geoquad_types::point::GeoEntry;

/// Trait for point index implementations
///
/// Coordinates are latitude/longitude in degrees, radii in meters.
pub trait SpatialIndex<V> {
    /// Capacity hint; backends without preallocation may ignore it
    fn init(&mut self, max_items_hint: usize);

    /// Insert a value at a coordinate. Duplicates are kept.
    fn add(&mut self, lat: f64, lon: f64, value: V) -> Result<()>;

    /// Remove every entry at the key of a coordinate, returning how many went
    fn remove(&mut self, lat: f64, lon: f64) -> usize;

    /// Entries at the key of a coordinate, optionally filtered by value
    fn get_nodes_from_value(&self, lat: f64, lon: f64, value: Option<&V>) -> Vec<GeoEntry<V>>;

    /// Entries within `radius` meters of a coordinate
    fn get_nodes(&self, lat: f64, lon: f64, radius: f64) -> Result<Vec<GeoEntry<V>>>;

    /// Entries inside an arbitrary shape
    fn get_nodes_in(&self, shape: &dyn Shape) -> Vec<GeoEntry<V>>;

    /// Number of stored entries
    fn size(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Drop all entries
    fn clear(&mut self);

    /// Estimated memory footprint; `factor` is 1 for 32-bit, 2 for 64-bit references
    fn memory_usage_in_bytes(&self, factor: usize) -> usize;

    /// Unused slots, optionally only those of branch nodes
    fn empty_entries(&self, only_branches: bool) -> usize;

    /// Get index statistics
    fn stats(&self) -> IndexStats;
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of stored entries
    pub size: usize,
    /// Number of tree nodes
    pub node_count: usize,
    /// Levels below the root
    pub depth: usize,
    /// Unused branch and leaf slots
    pub empty_entries: usize,
    /// Memory estimate in bytes for 64-bit references
    pub memory_bytes: usize,
}

impl<V: Clone + PartialEq> SpatialIndex<V> for QuadTree<V> {
    fn init(&mut self, max_items_hint: usize) {
        QuadTree::init(self, max_items_hint);
    }

    fn add(&mut self, lat: f64, lon: f64, value: V) -> Result<()> {
        QuadTree::add(self, lat, lon, value)
    }

    fn remove(&mut self, lat: f64, lon: f64) -> usize {
        QuadTree::remove(self, lat, lon)
    }

    fn get_nodes_from_value(&self, lat: f64, lon: f64, value: Option<&V>) -> Vec<GeoEntry<V>> {
        QuadTree::get_nodes_from_value(self, lat, lon, value)
    }

    fn get_nodes(&self, lat: f64, lon: f64, radius: f64) -> Result<Vec<GeoEntry<V>>> {
        QuadTree::get_nodes(self, lat, lon, radius)
    }

    fn get_nodes_in(&self, shape: &dyn Shape) -> Vec<GeoEntry<V>> {
        QuadTree::get_nodes_in(self, shape)
    }

    fn size(&self) -> usize {
        QuadTree::size(self)
    }

    fn clear(&mut self) {
        QuadTree::clear(self);
    }

    fn memory_usage_in_bytes(&self, factor: usize) -> usize {
        QuadTree::memory_usage_in_bytes(self, factor)
    }

    fn empty_entries(&self, only_branches: bool) -> usize {
        QuadTree::empty_entries(self, only_branches)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            size: QuadTree::size(self),
            node_count: self.count(),
            depth: self.depth(),
            empty_entries: QuadTree::empty_entries(self, false),
            memory_bytes: QuadTree::memory_usage_in_bytes(self, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquad_types::bbox::BBox;

    fn fill(index: &mut dyn SpatialIndex<&'static str>) {
        index.init(16);
        index.add(52.5200, 13.4050, "berlin").unwrap();
        index.add(48.8566, 2.3522, "paris").unwrap();
        index.add(48.8566, 2.3522, "paris-again").unwrap();
    }

    #[test]
    fn test_quadtree_through_trait_object() {
        let mut tree = QuadTree::new(1, 64).unwrap();
        fill(&mut tree);

        let index: &mut dyn SpatialIndex<&'static str> = &mut tree;
        assert_eq!(index.size(), 3);
        assert!(!index.is_empty());
        assert_eq!(index.get_nodes_from_value(48.8566, 2.3522, None).len(), 2);
        assert_eq!(index.get_nodes(52.52, 13.405, 100.0).unwrap().len(), 1);

        let europe = BBox::new(-10.0, 35.0, 30.0, 60.0);
        assert_eq!(index.get_nodes_in(&europe).len(), 3);

        assert_eq!(index.remove(48.8566, 2.3522), 2);
        assert_eq!(index.size(), 1);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.stats(), IndexStats {
            memory_bytes: index.memory_usage_in_bytes(2),
            ..IndexStats::default()
        });
    }

    #[test]
    fn test_stats() {
        let mut tree = QuadTree::new(4, 64).unwrap();
        fill(&mut tree);

        let stats = SpatialIndex::stats(&tree);
        assert_eq!(stats.size, 3);
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.depth, 0);
        assert_eq!(stats.empty_entries, 1);
        assert_eq!(stats.memory_bytes, tree.memory_usage_in_bytes(2));
    }
}
