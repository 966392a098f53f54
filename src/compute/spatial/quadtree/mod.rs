//! Quad-tree point index keyed by interleaved spatial keys.
//!
//! Each level of the tree consumes one latitude and one longitude bit of the
//! key, so a branch has four children and the tree is at most `bits / 2`
//! levels deep. Leaves hold a small packed run of `(key, value)` entries and
//! are split into branches when they overflow.
//!
//! Queries never look at keys to prune: they bisect the codec bounds on the
//! way down and ask the query [`Shape`] whether each child rectangle is worth
//! visiting.
//!
//! # Examples
//!
//! ```rust
//! use geoquad::QuadTree;
//!
//! let mut tree = QuadTree::new(4, 64)?;
//! tree.add(52.5200, 13.4050, "berlin")?;
//! tree.add(48.8566, 2.3522, "paris")?;
//!
//! let near = tree.get_nodes(52.5201, 13.4051, 100.0)?;
//! assert_eq!(near.len(), 1);
//! assert_eq!(*near[0].value(), "berlin");
//! # Ok::<(), geoquad::GeoQuadError>(())
//! ```

mod node;


use crate::compute::spatial::key::SpatialKeyAlgo;
use crate::compute::validation::{validate_coordinate, validate_radius};
use crate::error::{GeoQuadError, Result};
use crate::spatial::{Circle, DistanceMetric};
use crate::types::Config;
use geoquad_types::bbox::{BBox, Shape};
use geoquad_types::point::GeoEntry;
use log::{debug, trace, warn};
use node::{Leaf, Node, QUADRANTS, quadrant, quadrant_bounds, size_of_object_ref};
use std::fmt::{Debug, Write as _};

const OVERFLOW_MESSAGE: &str = "too many entries per area; increase entries-per-leaf";

/// A quad-tree mapping coordinates to values.
///
/// Duplicate coordinates are allowed and stored separately. The tree only
/// grows structurally: removal compacts leaves in place but never merges
/// branches back, so rebuild the tree (or [`clear`](Self::clear) it) to
/// reclaim nodes.
///
/// Not synchronized; wrap it in a lock to share it between threads.
#[derive(Debug)]
pub struct QuadTree<V> {
    algo: SpatialKeyAlgo,
    entries_per_leaf: usize,
    calc: DistanceMetric,
    size: usize,
    root: Option<Node<V>>,
}

impl<V> QuadTree<V> {
    /// Create an empty tree over the whole earth.
    ///
    /// `entries_per_leaf` must be at least 1 and `key_bits` even and at most 64.
    pub fn new(entries_per_leaf: usize, key_bits: u32) -> Result<Self> {
        let algo = SpatialKeyAlgo::new(key_bits)?;
        Self::with_algo(entries_per_leaf, algo)
    }

    /// Create an empty tree using an already configured key codec.
    pub fn with_algo(entries_per_leaf: usize, algo: SpatialKeyAlgo) -> Result<Self> {
        if entries_per_leaf == 0 {
            return Err(GeoQuadError::invalid_input(
                "Entries per leaf must be at least 1",
            ));
        }

        Ok(Self {
            algo,
            entries_per_leaf,
            calc: DistanceMetric::default(),
            size: 0,
            root: None,
        })
    }

    /// Create an empty tree from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(GeoQuadError::InvalidConfig)?;
        let algo = SpatialKeyAlgo::new(config.key_bits)?.with_bounds(config.bounds)?;
        Ok(Self::with_algo(config.entries_per_leaf, algo)?.with_distance_calc(config.distance_metric))
    }

    /// Use `calc` to build the circles of radius queries.
    pub fn with_distance_calc(mut self, calc: DistanceMetric) -> Self {
        self.calc = calc;
        self
    }

    /// Capacity hint, accepted for parity with other index backends.
    ///
    /// Nodes are allocated on demand, so the hint is ignored.
    pub fn init(&mut self, max_items_hint: usize) -> &mut Self {
        trace!("Ignoring capacity hint of {} items", max_items_hint);
        self
    }

    pub fn algo(&self) -> &SpatialKeyAlgo {
        &self.algo
    }

    pub fn entries_per_leaf(&self) -> usize {
        self.entries_per_leaf
    }

    pub fn distance_calc(&self) -> DistanceMetric {
        self.calc
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Drop every node and reset the size to 0.
    pub fn clear(&mut self) {
        debug!("Clearing quad-tree with {} entries", self.size);
        self.root = None;
        self.size = 0;
    }

    /// Insert `value` at a coordinate.
    ///
    /// Coordinates outside the codec bounds are stored in the nearest border
    /// cell. Non-finite coordinates are rejected without touching the tree.
    pub fn add(&mut self, lat: f64, lon: f64, value: V) -> Result<()> {
        validate_coordinate(lat, lon)?;

        let key = self.algo.encode(lat, lon);
        let capacity = self.entries_per_leaf;
        let mut bit = self.algo.initial_bit();
        let mut node = self
            .root
            .get_or_insert_with(|| Node::Leaf(Leaf::new(capacity)));

        while let Node::Branch(children) = node {
            if bit == 0 {
                panic!("{}", OVERFLOW_MESSAGE);
            }
            let q = quadrant(key, bit);
            bit >>= 2;
            node = children[q].get_or_insert_with(|| Node::Leaf(Leaf::new(capacity)));
        }

        let Node::Leaf(leaf) = node else {
            unreachable!("descent always ends on a leaf");
        };

        if let Err((key, value)) = leaf.try_push(key, value) {
            if bit == 0 {
                // all key bits consumed, only identical keys can share this leaf
                debug!(
                    "Growing leaf to {} entries for duplicate key {:#x}",
                    leaf.capacity() + 1,
                    key
                );
                leaf.grow_and_push(key, value);
            } else {
                let mut entries = leaf.take_entries();
                entries.push((key, value));
                *node = split(entries, bit, capacity);
            }
        }

        self.size += 1;
        Ok(())
    }

    /// Remove every entry stored under the key of a coordinate.
    ///
    /// Returns the number of entries removed.
    pub fn remove(&mut self, lat: f64, lon: f64) -> usize {
        if validate_coordinate(lat, lon).is_err() {
            warn!("Rejecting removal at non-finite coordinate {},{}", lat, lon);
            return 0;
        }

        let key = self.algo.encode(lat, lon);
        let window = self.exact_window(key);
        let bounds = *self.algo.bounds();
        let mut removed = 0;

        if let Some(root) = self.root.as_mut()
            && window.intersects(&bounds)
        {
            visit_mut(&bounds, &window, root, &mut |leaf| {
                removed += leaf.remove_key(key);
            });
        }

        self.size -= removed;
        removed
    }

    /// Search window around the cell `key` addresses.
    ///
    /// Centering on the decoded cell instead of the raw coordinate keeps
    /// clamped out-of-bounds coordinates reachable.
    fn exact_window(&self, key: u64) -> BBox {
        let center = self.algo.decode(key);
        BBox::around(center.lat, center.lon, self.algo.exact_epsilon())
    }

    /// Call `visitor` with every entry in leaves whose rectangle `shape` intersects.
    ///
    /// Shapes whose enclosing rectangle misses the codec bounds are skipped
    /// without descending.
    fn visit<S, F>(&self, shape: &S, mut visitor: F)
    where
        S: Shape + ?Sized,
        F: FnMut(u64, &V),
    {
        let Some(root) = &self.root else {
            return;
        };
        let bounds = *self.algo.bounds();
        if !shape.bounds().intersects(&bounds) {
            trace!("Query shape {} lies outside bounds {}", shape.bounds(), bounds);
            return;
        }
        if shape.intersects(&bounds) {
            visit(&bounds, shape, root, &mut visitor);
        }
    }

    /// Estimated memory footprint in bytes, excluding value payloads.
    ///
    /// `factor` is 1 for 32-bit and 2 for 64-bit references.
    pub fn memory_usage_in_bytes(&self, factor: usize) -> usize {
        // size, entries per leaf and bit width plus the codec bounds
        let offset = 3 * 4 + 8 + 3 * size_of_object_ref(factor);
        offset + self.root.as_ref().map_or(0, |root| root.memory_usage(factor))
    }

    /// Number of unused slots.
    ///
    /// Counts empty child slots of branches and, unless `only_branches`, the
    /// free slots of leaves.
    pub fn empty_entries(&self, only_branches: bool) -> usize {
        self.root
            .as_ref()
            .map_or(0, |root| root.empty_entries(only_branches))
    }

    /// Number of nodes, branches and leaves.
    pub fn count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::count)
    }

    /// Levels below the root, 0 for an empty tree or a lone root leaf.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }
}

impl<V: Clone> QuadTree<V> {
    /// Entries stored under the key of a coordinate.
    ///
    /// With `value`, only entries equal to it are returned.
    pub fn get_nodes_from_value(&self, lat: f64, lon: f64, value: Option<&V>) -> Vec<GeoEntry<V>>
    where
        V: PartialEq,
    {
        if validate_coordinate(lat, lon).is_err() {
            warn!("Rejecting lookup at non-finite coordinate {},{}", lat, lon);
            return Vec::new();
        }

        let key = self.algo.encode(lat, lon);
        let window = self.exact_window(key);
        let mut result = Vec::new();

        self.visit(&window, |k, v| {
            if k == key && value.is_none_or(|wanted| wanted == v) {
                result.push(self.entry(k, v));
            }
        });
        result
    }

    /// Entries within `radius` meters of a coordinate.
    ///
    /// Distances are measured from the decoded cell center of each entry.
    pub fn get_nodes(&self, lat: f64, lon: f64, radius: f64) -> Result<Vec<GeoEntry<V>>> {
        if let Err(e) = validate_coordinate(lat, lon).and_then(|_| validate_radius(radius)) {
            warn!("Rejecting radius query: {}", e);
            return Err(e);
        }

        let circle = Circle::new(lat, lon, radius, self.calc);
        Ok(self.get_nodes_in(&circle))
    }

    /// Entries whose decoded coordinate lies inside `shape`.
    pub fn get_nodes_in<S: Shape + ?Sized>(&self, shape: &S) -> Vec<GeoEntry<V>> {
        let mut result = Vec::new();
        self.visit(shape, |k, v| {
            let point = self.algo.decode(k);
            if shape.contains(point.lat, point.lon) {
                result.push(GeoEntry::new(point.lat, point.lon, v.clone()));
            }
        });
        result
    }

    fn entry(&self, key: u64, value: &V) -> GeoEntry<V> {
        let point = self.algo.decode(key);
        GeoEntry::new(point.lat, point.lon, value.clone())
    }
}

impl<V: Debug> QuadTree<V> {
    /// Breadth-first dump of the tree, one line per level.
    ///
    /// Branches print as `B`, empty child slots as `-` and leaves as their
    /// decoded entries.
    pub fn to_detail_string(&self) -> String {
        let mut out = String::new();
        let Some(root) = &self.root else {
            return out;
        };

        let mut level: Vec<Option<&Node<V>>> = vec![Some(root)];
        let mut depth = 0;
        while !level.is_empty() {
            let mut next = Vec::new();
            let _ = write!(out, "{}:", depth);
            for slot in &level {
                match slot {
                    None => out.push_str(" -"),
                    Some(Node::Branch(children)) => {
                        out.push_str(" B");
                        next.extend(children.iter().map(Option::as_ref));
                    }
                    Some(Node::Leaf(leaf)) => {
                        out.push_str(" [");
                        for (i, (k, v)) in leaf.iter().enumerate() {
                            let point = self.algo.decode(k);
                            if i > 0 {
                                out.push(' ');
                            }
                            let _ = write!(out, "{}:{:?}", point, v);
                        }
                        out.push(']');
                    }
                }
            }
            out.push('\n');
            level = next;
            depth += 1;
        }
        out
    }
}

/// Replace an overflowing leaf, whose entries plus the new one are `entries`,
/// with a subtree.
///
/// `bit` is the latitude bit of the pair the new branch consumes. The loop
/// walks down while all entries keep landing in one crowded quadrant; if the
/// last pair is reached first, that quadrant becomes a leaf holding all of
/// them.
fn split<V>(mut entries: Vec<(u64, V)>, mut bit: u64, capacity: usize) -> Node<V> {
    let mut path: Vec<(usize, [Option<Node<V>>; QUADRANTS])> = Vec::new();

    let bottom = loop {
        let mut buckets: [Vec<(u64, V)>; QUADRANTS] = std::array::from_fn(|_| Vec::new());
        for (k, v) in entries {
            buckets[quadrant(k, bit)].push((k, v));
        }

        let Some(crowded) = buckets.iter().position(|b| b.len() > capacity) else {
            break Node::Branch(Box::new(buckets.map(|b| leaf_from(b, capacity))));
        };

        let overflow = std::mem::take(&mut buckets[crowded]);
        let mut siblings = buckets.map(|b| leaf_from(b, capacity));

        if bit >> 2 == 0 {
            debug!(
                "Growing leaf to {} entries, key bits exhausted",
                overflow.len()
            );
            siblings[crowded] = Some(Node::Leaf(Leaf::from_entries(overflow, capacity)));
            break Node::Branch(Box::new(siblings));
        }

        path.push((crowded, siblings));
        entries = overflow;
        bit >>= 2;
    };

    trace!(
        "Split leaf into {} branch level(s) at bit {:#x}",
        path.len() + 1,
        bit
    );

    path.into_iter()
        .rev()
        .fold(bottom, |child, (q, mut siblings)| {
            siblings[q] = Some(child);
            Node::Branch(Box::new(siblings))
        })
}

fn leaf_from<V>(entries: Vec<(u64, V)>, capacity: usize) -> Option<Node<V>> {
    (!entries.is_empty()).then(|| Node::Leaf(Leaf::from_entries(entries, capacity)))
}

fn visit<V, S, F>(rect: &BBox, shape: &S, node: &Node<V>, visitor: &mut F)
where
    S: Shape + ?Sized,
    F: FnMut(u64, &V),
{
    match node {
        Node::Leaf(leaf) => {
            for (k, v) in leaf.iter() {
                visitor(k, v);
            }
        }
        Node::Branch(children) => {
            for (q, child) in children.iter().enumerate() {
                let Some(child) = child else { continue };
                let child_rect = quadrant_bounds(rect, q);
                if shape.intersects(&child_rect) {
                    visit(&child_rect, shape, child, visitor);
                }
            }
        }
    }
}

fn visit_mut<V, S, F>(rect: &BBox, shape: &S, node: &mut Node<V>, visitor: &mut F)
where
    S: Shape + ?Sized,
    F: FnMut(&mut Leaf<V>),
{
    match node {
        Node::Leaf(leaf) => visitor(leaf),
        Node::Branch(children) => {
            for (q, child) in children.iter_mut().enumerate() {
                let Some(child) = child else { continue };
                let child_rect = quadrant_bounds(rect, q);
                if shape.intersects(&child_rect) {
                    visit_mut(&child_rect, shape, child, visitor);
                }
            }
        }
    }
}
