//! Quad-tree nodes and the bit-pair to quadrant mapping.
//!
//! Quadrants are numbered by the two key bits they consume, latitude bit
//! first. Latitude grows upwards, so:
//!
//! ```text
//!  10 | 11
//! ----+----
//!  00 | 01
//! ```
//!
//! [`quadrant`] (insertion) and [`quadrant_bounds`] (queries) are the only
//! two places that know this numbering.

use geoquad_types::bbox::BBox;

/// Number of children of a branch.
pub(crate) const QUADRANTS: usize = 4;

/// Quadrant selected by the bit pair whose latitude bit is `lat_bit`.
///
/// The longitude bit is the next lower bit.
#[inline]
pub(crate) fn quadrant(key: u64, lat_bit: u64) -> usize {
    let lat = (key & lat_bit != 0) as usize;
    let lon = (key & (lat_bit >> 1) != 0) as usize;
    (lat << 1) | lon
}

/// The part of `rect` covered by `quadrant`.
///
/// Midpoints are computed the way the key codec bisects, so a coordinate that
/// encodes into a quadrant lies inside that quadrant's rectangle.
pub(crate) fn quadrant_bounds(rect: &BBox, quadrant: usize) -> BBox {
    let mid_lat = (rect.min_lat + rect.max_lat) / 2.0;
    let mid_lon = (rect.min_lon + rect.max_lon) / 2.0;

    let (min_lat, max_lat) = if quadrant & 0b10 != 0 {
        (mid_lat, rect.max_lat)
    } else {
        (rect.min_lat, mid_lat)
    };
    let (min_lon, max_lon) = if quadrant & 0b01 != 0 {
        (mid_lon, rect.max_lon)
    } else {
        (rect.min_lon, mid_lon)
    };

    BBox::new(min_lon, min_lat, max_lon, max_lat)
}

/// A packed, bounded run of `(key, value)` entries.
///
/// Occupied entries are always contiguous from index 0; removal shifts later
/// entries left. `capacity` is the logical slot count, not the `Vec`'s.
#[derive(Debug)]
pub(crate) struct Leaf<V> {
    entries: Vec<(u64, V)>,
    capacity: usize,
}

impl<V> Leaf<V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Leaf holding `entries`, with room for at least all of them.
    pub(crate) fn from_entries(entries: Vec<(u64, V)>, capacity: usize) -> Self {
        let capacity = capacity.max(entries.len());
        Self { entries, capacity }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Append after the last occupied slot. Hands the entry back when full.
    pub(crate) fn try_push(&mut self, key: u64, value: V) -> Result<(), (u64, V)> {
        if self.is_full() {
            return Err((key, value));
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Add one slot and append into it.
    pub(crate) fn grow_and_push(&mut self, key: u64, value: V) {
        self.capacity += 1;
        self.entries.push((key, value));
    }

    /// Remove every entry stored under `key`, compacting the rest in order.
    pub(crate) fn remove_key(&mut self, key: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        before - self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u64, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Move all entries out, leaving the leaf empty.
    pub(crate) fn take_entries(&mut self) -> Vec<(u64, V)> {
        std::mem::take(&mut self.entries)
    }
}

/// Either four optional children or a packed leaf.
#[derive(Debug)]
pub(crate) enum Node<V> {
    Branch(Box<[Option<Node<V>>; QUADRANTS]>),
    Leaf(Leaf<V>),
}

impl<V> Node<V> {
    /// Number of nodes in this subtree, this one included.
    pub(crate) fn count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(children) => {
                1 + children.iter().flatten().map(Node::count).sum::<usize>()
            }
        }
    }

    /// Number of entries stored in this subtree.
    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Branch(children) => children.iter().flatten().map(Node::entry_count).sum(),
        }
    }

    /// Unused child slots, plus unused leaf slots unless `only_branches`.
    pub(crate) fn empty_entries(&self, only_branches: bool) -> usize {
        match self {
            Node::Leaf(_) if only_branches => 0,
            Node::Leaf(leaf) => leaf.capacity() - leaf.len(),
            Node::Branch(children) => children
                .iter()
                .map(|child| match child {
                    Some(node) => node.empty_entries(only_branches),
                    None => 1,
                })
                .sum(),
        }
    }

    /// Estimated heap footprint of this subtree, excluding value payloads.
    ///
    /// `factor` is 1 for 32-bit and 2 for 64-bit references. A leaf is
    /// counted as one object holding a key array and a value reference array
    /// sized to its capacity; a branch as one object holding four references.
    pub(crate) fn memory_usage(&self, factor: usize) -> usize {
        match self {
            Node::Leaf(leaf) => {
                size_of_object_ref(factor)
                    + size_of_long_array(leaf.capacity(), factor)
                    + size_of_object_array(leaf.capacity(), factor)
            }
            Node::Branch(children) => {
                size_of_object_ref(factor)
                    + size_of_object_array(QUADRANTS, factor)
                    + children
                        .iter()
                        .flatten()
                        .map(|child| child.memory_usage(factor))
                        .sum::<usize>()
            }
        }
    }

    /// Depth of the deepest node below this one; a lone leaf has depth 0.
    pub(crate) fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Branch(children) => {
                1 + children.iter().flatten().map(Node::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Object header: class pointer, flags and lock word.
pub(crate) fn size_of_object_ref(factor: usize) -> usize {
    factor * (4 + 4 + 4)
}

/// Header plus length word, then 8 bytes per key.
pub(crate) fn size_of_long_array(len: usize, factor: usize) -> usize {
    factor * (4 + 4 + 4 + 4) + 8 * len
}

/// Header plus length word, then one compressed reference per slot.
pub(crate) fn size_of_object_array(len: usize, factor: usize) -> usize {
    factor * (4 + 4 + 4 + 4) + 4 * len
}
