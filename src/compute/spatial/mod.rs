pub mod key;
pub mod quadtree;

pub use key::SpatialKeyAlgo;
pub use quadtree::QuadTree;
