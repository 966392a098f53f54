//! In-memory geospatial point index: a bit-interleaved spatial key codec and
//! a quad-tree over its keys.
//!
//! ```rust
//! use geoquad::{BBox, QuadTree};
//!
//! let mut tree = QuadTree::new(4, 64)?;
//! tree.add(40.7128, -74.0060, "nyc")?;
//! tree.add(40.7128, -74.0060, "nyc-again")?;
//! tree.add(34.0522, -118.2437, "la")?;
//!
//! assert_eq!(tree.get_nodes_from_value(40.7128, -74.0060, None).len(), 2);
//! let nearby = tree.get_nodes(40.71, -74.0, 2000.0)?;
//! assert_eq!(nearby.len(), 2);
//!
//! let west = tree.get_nodes_in(&BBox::new(-125.0, 30.0, -110.0, 40.0));
//! assert_eq!(*west[0].value(), "la");
//!
//! assert_eq!(tree.remove(40.7128, -74.0060), 2);
//! # Ok::<(), geoquad::GeoQuadError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod error;
pub mod spatial;
pub mod spatial_index;
pub mod types;

pub use builder::QuadTreeBuilder;
pub use compute::spatial::{QuadTree, SpatialKeyAlgo};
pub use error::{GeoQuadError, Result};

pub use geoquad_types::bbox::{BBox, Shape};
pub use geoquad_types::point::{GeoEntry, GeoPoint};

pub use spatial::{Circle, DistanceCalc, DistanceMetric};

pub use spatial_index::{IndexStats, SpatialIndex};

pub use types::Config;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoQuadError, QuadTree, QuadTreeBuilder, Result};

    pub use crate::{BBox, GeoEntry, GeoPoint, Shape};

    pub use crate::spatial::{Circle, DistanceCalc, DistanceMetric};

    pub use crate::{Config, SpatialIndex};
}
