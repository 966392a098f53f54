//! # geoquad-types
//!
//! Core coordinate and shape types shared by the geoquad index.
//!
//! - **Rectangles and shapes**: `BBox`, the `Shape` trait
//! - **Points**: `GeoPoint`, and `GeoEntry` for query results
//!
//! All coordinates are in degrees. Latitude is the y axis, longitude the x axis.
//!
//! ## Examples
//!
//! ```rust
//! use geoquad_types::bbox::{BBox, Shape};
//!
//! let area = BBox::new(10.0, 50.0, 11.0, 51.0);
//! assert!(area.contains(50.5, 10.5));
//! assert!(area.intersects(&BBox::create_earth_max()));
//! ```

pub mod bbox;
pub mod point;
