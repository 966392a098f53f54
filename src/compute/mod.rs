//! Compute layer: the spatial key codec, the quad-tree built on it and the
//! validation shared by both.
//!
//! Nothing here measures distances; query shapes come from
//! [`crate::spatial`].

pub mod spatial;
pub mod validation;
