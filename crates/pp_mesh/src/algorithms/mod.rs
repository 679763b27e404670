// crates/pp_mesh/src/algorithms/mod.rs

//! 网格算法

pub mod boundary;

pub use boundary::{BoundaryExtractor, BoundaryLoop, BoundingBox2D};
