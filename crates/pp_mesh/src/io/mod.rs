// crates/pp_mesh/src/io/mod.rs

//! 网格文本格式读写

pub mod adcirc;
pub mod bnd;
pub mod cli;

pub use adcirc::{AdcircLoader, AdcircWriter};
pub use bnd::{BndFile, BndPolygon, PolygonKind};
pub use cli::{CliFile, CliRecord};
