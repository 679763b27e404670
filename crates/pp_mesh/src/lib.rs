// crates/pp_mesh/src/lib.rs

//! PPUTILS 网格工具
//!
//! - [`mesh`]: 二维三角网格与输入检查
//! - [`io`]: ADCIRC 网格、gredit 边界多边形与 TELEMAC `.cli` 文件
//! - [`algorithms`]: 边界提取与边界节点编号
//!
//! 节点索引在内存中均为 0 基，文本文件中的 1 基编号在读写时转换。

pub mod algorithms;
pub mod error;
pub mod io;
pub mod mesh;

pub use algorithms::{BoundaryExtractor, BoundaryLoop};
pub use error::{MeshError, MeshResult};
pub use mesh::TriMesh;
