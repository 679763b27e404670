// crates/pp_foundation/src/lib.rs

//! PPUTILS Foundation Layer
//!
//! 基础层，提供整个工具箱共享的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`index`]: 文件 1 基索引与内存 0 基索引之间的转换
//! - [`validation`]: 网格输入验证报告
//!
//! # 索引约定
//!
//! 所有内存中的节点索引均为 0 基。SELAFIN 的 IKLE 块与 ADCIRC 文本中的
//! 节点编号为 1 基，转换只在读写边界通过 [`index`] 完成一次。
//!
//! # 示例
//!
//! ```
//! use pp_foundation::index::{from_one_based, to_one_based};
//!
//! let zero = from_one_based(&[1, 2, 3], 3).unwrap();
//! assert_eq!(zero, vec![0, 1, 2]);
//! assert_eq!(to_one_based(&zero).unwrap(), vec![1, 2, 3]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod validation;

// 重导出常用类型
pub use error::{PpError, PpResult};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
