// crates/pp_foundation/src/error.rs

//! 错误处理模块
//!
//! 提供 `PpError` 枚举和 `PpResult` 类型别名，描述索引约定转换中的失败。
//! 各格式模块定义自己的错误枚举，在读写边界处把 `PpError` 映射为带记录名或行号的格式错误。
//!
//! # 示例
//!
//! ```
//! use pp_foundation::error::{PpError, PpResult};
//!
//! fn check_node(i: usize) -> PpResult<()> {
//!     PpError::check_index("node", i, 4)
//! }
//!
//! assert!(check_node(3).is_ok());
//! assert!(check_node(4).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type PpResult<T> = Result<T, PpError>;

/// PPUTILS 错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PpError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },
}

impl PpError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> PpResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}
