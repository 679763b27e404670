// crates/pp_mesh/src/error.rs
//! 网格处理错误类型
//!
//! 包含文本格式解析与网格拓扑错误定义。

use std::path::PathBuf;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 文本格式错误，行号从 1 开始
    #[error("网格格式错误: {format}, {}, 行 {line}: {message}", file.display())]
    Format {
        format: &'static str,
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        operation: &'static str,
        details: String,
    },

    /// 数组长度不匹配
    #[error("长度不匹配: {name} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 底层 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub fn format(
        format: &'static str,
        file: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            format,
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }
}
