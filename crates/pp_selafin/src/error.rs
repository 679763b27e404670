// crates/pp_selafin/src/error.rs
//! SELAFIN 读写错误类型
//!
//! 每个变体对应一种结构性失败，错误信息中给出出错的记录名称以及期望值与实际值，
//! 便于排查手工编辑或损坏的网格文件。

use thiserror::Error;

/// SELAFIN 模块结果类型
pub type SelafinResult<T> = Result<T, SelafinError>;

/// SELAFIN 错误枚举
#[derive(Error, Debug)]
pub enum SelafinError {
    /// 记录框架或长度标记不一致、无法识别的字节序或浮点宽度
    #[error("SELAFIN 格式错误 [{record}]: {message}")]
    Format {
        record: &'static str,
        message: String,
    },

    /// 数据流在记录中途结束
    #[error("SELAFIN 文件截断 [{record}]: 偏移 {offset} 处需要 {expected} 字节, 实际只读到 {found} 字节")]
    Truncated {
        record: &'static str,
        offset: u64,
        expected: usize,
        found: usize,
    },

    /// 时间步或节点索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfRange {
        index_type: &'static str,
        index: usize,
        len: usize,
    },

    /// 调用方提供的数组长度与网格不符
    #[error("数组形状不匹配: {name} 期望长度 {expected}, 实际 {actual}")]
    Shape {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// 写入器配置不一致
    #[error("写入配置错误: {0}")]
    Configuration(String),

    /// 写入器调用顺序错误
    #[error("调用顺序错误: {0}")]
    Sequence(String),

    /// 底层 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 便捷构造函数
impl SelafinError {
    pub fn format(record: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            record,
            message: message.into(),
        }
    }

    pub fn truncated(record: &'static str, offset: u64, expected: usize, found: usize) -> Self {
        Self::Truncated {
            record,
            offset,
            expected,
            found,
        }
    }

    pub fn index_out_of_range(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            index_type,
            index,
            len,
        }
    }

    pub fn shape(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::Shape {
            name: name.into(),
            expected,
            actual,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn sequence(message: impl Into<String>) -> Self {
        Self::Sequence(message.into())
    }

    /// 是否为记录级的数据损坏（框架错误或截断）
    ///
    /// 时间步扫描遇到此类错误时视为有效数据结束。
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Truncated { .. })
    }
}
