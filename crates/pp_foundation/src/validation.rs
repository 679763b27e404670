// crates/pp_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于转换前检查网格数据。
//!
//! # 示例
//!
//! ```
//! use pp_foundation::validation::{ValidationReport, ValidationError};
//!
//! let x = f64::NAN;
//! let mut report = ValidationReport::new();
//! if !x.is_finite() {
//!     report.add_error(ValidationError::NonFinite {
//!         field: "x",
//!         node_id: 0,
//!         value: x,
//!     });
//! }
//!
//! assert!(report.has_errors());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: &'static str,
        /// 所在节点 ID (0 基)
        node_id: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 拓扑错误
    TopologyError {
        /// 错误描述
        message: String,
        /// 可选的单元 ID (0 基)
        element_id: Option<usize>,
    },
    /// 一致性错误
    ConsistencyError {
        /// 错误描述
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                node_id,
                value,
            } => {
                write!(f, "节点{}: 字段{}={} (非有限值)", node_id, field, value)
            }
            Self::TopologyError { message, element_id } => {
                if let Some(id) = element_id {
                    write!(f, "单元{}: 拓扑错误: {}", id, message)
                } else {
                    write!(f, "拓扑错误: {}", message)
                }
            }
            Self::ConsistencyError { message } => {
                write!(f, "一致性错误: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// 退化单元（面积接近零）
    DegenerateElement {
        /// 单元 ID (0 基)
        element_id: usize,
        /// 有符号面积
        area: f64,
    },
    /// 顺时针单元
    ClockwiseElement {
        /// 单元 ID (0 基)
        element_id: usize,
    },
    /// 孤立节点（未被任何单元引用）
    OrphanNode {
        /// 节点 ID (0 基)
        node_id: usize,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateElement { element_id, area } => {
                write!(f, "单元{}: 面积 {:.3e} 接近零", element_id, area)
            }
            Self::ClockwiseElement { element_id } => {
                write!(f, "单元{}: 节点顺序为顺时针", element_id)
            }
            Self::OrphanNode { node_id } => {
                write!(f, "节点{}: 未被任何单元引用", node_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());

        report.add_warning(ValidationWarning::OrphanNode { node_id: 3 });
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);

        report.add_error(ValidationError::ConsistencyError {
            message: "x 与 y 长度不一致".into(),
        });
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_merge_and_display() {
        let mut a = ValidationReport::new();
        a.add_error(ValidationError::TopologyError {
            message: "重复节点".into(),
            element_id: Some(7),
        });
        let mut b = ValidationReport::new();
        b.add_warning(ValidationWarning::ClockwiseElement { element_id: 2 });
        a.merge(b);

        let text = a.to_string();
        assert!(text.contains("单元7"));
        assert!(text.contains("单元2"));
    }
}
