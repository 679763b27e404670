// crates/pp_selafin/src/config.rs

//! 写入器配置
//!
//! 默认值在构造写入器时显式传入，不存在进程级可变的默认状态。

use serde::{Deserialize, Serialize};

use crate::header::SelafinDate;
use crate::precision::{ByteOrder, Precision};

/// SELAFIN 写入器配置
///
/// 可从 JSON 反序列化，缺省字段取默认值：
///
/// ```json
/// { "byte_order": "big", "precision": "f32", "default_date": [1997, 8, 29, 2, 15, 0] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelafinConfig {
    /// 输出字节序
    #[serde(default)]
    pub byte_order: ByteOrder,

    /// 输出浮点精度
    #[serde(default)]
    pub precision: Precision,

    /// `iparam[9] == 1` 但未设置日期时写入的日期
    #[serde(default = "default_date")]
    pub default_date: SelafinDate,
}

fn default_date() -> SelafinDate {
    SelafinDate::new(1997, 8, 29, 2, 15, 0)
}

impl Default for SelafinConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::default(),
            precision: Precision::default(),
            default_date: default_date(),
        }
    }
}

impl SelafinConfig {
    /// 双精度配置
    pub fn double() -> Self {
        Self {
            precision: Precision::F64,
            ..Self::default()
        }
    }

    /// 设置字节序
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// 设置精度
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// 设置默认日期
    pub fn with_default_date(mut self, date: SelafinDate) -> Self {
        self.default_date = date;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SelafinConfig::default();
        assert_eq!(cfg.byte_order, ByteOrder::Big);
        assert_eq!(cfg.precision, Precision::F32);
        assert_eq!(cfg.default_date.to_array(), [1997, 8, 29, 2, 15, 0]);
    }

    #[test]
    fn test_partial_json() {
        let cfg: SelafinConfig =
            serde_json::from_str(r#"{ "precision": "f64", "byte_order": "little" }"#).unwrap();
        assert_eq!(cfg.precision, Precision::F64);
        assert_eq!(cfg.byte_order, ByteOrder::Little);
        assert_eq!(cfg.default_date, SelafinConfig::default().default_date);
    }

    #[test]
    fn test_date_json_array() {
        let cfg: SelafinConfig =
            serde_json::from_str(r#"{ "default_date": [2020, 1, 2, 3, 4, 5] }"#).unwrap();
        assert_eq!(cfg.default_date.year, 2020);
        assert_eq!(cfg.default_date.second, 5);
    }
}
