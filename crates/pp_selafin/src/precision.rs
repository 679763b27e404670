// crates/pp_selafin/src/precision.rs

//! 浮点精度与字节序
//!
//! SELAFIN 文件的浮点宽度（4 或 8 字节）与字节序在整个文件内保持一致。
//! 读取时二者均为自动检测，写入时由 [`SelafinConfig`](crate::SelafinConfig)
//! 或写入器的 setter 指定。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{SelafinError, SelafinResult};

/// 文件浮点精度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 单精度 (4 字节)，TELEMAC 默认输出格式
    #[default]
    F32,
    /// 双精度 (8 字节)
    F64,
}

impl Precision {
    /// 获取精度名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// 每个浮点值占用的字节数
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// 从格式码与字节宽度构造，如 `('f', 4)` 或 `('d', 8)`
    pub fn from_code(code: char, size: usize) -> SelafinResult<Self> {
        match (code.to_ascii_lowercase(), size) {
            ('f', 4) => Ok(Self::F32),
            ('d', 8) => Ok(Self::F64),
            _ => Err(SelafinError::configuration(format!(
                "无效的精度设置 ('{}', {}), 期望 ('f', 4) 或 ('d', 8)",
                code, size
            ))),
        }
    }

    /// 格式码 (`'f'` 或 `'d'`)
    pub fn code(&self) -> char {
        match self {
            Self::F32 => 'f',
            Self::F64 => 'd',
        }
    }

    /// 由字节宽度推断精度
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            4 => Some(Self::F32),
            8 => Some(Self::F64),
            _ => None,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Precision {
    type Err = SelafinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f" | "f32" | "float" | "single" => Ok(Self::F32),
            "d" | "f64" | "double" => Ok(Self::F64),
            _ => Err(SelafinError::configuration(format!(
                "无效的精度值: '{}', 期望 'single' 或 'double'",
                s
            ))),
        }
    }
}

/// 文件字节序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// 大端（Fortran 顺序文件在 TELEMAC 中的约定）
    #[default]
    Big,
    /// 小端
    Little,
}

impl ByteOrder {
    /// 获取名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Big => "big",
            Self::Little => "little",
        }
    }

    /// 解码 32 位整数
    #[inline]
    pub fn i32_from(&self, b: [u8; 4]) -> i32 {
        match self {
            Self::Big => i32::from_be_bytes(b),
            Self::Little => i32::from_le_bytes(b),
        }
    }

    /// 编码 32 位整数
    #[inline]
    pub fn i32_to(&self, v: i32) -> [u8; 4] {
        match self {
            Self::Big => v.to_be_bytes(),
            Self::Little => v.to_le_bytes(),
        }
    }

    /// 解码单精度浮点
    #[inline]
    pub fn f32_from(&self, b: [u8; 4]) -> f32 {
        match self {
            Self::Big => f32::from_be_bytes(b),
            Self::Little => f32::from_le_bytes(b),
        }
    }

    /// 解码双精度浮点
    #[inline]
    pub fn f64_from(&self, b: [u8; 8]) -> f64 {
        match self {
            Self::Big => f64::from_be_bytes(b),
            Self::Little => f64::from_le_bytes(b),
        }
    }

    /// 按精度解码一个浮点值，`bytes` 长度必须等于精度宽度
    #[inline]
    pub fn float_from(&self, bytes: &[u8], precision: Precision) -> f64 {
        match precision {
            Precision::F32 => {
                let mut b = [0u8; 4];
                b.copy_from_slice(&bytes[..4]);
                self.f32_from(b) as f64
            }
            Precision::F64 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(&bytes[..8]);
                self.f64_from(b)
            }
        }
    }

    /// 按精度编码一个浮点值并追加到缓冲区
    #[inline]
    pub fn push_float(&self, buf: &mut Vec<u8>, v: f64, precision: Precision) {
        match (precision, self) {
            (Precision::F32, Self::Big) => buf.extend_from_slice(&(v as f32).to_be_bytes()),
            (Precision::F32, Self::Little) => buf.extend_from_slice(&(v as f32).to_le_bytes()),
            (Precision::F64, Self::Big) => buf.extend_from_slice(&v.to_be_bytes()),
            (Precision::F64, Self::Little) => buf.extend_from_slice(&v.to_le_bytes()),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ByteOrder {
    type Err = SelafinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "big" | "be" | ">" => Ok(Self::Big),
            "little" | "le" | "<" => Ok(Self::Little),
            _ => Err(SelafinError::configuration(format!(
                "无效的字节序: '{}', 期望 'big' 或 'little'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_from_code() {
        assert_eq!(Precision::from_code('f', 4).unwrap(), Precision::F32);
        assert_eq!(Precision::from_code('d', 8).unwrap(), Precision::F64);
        assert!(Precision::from_code('f', 8).is_err());
    }

    #[test]
    fn test_precision_parse() {
        assert_eq!("double".parse::<Precision>().unwrap(), Precision::F64);
        assert_eq!("F32".parse::<Precision>().unwrap(), Precision::F32);
        assert!("half".parse::<Precision>().is_err());
    }

    #[test]
    fn test_byte_order_i32() {
        let v = 80;
        assert_eq!(ByteOrder::Big.i32_to(v), [0, 0, 0, 80]);
        assert_eq!(ByteOrder::Little.i32_to(v), [80, 0, 0, 0]);
        assert_eq!(ByteOrder::Big.i32_from([0, 0, 0, 80]), 80);
    }

    #[test]
    fn test_float_codec() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            for precision in [Precision::F32, Precision::F64] {
                let mut buf = Vec::new();
                order.push_float(&mut buf, 1.5, precision);
                assert_eq!(buf.len(), precision.size_bytes());
                assert_eq!(order.float_from(&buf, precision), 1.5);
            }
        }
    }
}
