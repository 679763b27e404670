// crates/pp_foundation/src/index.rs

//! 索引约定转换
//!
//! 网格文件（SELAFIN IKLE、ADCIRC 单元行）中的节点编号为 1 基 32 位整数，
//! 内存中统一使用 0 基 `usize`。本模块是唯一执行 ±1 转换的地方。
//!
//! # 示例
//!
//! ```
//! use pp_foundation::index::{from_one_based, to_one_based};
//!
//! let ikle = from_one_based(&[1, 3, 2, 2, 3, 4], 4).unwrap();
//! assert!(ikle.iter().all(|&n| n < 4));
//!
//! let raw = to_one_based(&ikle).unwrap();
//! assert_eq!(raw, vec![1, 3, 2, 2, 3, 4]);
//! ```

use crate::error::{PpError, PpResult};

/// 单个 1 基编号转换为 0 基索引
///
/// 编号必须为正数，上界由调用方检查。
pub fn zero_based(raw: i64) -> PpResult<usize> {
    if raw < 1 {
        return Err(PpError::invalid_input(format!(
            "1 基编号必须为正数, 实际为 {}",
            raw
        )));
    }
    usize::try_from(raw - 1)
        .map_err(|_| PpError::invalid_input(format!("编号 {} 超出地址范围", raw)))
}

/// 单个 0 基索引转换为 1 基编号
#[inline]
pub fn one_based(index: usize) -> usize {
    index.saturating_add(1)
}

/// 将文件中的 1 基编号转换为 0 基索引
///
/// 每个值必须位于 `[1, len]`，否则返回错误，不做截断或替换。
pub fn from_one_based(raw: &[i32], len: usize) -> PpResult<Vec<usize>> {
    raw.iter()
        .map(|&v| {
            let idx = zero_based(i64::from(v))?;
            PpError::check_index("one_based", idx, len)?;
            Ok(idx)
        })
        .collect()
}

/// 将 0 基索引转换为文件中的 1 基编号
pub fn to_one_based(indices: &[usize]) -> PpResult<Vec<i32>> {
    indices
        .iter()
        .map(|&i| {
            i32::try_from(one_based(i)).map_err(|_| {
                PpError::invalid_input(format!("索引 {} 超出 32 位整数范围", i))
            })
        })
        .collect()
}
