// crates/pp_selafin/src/lib.rs

//! SELAFIN (TELEMAC) 二进制网格与时间序列读写
//!
//! # 模块
//!
//! - [`framing`]: 首尾长度标记包裹的记录读写
//! - [`header`]: 文件头结构与解析
//! - [`reader`]: 时间步目录与随机访问读取
//! - [`writer`]: 按顺序写出文件头与时间步
//! - [`precision`]: 浮点精度与字节序
//! - [`config`]: 写入器配置
//!
//! # 示例
//!
//! ```
//! use std::io::Cursor;
//! use pp_selafin::{SelafinConfig, SelafinReader, SelafinWriter};
//!
//! let mut w = SelafinWriter::new(Vec::new(), SelafinConfig::default());
//! w.set_title("DEMO").unwrap();
//! w.set_variable_names(&["BOTTOM"]).unwrap();
//! w.set_variable_units(&["M"]).unwrap();
//! w.set_mesh(1, 3, 3, vec![0, 1, 2], vec![1, 2, 3],
//!            vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]).unwrap();
//! w.write_header().unwrap();
//! w.write_timestep(0.0, &[[-1.0, -2.0, -3.0]]).unwrap();
//! let bytes = w.finish().unwrap();
//!
//! let mut r = SelafinReader::new(Cursor::new(bytes)).unwrap();
//! assert_eq!(r.times(), &[0.0]);
//! assert_eq!(r.read_variables_at(0).unwrap()[0], vec![-1.0, -2.0, -3.0]);
//! ```

pub mod config;
pub mod error;
pub mod framing;
pub mod header;
pub mod precision;
pub mod reader;
pub mod writer;

pub use config::SelafinConfig;
pub use error::{SelafinError, SelafinResult};
pub use header::{FileLayout, SelafinDate, SelafinHeader, VariableInfo};
pub use precision::{ByteOrder, Precision};
pub use reader::{SelafinReader, TimeDirectory};
pub use writer::{SelafinWriter, WriterState};
