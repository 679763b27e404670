// crates/pp_mesh/src/io/cli.rs

//! TELEMAC 边界条件文件 (`.cli`)
//!
//! 每个边界节点一行，顺序与 IPOBO 编号一致：
//!
//! ```text
//! LIHBOR LIUBOR LIVBOR HBOR UBOR VBOR AUBOR LITBOR TBOR ATBOR BTBOR N K
//! ```
//!
//! `N` 为全局节点编号 (1 基)，`K` 为边界节点序号 (1 基)。第 13 列之后的内容
//! （如 `#` 注释）读取时忽略。

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use pp_foundation::index::{one_based, zero_based};

use crate::error::{MeshError, MeshResult};

const FORMAT: &str = "cli";

/// 边界类型代码
pub mod codes {
    /// 固壁
    pub const SOLID: i32 = 2;
    /// 自由
    pub const FREE: i32 = 4;
    /// 给定值
    pub const PRESCRIBED: i32 = 5;
    /// 入射波
    pub const INCIDENT_WAVE: i32 = 6;
}

/// 一个边界节点的边界条件
#[derive(Debug, Clone, PartialEq)]
pub struct CliRecord {
    pub lihbor: i32,
    pub liubor: i32,
    pub livbor: i32,
    pub hbor: f64,
    pub ubor: f64,
    pub vbor: f64,
    pub aubor: f64,
    pub litbor: i32,
    pub tbor: f64,
    pub atbor: f64,
    pub btbor: f64,
    /// 全局节点索引 (0 基)
    pub node: usize,
}

impl CliRecord {
    /// 固壁边界节点
    pub fn land(node: usize) -> Self {
        Self {
            lihbor: codes::SOLID,
            liubor: codes::SOLID,
            livbor: codes::SOLID,
            hbor: 0.0,
            ubor: 0.0,
            vbor: 0.0,
            aubor: 0.0,
            litbor: codes::SOLID,
            tbor: 0.0,
            atbor: 0.0,
            btbor: 0.0,
            node,
        }
    }
}

/// 边界条件文件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliFile {
    /// 按边界序号排列
    pub records: Vec<CliRecord>,
}

impl CliFile {
    /// 全部为固壁条件的文件，`boundary_nodes` 按 IPOBO 顺序给出
    pub fn land(boundary_nodes: &[usize]) -> Self {
        Self {
            records: boundary_nodes.iter().map(|&n| CliRecord::land(n)).collect(),
        }
    }

    /// 边界节点数 NPTFR
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 读取文件
    pub fn load<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read(BufReader::new(file), path.to_path_buf())
    }

    /// 从 reader 读取
    pub fn load_from_reader<R: BufRead>(reader: R) -> MeshResult<Self> {
        Self::read(reader, PathBuf::from("<stream>"))
    }

    fn read<R: BufRead>(reader: R, file: PathBuf) -> MeshResult<Self> {
        let mut records = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let lineno = i + 1;
            let text = line.split('#').next().unwrap_or("").trim();
            if text.is_empty() {
                continue;
            }

            let t: Vec<&str> = text.split_whitespace().collect();
            if t.len() < 13 {
                return Err(MeshError::format(
                    FORMAT,
                    file.clone(),
                    lineno,
                    format!("需要 13 列, 实际 {} 列", t.len()),
                ));
            }
            let err = |col: usize| {
                MeshError::format(
                    FORMAT,
                    file.clone(),
                    lineno,
                    format!("第 {} 列无法解析: {:?}", col + 1, t[col]),
                )
            };
            let int = |col: usize| t[col].parse::<i32>().map_err(|_| err(col));
            let float = |col: usize| t[col].parse::<f64>().map_err(|_| err(col));

            let node = t[11]
                .parse::<i64>()
                .ok()
                .and_then(|n| zero_based(n).ok())
                .ok_or_else(|| err(11))?;
            let k = t[12].parse::<usize>().map_err(|_| err(12))?;
            if k != one_based(records.len()) {
                log::warn!(
                    "{}:{} 边界序号为 {}, 期望 {}",
                    file.display(),
                    lineno,
                    k,
                    one_based(records.len())
                );
            }

            records.push(CliRecord {
                lihbor: int(0)?,
                liubor: int(1)?,
                livbor: int(2)?,
                hbor: float(3)?,
                ubor: float(4)?,
                vbor: float(5)?,
                aubor: float(6)?,
                litbor: int(7)?,
                tbor: float(8)?,
                atbor: float(9)?,
                btbor: float(10)?,
                node,
            });
        }

        Ok(Self { records })
    }

    /// 写入文件
    pub fn write<P: AsRef<Path>>(&self, path: P) -> MeshResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// 写入到 writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> MeshResult<()> {
        for (k, r) in self.records.iter().enumerate() {
            writeln!(
                writer,
                "{} {} {} {:.3} {:.3} {:.3} {:.3} {} {:.3} {:.3} {:.3} {} {}",
                r.lihbor,
                r.liubor,
                r.livbor,
                r.hbor,
                r.ubor,
                r.vbor,
                r.aubor,
                r.litbor,
                r.tbor,
                r.atbor,
                r.btbor,
                one_based(r.node),
                one_based(k)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_land_file() {
        let cli = CliFile::land(&[0, 1, 3, 2]);
        let mut buffer = Vec::new();
        cli.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "2 2 2 0.000 0.000 0.000 0.000 2 0.000 0.000 0.000 1 1");
        assert_eq!(text.lines().nth(2).unwrap().split_whitespace().nth(11), Some("4"));
    }

    #[test]
    fn test_roundtrip_with_comments() {
        let text = "5 4 4 1.500 0.000 0.000 0.000 4 0.000 0.000 0.000 7 1 # open\n\
                    2 2 2 0.000 0.000 0.000 0.000 2 0.000 0.000 0.000 3 2\n";
        let cli = CliFile::load_from_reader(Cursor::new(text)).unwrap();
        assert_eq!(cli.len(), 2);
        assert_eq!(cli.records[0].lihbor, codes::PRESCRIBED);
        assert_eq!(cli.records[0].hbor, 1.5);
        assert_eq!(cli.records[0].node, 6);

        let mut buffer = Vec::new();
        cli.write_to(&mut buffer).unwrap();
        let again = CliFile::load_from_reader(Cursor::new(buffer)).unwrap();
        assert_eq!(again, cli);
    }

    #[test]
    fn test_bad_lines() {
        let err = CliFile::load_from_reader(Cursor::new("2 2 2\n")).unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 1, .. }));

        let err = CliFile::load_from_reader(Cursor::new(
            "\n2 2 x 0 0 0 0 2 0 0 0 1 1\n",
        ))
        .unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 2, .. }));
        assert!(err.to_string().contains("第 3 列"));

        let err = CliFile::load_from_reader(Cursor::new("2 2 2 0 0 0 0 2 0 0 0 0 1\n")).unwrap_err();
        assert!(err.to_string().contains("第 12 列"));
    }
}
