// crates/pp_mesh/src/io/bnd.rs

//! gredit 边界多边形文件 (`.bnd`)
//!
//! ```text
//! 多边形数
//! 节点数 类型        (类型 0 = 外边界, 1 = 岛屿)
//! 节点编号            (1 基, 每行一个)
//! ...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use pp_foundation::index::{one_based, zero_based};

use crate::algorithms::boundary::BoundaryLoop;
use crate::error::{MeshError, MeshResult};

const FORMAT: &str = "bnd";

/// 多边形类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonKind {
    /// 外边界
    Exterior,
    /// 岛屿
    Island,
}

impl PolygonKind {
    /// 文件中的类型代码
    pub fn code(&self) -> i32 {
        match self {
            Self::Exterior => 0,
            Self::Island => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Exterior),
            1 => Some(Self::Island),
            _ => None,
        }
    }
}

/// 边界多边形
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BndPolygon {
    pub kind: PolygonKind,
    /// 节点索引 (0 基)
    pub nodes: Vec<usize>,
}

/// 边界多边形文件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BndFile {
    pub polygons: Vec<BndPolygon>,
}

impl BndFile {
    /// 由边界循环构造
    pub fn from_loops(loops: &[BoundaryLoop]) -> Self {
        Self {
            polygons: loops
                .iter()
                .map(|l| BndPolygon {
                    kind: if l.is_outer {
                        PolygonKind::Exterior
                    } else {
                        PolygonKind::Island
                    },
                    nodes: l.nodes.clone(),
                })
                .collect(),
        }
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
        // 跳过空行，保留原始行号
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, l)| l.map(|s| (i + 1, s)))
            .filter(|r| r.as_ref().map_or(true, |(_, s)| !s.trim().is_empty()));
        let mut last_line = 0;

        let mut next = |what: &str| -> MeshResult<(usize, Vec<i64>)> {
            let (line, text) = match lines.next() {
                Some(r) => r?,
                None => {
                    return Err(MeshError::format(
                        FORMAT,
                        file.clone(),
                        last_line + 1,
                        format!("文件提前结束, 缺少{}", what),
                    ))
                }
            };
            last_line = line;
            let values = text
                .split_whitespace()
                .map(|t| t.parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| {
                    MeshError::format(FORMAT, file.clone(), line, format!("无法解析{}: {:?}", what, text))
                })?;
            Ok((line, values))
        };

        let (line, count) = next("多边形数")?;
        let n_polygons = positive(&file, line, count.first().copied(), "多边形数")?;

        // 计数来自文件，不据此预分配
        let mut polygons = Vec::new();
        for _ in 0..n_polygons {
            let (line, head) = next("多边形头")?;
            let size = positive(&file, line, head.first().copied(), "多边形节点数")?;
            let code = head.get(1).copied().unwrap_or(0);
            let kind = i32::try_from(code)
                .ok()
                .and_then(PolygonKind::from_code)
                .ok_or_else(|| {
                    MeshError::format(FORMAT, file.clone(), line, format!("未知多边形类型 {}", code))
                })?;

            let mut nodes = Vec::new();
            for _ in 0..size {
                let (line, v) = next("节点编号")?;
                let raw = v.first().copied().ok_or_else(|| {
                    MeshError::format(FORMAT, file.clone(), line, "缺少节点编号")
                })?;
                let node = zero_based(raw)
                    .map_err(|e| MeshError::format(FORMAT, file.clone(), line, e.to_string()))?;
                nodes.push(node);
            }
            polygons.push(BndPolygon { kind, nodes });
        }

        Ok(Self { polygons })
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
        writeln!(writer, "{}", self.polygons.len())?;
        for p in &self.polygons {
            writeln!(writer, "{} {}", p.nodes.len(), p.kind.code())?;
            for &v in &p.nodes {
                writeln!(writer, "{}", one_based(v))?;
            }
        }
        Ok(())
    }
}

fn positive(file: &Path, line: usize, v: Option<i64>, what: &str) -> MeshResult<usize> {
    match v {
        Some(v) if v >= 0 => Ok(v as usize),
        Some(v) => Err(MeshError::format(FORMAT, file, line, format!("{}为负数: {}", what, v))),
        None => Err(MeshError::format(FORMAT, file, line, format!("缺少{}", what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BND: &str = "2\n4 0\n1\n2\n4\n3\n3 1\n5\n7\n6\n";

    #[test]
    fn test_load() {
        let bnd = BndFile::load_from_reader(Cursor::new(BND)).unwrap();
        assert_eq!(bnd.polygons.len(), 2);
        assert_eq!(bnd.polygons[0].kind, PolygonKind::Exterior);
        assert_eq!(bnd.polygons[0].nodes, vec![0, 1, 3, 2]);
        assert_eq!(bnd.polygons[1].kind, PolygonKind::Island);
        assert_eq!(bnd.polygons[1].nodes, vec![4, 6, 5]);
    }

    #[test]
    fn test_roundtrip() {
        let bnd = BndFile::load_from_reader(Cursor::new(BND)).unwrap();
        let mut buffer = Vec::new();
        bnd.write_to(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), BND);
    }

    #[test]
    fn test_errors_carry_line() {
        let err = BndFile::load_from_reader(Cursor::new("1\n3 0\n1\n\nx\n")).unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 5, .. }));

        let err = BndFile::load_from_reader(Cursor::new("1\n2 7\n1\n2\n")).unwrap_err();
        assert!(err.to_string().contains("未知多边形类型 7"));

        let err = BndFile::load_from_reader(Cursor::new("1\n3 0\n1\n2\n")).unwrap_err();
        assert!(err.to_string().contains("文件提前结束"));
    }

    #[test]
    fn test_zero_node_id_rejected() {
        let err = BndFile::load_from_reader(Cursor::new("1
3 0
1
0
2
")).unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 4, .. }));
    }

    #[test]
    fn test_huge_counts_fail_at_end_of_file() {
        let err = BndFile::load_from_reader(Cursor::new("99999999999999\n4 0\n1\n")).unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 4, .. }));

        let err = BndFile::load_from_reader(Cursor::new("1\n99999999999999 0\n1\n")).unwrap_err();
        assert!(err.to_string().contains("文件提前结束"));
    }
}
