// crates/pp_mesh/src/io/adcirc.rs

//! ADCIRC 网格文本格式读写
//!
//! ```text
//! 标题
//! NE NP
//! id x y z          (NP 行)
//! id 3 n1 n2 n3     (NE 行, 节点编号 1 基)
//! [开边界/陆地边界段, 读取时忽略]
//! ```
//!
//! # 示例
//!
//! ```ignore
//! use pp_mesh::io::adcirc::AdcircLoader;
//!
//! let mesh = AdcircLoader::load("mesh.grd")?;
//! println!("Loaded {} nodes and {} elements", mesh.n_nodes(), mesh.n_elements());
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use pp_foundation::index::one_based;

use crate::error::{MeshError, MeshResult};
use crate::mesh::TriMesh;

const FORMAT: &str = "adcirc";

/// ADCIRC 文件加载器
pub struct AdcircLoader;

/// 逐行读取并记录行号
struct Lines<R> {
    inner: std::io::Lines<R>,
    file: PathBuf,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R, file: PathBuf) -> Self {
        Self {
            inner: reader.lines(),
            file,
            line: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> MeshError {
        MeshError::format(FORMAT, self.file.clone(), self.line, message)
    }

    fn next_line(&mut self, what: &str) -> MeshResult<String> {
        match self.inner.next() {
            Some(line) => {
                self.line += 1;
                Ok(line?)
            }
            None => {
                self.line += 1;
                Err(self.error(format!("文件提前结束, 缺少{}", what)))
            }
        }
    }

    fn parse<T: std::str::FromStr>(&self, token: Option<&str>, what: &str) -> MeshResult<T> {
        let token = token.ok_or_else(|| self.error(format!("缺少{}", what)))?;
        token
            .parse()
            .map_err(|_| self.error(format!("无法解析{}: {:?}", what, token)))
    }
}

impl AdcircLoader {
    /// 加载 ADCIRC 文件
    pub fn load<P: AsRef<Path>>(path: P) -> MeshResult<TriMesh> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("读取 ADCIRC 网格: {}", path.display());
        Self::read(BufReader::new(file), path.to_path_buf())
    }

    /// 从 reader 加载
    pub fn load_from_reader<R: BufRead>(reader: R) -> MeshResult<TriMesh> {
        Self::read(reader, PathBuf::from("<stream>"))
    }

    fn read<R: BufRead>(reader: R, file: PathBuf) -> MeshResult<TriMesh> {
        let mut lines = Lines::new(reader, file);

        let title = lines.next_line("标题行")?.trim().to_string();

        let counts = lines.next_line("单元数与节点数")?;
        let mut it = counts.split_whitespace();
        let ne: usize = lines.parse(it.next(), "单元数 NE")?;
        let np: usize = lines.parse(it.next(), "节点数 NP")?;

        // 计数来自文件，不据此预分配
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut z = Vec::new();
        let mut node_map: HashMap<usize, usize> = HashMap::new();

        for _ in 0..np {
            let l = lines.next_line("节点行")?;
            let mut it = l.split_whitespace();
            let id: usize = lines.parse(it.next(), "节点编号")?;
            let xv: f64 = lines.parse(it.next(), "x 坐标")?;
            let yv: f64 = lines.parse(it.next(), "y 坐标")?;
            let zv: f64 = lines.parse(it.next(), "z 值")?;
            if node_map.insert(id, x.len()).is_some() {
                return Err(lines.error(format!("节点编号 {} 重复", id)));
            }
            x.push(xv);
            y.push(yv);
            z.push(zv);
        }

        let mut triangles = Vec::new();
        for _ in 0..ne {
            let l = lines.next_line("单元行")?;
            let mut it = l.split_whitespace();
            let _id: usize = lines.parse(it.next(), "单元编号")?;
            let nv: usize = lines.parse(it.next(), "单元节点数")?;
            if nv != 3 {
                return Err(lines.error(format!("仅支持三角形单元, 实际节点数为 {}", nv)));
            }
            let mut tri = [0usize; 3];
            for v in tri.iter_mut() {
                let id: usize = lines.parse(it.next(), "单元节点编号")?;
                *v = *node_map
                    .get(&id)
                    .ok_or_else(|| lines.error(format!("单元引用了不存在的节点 {}", id)))?;
            }
            triangles.push(tri);
        }

        log::debug!("ADCIRC 网格 {:?}: {} 节点, {} 单元", title, np, ne);
        TriMesh::new(title, x, y, z, triangles)
    }
}

/// ADCIRC 文件写入器
pub struct AdcircWriter;

impl AdcircWriter {
    /// 写入 ADCIRC 文件
    pub fn write<P: AsRef<Path>>(path: P, mesh: &TriMesh) -> MeshResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        Self::write_to(&mut writer, mesh)?;
        writer.flush()?;
        Ok(())
    }

    /// 写入到 writer，节点与单元按 1 基连续编号
    pub fn write_to<W: Write>(writer: &mut W, mesh: &TriMesh) -> MeshResult<()> {
        writeln!(writer, "{}", mesh.title)?;
        writeln!(writer, "{} {}", mesh.n_elements(), mesh.n_nodes())?;
        for i in 0..mesh.n_nodes() {
            writeln!(
                writer,
                "{} {:.6} {:.6} {:.6}",
                one_based(i),
                mesh.x[i],
                mesh.y[i],
                mesh.z[i]
            )?;
        }
        for (i, t) in mesh.triangles.iter().enumerate() {
            writeln!(
                writer,
                "{} 3 {} {} {}",
                one_based(i),
                one_based(t[0]),
                one_based(t[1]),
                one_based(t[2])
            )?;
        }
        Ok(())
    }
}
