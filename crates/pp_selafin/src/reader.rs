// crates/pp_selafin/src/reader.rs

//! SELAFIN 读取器
//!
//! 打开时解析一次文件头，然后顺序扫描一次全部时间步，建立每个时间步的
//! 文件偏移与时间值目录。之后的读取都通过偏移随机访问，不需要把整个文件
//! 载入内存。
//!
//! 扫描遇到短读或框架不一致时停止，此前完整的时间步即为文件的有效内容；
//! 这是为了容忍求解器中途退出留下的半截记录。文件头损坏则立即报错。

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::error::{SelafinError, SelafinResult};
use crate::framing::{framed_len, RecordReader, MARKER_LEN};
use crate::header::{FileLayout, SelafinHeader};
use crate::precision::{ByteOrder, Precision};

/// 时间步目录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeDirectory {
    /// 每个时间步记录（时间值记录的前导标记）的绝对偏移
    pub offsets: Vec<u64>,
    /// 每个时间步的时间值
    pub times: Vec<f64>,
}

impl TimeDirectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// SELAFIN 文件读取器
pub struct SelafinReader<R> {
    input: RecordReader<R>,
    header: SelafinHeader,
    layout: FileLayout,
    directory: TimeDirectory,
}

impl SelafinReader<BufReader<File>> {
    /// 打开文件并建立时间步目录
    pub fn open(path: impl AsRef<Path>) -> SelafinResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("读取 SELAFIN 文件: {}", path.display());
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> SelafinReader<R> {
    /// 从任意可定位的字节流构造读取器
    pub fn new(inner: R) -> SelafinResult<Self> {
        let (header, layout, input) = SelafinHeader::read_from(inner)?;
        let mut reader = Self {
            input,
            header,
            layout,
            directory: TimeDirectory::default(),
        };
        reader.directory = reader.scan()?;
        log::info!(
            "共 {} 个时间步 ({} 变量, {} 节点)",
            reader.directory.len(),
            reader.header.nbv1(),
            reader.header.point_count
        );
        Ok(reader)
    }

    // ========================================================
    // 目录扫描
    // ========================================================

    fn time_record_len(&self) -> u64 {
        framed_len(self.layout.precision.size_bytes())
    }

    fn variable_payload_len(&self) -> usize {
        self.header.point_count * self.layout.precision.size_bytes()
    }

    fn variable_record_len(&self) -> u64 {
        framed_len(self.variable_payload_len())
    }

    fn scan(&mut self) -> SelafinResult<TimeDirectory> {
        let mut dir = TimeDirectory::default();
        let precision = self.layout.precision;
        let payload = self.variable_payload_len();
        let blocks = self.header.nbv1() + self.header.nbv2();

        let mut pos = self.layout.header_len;
        self.input.seek_to(pos)?;

        loop {
            let step = (|| -> SelafinResult<f64> {
                let t = self.input.read_floats("time", 1, precision)?;
                for _ in 0..blocks {
                    self.input.skip_framed("variable_block", payload)?;
                }
                Ok(t[0])
            })();

            match step {
                Ok(t) => {
                    dir.offsets.push(pos);
                    dir.times.push(t);
                    pos = self.input.position()?;
                }
                // 恰好在记录边界结束
                Err(SelafinError::Truncated {
                    offset, found: 0, ..
                }) if offset == pos => break,
                Err(e) if e.is_corrupt_record() => {
                    log::warn!(
                        "第 {} 个时间步不完整, 视为文件结束 (偏移 {}): {}",
                        dir.len(),
                        pos,
                        e
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(dir)
    }

    // ========================================================
    // 访问器
    // ========================================================

    /// 文件头
    pub fn header(&self) -> &SelafinHeader {
        &self.header
    }

    /// 标题
    pub fn title(&self) -> &str {
        &self.header.title
    }

    /// 变量名
    pub fn variable_names(&self) -> Vec<&str> {
        self.header.variable_names()
    }

    /// 变量单位
    pub fn variable_units(&self) -> Vec<&str> {
        self.header.variable_units()
    }

    /// 检测到的浮点精度
    pub fn precision(&self) -> Precision {
        self.layout.precision
    }

    /// 检测到的字节序
    pub fn byte_order(&self) -> ByteOrder {
        self.layout.byte_order
    }

    /// 头部字节数
    pub fn header_len(&self) -> u64 {
        self.layout.header_len
    }

    /// 时间值，按文件顺序
    pub fn times(&self) -> &[f64] {
        &self.directory.times
    }

    /// 各时间步记录的起始偏移
    pub fn offsets(&self) -> &[u64] {
        &self.directory.offsets
    }

    /// 时间步目录
    pub fn directory(&self) -> &TimeDirectory {
        &self.directory
    }

    /// 有效时间步数
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    pub fn plane_count(&self) -> usize {
        self.header.plane_count()
    }

    pub fn points_per_plane(&self) -> usize {
        self.header.points_per_plane()
    }

    // ========================================================
    // 数据读取
    // ========================================================

    fn step_offset(&self, index: usize) -> SelafinResult<u64> {
        self.directory
            .offsets
            .get(index)
            .copied()
            .ok_or_else(|| SelafinError::index_out_of_range("timestep", index, self.len()))
    }

    fn check_node(&self, node: usize) -> SelafinResult<()> {
        if node >= self.header.point_count {
            return Err(SelafinError::index_out_of_range(
                "node",
                node,
                self.header.point_count,
            ));
        }
        Ok(())
    }

    fn check_variable(&self, var: usize) -> SelafinResult<()> {
        if var >= self.header.nbv1() {
            return Err(SelafinError::index_out_of_range(
                "variable",
                var,
                self.header.nbv1(),
            ));
        }
        Ok(())
    }

    /// 读取第 `index` 个时间步的全部常规变量，每个数组长度为 NPOIN
    ///
    /// 每次调用都从目录偏移重新定位，重复调用结果相同。
    pub fn read_variables_at(&mut self, index: usize) -> SelafinResult<Vec<Vec<f64>>> {
        let offset = self.step_offset(index)?;
        let npoin = self.header.point_count;
        let precision = self.layout.precision;

        self.input.seek_to(offset + self.time_record_len())?;
        (0..self.header.nbv1())
            .map(|_| self.input.read_floats("variable_block", npoin, precision))
            .collect()
    }

    /// 读取第 `index` 个时间步的单个变量
    pub fn read_variable_at(&mut self, index: usize, var: usize) -> SelafinResult<Vec<f64>> {
        let offset = self.step_offset(index)?;
        self.check_variable(var)?;
        let pos = offset + self.time_record_len() + var as u64 * self.variable_record_len();
        self.input.seek_to(pos)?;
        self.input
            .read_floats("variable_block", self.header.point_count, self.layout.precision)
    }

    /// 第 `index` 个时间步中变量 `var` 在节点 `node` 处数值的绝对偏移
    fn node_value_offset(&self, step_offset: u64, var: usize, node: usize) -> u64 {
        let fsize = self.layout.precision.size_bytes() as u64;
        step_offset
            + self.time_record_len()
            + var as u64 * self.variable_record_len()
            + MARKER_LEN as u64
            + node as u64 * fsize
    }

    /// 读取第 `index` 个时间步中单个节点的各变量值
    ///
    /// 直接定位到每个变量块中该节点的位置，不读取整块数组。
    pub fn read_node_at(&mut self, index: usize, node: usize) -> SelafinResult<Vec<f64>> {
        let offset = self.step_offset(index)?;
        self.check_node(node)?;
        let precision = self.layout.precision;
        let positions: Vec<u64> = (0..self.header.nbv1())
            .map(|var| self.node_value_offset(offset, var, node))
            .collect();
        positions
            .into_iter()
            .map(|pos| self.input.read_float_at("variable_block", pos, precision))
            .collect()
    }

    /// 读取单个节点在全部时间步上的时间序列
    ///
    /// 返回值按 `[时间步][变量]` 排列。
    pub fn read_variables_at_node(&mut self, node: usize) -> SelafinResult<Vec<Vec<f64>>> {
        self.check_node(node)?;
        (0..self.len())
            .map(|index| self.read_node_at(index, node))
            .collect()
    }

    /// 释放底层流
    pub fn close(self) {
        drop(self.input);
    }

    /// 取回底层流
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }
}

impl<R> std::fmt::Debug for SelafinReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelafinReader")
            .field("title", &self.header.title)
            .field("layout", &self.layout)
            .field("timesteps", &self.directory.len())
            .finish()
    }
}
