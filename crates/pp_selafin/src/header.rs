// crates/pp_selafin/src/header.rs

//! SELAFIN 文件头
//!
//! # 头部布局
//!
//! 每一项都是一个独立的框架记录（见 [`framing`](crate::framing)）：
//!
//! ```text
//! 标题            80 字节字符串 (末 8 字节通常为 "SERAFIN " 或 "SERAFIND")
//! NBV1, NBV2      2 个整数
//! 变量名/单位     NBV1 + NBV2 个记录, 每个 16 + 16 字节
//! IPARAM          10 个整数 (iparam[6] = 垂向层数, iparam[9] = 1 表示有日期)
//! 日期            6 个整数 (仅当 iparam[9] == 1)
//! 维度            NELEM, NPOIN, NDP, 1
//! IKLE            NELEM * NDP 个整数 (1 基, 按单元排列)
//! IPOBO           NPOIN 个整数
//! X               NPOIN 个浮点
//! Y               NPOIN 个浮点
//! ```
//!
//! 内存中的 `connectivity` 为 0 基，±1 转换仅在本模块的读写处发生。

use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};

use pp_foundation::index::{from_one_based, to_one_based};

use crate::error::{SelafinError, SelafinResult};
use crate::framing::{pad_str, read_full, unpad_str, RecordReader, RecordWriter, MARKER_LEN};
use crate::precision::{ByteOrder, Precision};

/// 标题字段宽度
pub const TITLE_LEN: usize = 80;
/// 变量名与单位字段宽度
pub const NAME_LEN: usize = 16;
/// IPARAM 长度
pub const IPARAM_LEN: usize = 10;
/// IPARAM 中垂向层数的位置
pub const IPARAM_PLANES: usize = 6;
/// IPARAM 中日期标志的位置
pub const IPARAM_DATE: usize = 9;

/// 标题末尾格式标记的宽度
const TAG_LEN: usize = 8;
/// 单精度文件在标题末尾的格式标记
const SINGLE_TAG: &[u8; TAG_LEN] = b"SERAFIN ";
/// 双精度文件在标题末尾的格式标记
const DOUBLE_TAG: &[u8; TAG_LEN] = b"SERAFIND";

/// 日期时间块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 6]", into = "[i32; 6]")]
pub struct SelafinDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl SelafinDate {
    pub fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// 按文件顺序输出
    pub fn to_array(&self) -> [i32; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }
}

impl From<[i32; 6]> for SelafinDate {
    fn from(a: [i32; 6]) -> Self {
        Self::new(a[0], a[1], a[2], a[3], a[4], a[5])
    }
}

impl From<SelafinDate> for [i32; 6] {
    fn from(d: SelafinDate) -> Self {
        d.to_array()
    }
}

impl std::fmt::Display for SelafinDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// 变量名与单位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    /// 变量名（已去除右侧填充）
    pub name: String,
    /// 单位（已去除右侧填充）
    pub unit: String,
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// 读取文件头时检测到的物理布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLayout {
    /// 字节序
    pub byte_order: ByteOrder,
    /// 浮点精度
    pub precision: Precision,
    /// 头部总字节数（第一个时间步记录的起始偏移）
    pub header_len: u64,
}

/// SELAFIN 文件头
#[derive(Debug, Clone, PartialEq)]
pub struct SelafinHeader {
    /// 标题（已去除右侧填充）
    pub title: String,
    /// 常规变量 (NBV1)
    pub variables: Vec<VariableInfo>,
    /// 附加变量 (NBV2)，只读，写入时忽略
    pub clandestine: Vec<VariableInfo>,
    /// 10 个整数参数
    pub iparam: [i32; IPARAM_LEN],
    /// 日期块
    pub date: Option<SelafinDate>,
    /// 单元数 NELEM
    pub element_count: usize,
    /// 节点数 NPOIN（三维文件为所有层的节点总数）
    pub point_count: usize,
    /// 每单元节点数 NDP
    pub points_per_element: usize,
    /// 维度记录中的第四个整数
    pub reserved: i32,
    /// 单元连接表，0 基，长度 NELEM * NDP
    pub connectivity: Vec<usize>,
    /// 边界节点标识 IPOBO，内部节点为 0
    pub boundary_indicator: Vec<i32>,
    /// 节点 x 坐标
    pub x: Vec<f64>,
    /// 节点 y 坐标
    pub y: Vec<f64>,
}

impl Default for SelafinHeader {
    fn default() -> Self {
        Self {
            title: String::new(),
            variables: Vec::new(),
            clandestine: Vec::new(),
            iparam: [0; IPARAM_LEN],
            date: None,
            element_count: 0,
            point_count: 0,
            points_per_element: 3,
            reserved: 1,
            connectivity: Vec::new(),
            boundary_indicator: Vec::new(),
            x: Vec::new(),
            y: Vec::new(),
        }
    }
}

impl SelafinHeader {
    /// 由二维三角网格构造文件头
    ///
    /// `triangles` 为 0 基索引，`boundary_indicator` 长度必须等于节点数。
    pub fn from_mesh(
        title: impl Into<String>,
        triangles: &[[usize; 3]],
        x: Vec<f64>,
        y: Vec<f64>,
        boundary_indicator: Vec<i32>,
    ) -> SelafinResult<Self> {
        let header = Self {
            title: title.into(),
            iparam: {
                let mut p = [0; IPARAM_LEN];
                p[0] = 1;
                p
            },
            element_count: triangles.len(),
            point_count: x.len(),
            points_per_element: 3,
            connectivity: triangles.iter().flatten().copied().collect(),
            boundary_indicator,
            x,
            y,
            ..Self::default()
        };
        header.validate()?;
        Ok(header)
    }

    /// 常规变量数 NBV1
    pub fn nbv1(&self) -> usize {
        self.variables.len()
    }

    /// 附加变量数 NBV2
    pub fn nbv2(&self) -> usize {
        self.clandestine.len()
    }

    /// 变量名列表
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    /// 变量单位列表
    pub fn variable_units(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.unit.as_str()).collect()
    }

    /// 按名称查找变量位置（忽略大小写与首尾空格）
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        let key = name.trim();
        self.variables
            .iter()
            .position(|v| v.name.trim().eq_ignore_ascii_case(key))
    }

    /// 垂向层数 NPLAN（二维文件为 1）
    pub fn plane_count(&self) -> usize {
        self.iparam[IPARAM_PLANES].max(1) as usize
    }

    /// 是否为分层三维网格
    pub fn is_3d(&self) -> bool {
        self.plane_count() > 1
    }

    /// 每层节点数
    pub fn points_per_plane(&self) -> usize {
        self.point_count / self.plane_count()
    }

    /// 是否包含日期块
    pub fn has_date(&self) -> bool {
        self.iparam[IPARAM_DATE] == 1
    }

    /// 第 `i` 个单元的节点（0 基）
    pub fn element(&self, i: usize) -> Option<&[usize]> {
        let ndp = self.points_per_element;
        self.connectivity.get(i * ndp..(i + 1) * ndp)
    }

    /// 以三角形形式返回连接表，仅适用于 NDP == 3
    pub fn triangles(&self) -> Option<Vec<[usize; 3]>> {
        if self.points_per_element != 3 {
            return None;
        }
        Some(
            self.connectivity
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        )
    }

    /// 第一层的 x/y 坐标（二维网格即全部节点）
    pub fn first_plane(&self) -> (&[f64], &[f64]) {
        let n = self.points_per_plane().min(self.x.len()).min(self.y.len());
        (&self.x[..n], &self.y[..n])
    }

    /// 检查各数组长度与维度一致，连接表索引小于节点数
    pub fn validate(&self) -> SelafinResult<()> {
        let npoin = self.point_count;
        let expected_ikle = self.element_count * self.points_per_element;
        if self.connectivity.len() != expected_ikle {
            return Err(SelafinError::shape(
                "connectivity",
                expected_ikle,
                self.connectivity.len(),
            ));
        }
        if self.boundary_indicator.len() != npoin {
            return Err(SelafinError::shape(
                "boundary_indicator",
                npoin,
                self.boundary_indicator.len(),
            ));
        }
        if self.x.len() != npoin {
            return Err(SelafinError::shape("x", npoin, self.x.len()));
        }
        if self.y.len() != npoin {
            return Err(SelafinError::shape("y", npoin, self.y.len()));
        }
        if let Some(&bad) = self.connectivity.iter().find(|&&n| n >= npoin) {
            return Err(SelafinError::index_out_of_range("connectivity", bad, npoin));
        }
        Ok(())
    }

    // ========================================================
    // 读取
    // ========================================================

    /// 从流的起始处解析文件头
    ///
    /// 返回文件头、检测到的布局以及定位在第一个时间步处的记录读取器。
    pub fn read_from<R: Read + Seek>(
        mut inner: R,
    ) -> SelafinResult<(Self, FileLayout, RecordReader<R>)> {
        let (byte_order, raw_title) = detect_byte_order(&mut inner)?;
        let mut rr = RecordReader::new(inner, byte_order);

        let nbv = rr.read_i32s("nbv", 2)?;
        let nbv1 = non_negative("nbv", "NBV1", nbv[0])?;
        let nbv2 = non_negative("nbv", "NBV2", nbv[1])?;

        // 计数来自文件，不据此预分配
        let mut variables = Vec::new();
        let mut clandestine = Vec::new();
        for i in 0..nbv1 + nbv2 {
            let payload = rr.read_framed("variable", 2 * NAME_LEN)?;
            let info = VariableInfo::new(
                unpad_str(&payload[..NAME_LEN]),
                unpad_str(&payload[NAME_LEN..]),
            );
            if i < nbv1 {
                variables.push(info);
            } else {
                clandestine.push(info);
            }
        }

        let raw_iparam = rr.read_i32s("iparam", IPARAM_LEN)?;
        let mut iparam = [0; IPARAM_LEN];
        iparam.copy_from_slice(&raw_iparam);

        let date = if iparam[IPARAM_DATE] == 1 {
            let d = rr.read_i32s("date", 6)?;
            Some(SelafinDate::new(d[0], d[1], d[2], d[3], d[4], d[5]))
        } else {
            None
        };

        let dims = rr.read_i32s("dimensions", 4)?;
        let nelem = non_negative("dimensions", "NELEM", dims[0])?;
        let npoin = non_negative("dimensions", "NPOIN", dims[1])?;
        let ndp = non_negative("dimensions", "NDP", dims[2])?;
        let reserved = dims[3];

        let ikle_len = nelem.checked_mul(ndp).ok_or_else(|| {
            SelafinError::format("dimensions", format!("NELEM={} × NDP={} 溢出", nelem, ndp))
        })?;
        let raw_ikle = rr.read_i32s("ikle", ikle_len)?;
        let connectivity = from_one_based(&raw_ikle, npoin)
            .map_err(|e| SelafinError::format("ikle", format!("连接表超出 [1, {}]: {}", npoin, e)))?;

        let boundary_indicator = rr.read_i32s("ipobo", npoin)?;

        let lead = rr.read_marker("x")?;
        let precision = detect_precision(lead, npoin, &raw_title)?;
        let x_bytes = rr.read_payload("x", npoin * precision.size_bytes())?;
        let x = crate::framing::decode_floats(&x_bytes, byte_order, precision);
        let y = rr.read_floats("y", npoin, precision)?;

        let header_len = rr.position()?;

        let header = Self {
            title: decode_title(&raw_title),
            variables,
            clandestine,
            iparam,
            date,
            element_count: nelem,
            point_count: npoin,
            points_per_element: ndp,
            reserved,
            connectivity,
            boundary_indicator,
            x,
            y,
        };

        log::debug!(
            "SELAFIN 头部: {} 变量, {} 单元, {} 节点, {} 层, {} 字节序, {} 精度",
            header.nbv1(),
            nelem,
            npoin,
            header.plane_count(),
            byte_order,
            precision
        );

        Ok((
            header,
            FileLayout {
                byte_order,
                precision,
                header_len,
            },
            rr,
        ))
    }

    // ========================================================
    // 写入
    // ========================================================

    /// 按给定精度序列化文件头，附加变量不写出
    pub fn write_to<W: Write>(
        &self,
        out: &mut RecordWriter<W>,
        precision: Precision,
    ) -> SelafinResult<()> {
        self.validate()?;

        out.write_framed(&encode_title(&self.title, precision))?;
        out.write_i32s(&[to_i32("NBV1", self.nbv1())?, 0])?;

        for v in &self.variables {
            let mut payload = pad_str(&v.name, NAME_LEN);
            payload.extend_from_slice(&pad_str(&v.unit, NAME_LEN));
            out.write_framed(&payload)?;
        }

        out.write_i32s(&self.iparam)?;
        if self.has_date() {
            let date = self.date.ok_or_else(|| {
                SelafinError::configuration("iparam[9] == 1 但未提供日期块")
            })?;
            out.write_i32s(&date.to_array())?;
        }

        out.write_i32s(&[
            to_i32("NELEM", self.element_count)?,
            to_i32("NPOIN", self.point_count)?,
            to_i32("NDP", self.points_per_element)?,
            self.reserved,
        ])?;

        let ikle = to_one_based(&self.connectivity)
            .map_err(|e| SelafinError::configuration(e.to_string()))?;
        out.write_i32s(&ikle)?;
        out.write_i32s(&self.boundary_indicator)?;
        out.write_floats(&self.x, precision)?;
        out.write_floats(&self.y, precision)?;
        Ok(())
    }
}

/// 编码标题：正文至多 72 字节，末 8 字节为格式标记；更长的标题占满 80 字节且不带标记
fn encode_title(title: &str, precision: Precision) -> Vec<u8> {
    if title.len() > TITLE_LEN - TAG_LEN {
        return pad_str(title, TITLE_LEN);
    }
    let mut raw = pad_str(title, TITLE_LEN - TAG_LEN);
    raw.extend_from_slice(match precision {
        Precision::F32 => SINGLE_TAG,
        Precision::F64 => DOUBLE_TAG,
    });
    raw
}

/// 解码标题并去掉末尾的格式标记
fn decode_title(raw: &[u8; TITLE_LEN]) -> String {
    let tag = &raw[TITLE_LEN - TAG_LEN..];
    if tag == SINGLE_TAG || tag == DOUBLE_TAG {
        unpad_str(&raw[..TITLE_LEN - TAG_LEN])
    } else {
        unpad_str(raw)
    }
}

/// 通过 80 字节标题记录的首尾标记检测字节序
///
/// 先按大端解释，不一致时再按小端解释，二者皆不成立则报格式错误。
fn detect_byte_order<R: Read>(inner: &mut R) -> SelafinResult<(ByteOrder, [u8; TITLE_LEN])> {
    let mut buf = [0u8; TITLE_LEN + 2 * MARKER_LEN];
    let n = read_full(inner, &mut buf)?;
    if n < buf.len() {
        return Err(SelafinError::truncated("title", 0, buf.len(), n));
    }

    let mut lead = [0u8; MARKER_LEN];
    let mut tail = [0u8; MARKER_LEN];
    lead.copy_from_slice(&buf[..MARKER_LEN]);
    tail.copy_from_slice(&buf[MARKER_LEN + TITLE_LEN..]);

    let mut title = [0u8; TITLE_LEN];
    title.copy_from_slice(&buf[MARKER_LEN..MARKER_LEN + TITLE_LEN]);

    for order in [ByteOrder::Big, ByteOrder::Little] {
        if order.i32_from(lead) == TITLE_LEN as i32 && order.i32_from(tail) == TITLE_LEN as i32 {
            return Ok((order, title));
        }
    }

    Err(SelafinError::format(
        "title",
        "期望大端或小端的 80 字节标题记录框架, 两者均不匹配",
    ))
}

/// 通过 x 坐标记录的长度标记检测浮点宽度
fn detect_precision(lead: i32, npoin: usize, title: &[u8; TITLE_LEN]) -> SelafinResult<Precision> {
    if npoin == 0 {
        // 空网格无法由长度区分，退回标题末尾的格式标记
        return Ok(if &title[TITLE_LEN - TAG_LEN..] == DOUBLE_TAG {
            Precision::F64
        } else {
            Precision::F32
        });
    }
    for precision in [Precision::F32, Precision::F64] {
        if lead >= 0 && lead as usize == npoin * precision.size_bytes() {
            return Ok(precision);
        }
    }
    Err(SelafinError::format(
        "x",
        format!(
            "长度标记 {} 既不是 4×NPOIN ({}) 也不是 8×NPOIN ({})",
            lead,
            4 * npoin,
            8 * npoin
        ),
    ))
}

fn non_negative(record: &'static str, field: &str, v: i32) -> SelafinResult<usize> {
    if v < 0 {
        return Err(SelafinError::format(record, format!("{} 为负数: {}", field, v)));
    }
    Ok(v as usize)
}

fn to_i32(field: &str, v: usize) -> SelafinResult<i32> {
    i32::try_from(v)
        .map_err(|_| SelafinError::configuration(format!("{} = {} 超出 32 位整数范围", field, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn two_triangles() -> SelafinHeader {
        let mut h = SelafinHeader::from_mesh(
            "TEST MESH",
            &[[0, 1, 2], [1, 3, 2]],
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1, 2, 4, 3],
        )
        .unwrap();
        h.variables = vec![
            VariableInfo::new("BOTTOM", "M"),
            VariableInfo::new("FREE SURFACE", "M"),
        ];
        h
    }

    fn encode(h: &SelafinHeader, order: ByteOrder, precision: Precision) -> Vec<u8> {
        let mut w = RecordWriter::new(Vec::new(), order);
        h.write_to(&mut w, precision).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_header_roundtrip() {
        let h = two_triangles();
        let bytes = encode(&h, ByteOrder::Big, Precision::F32);
        let len = bytes.len() as u64;

        let (read, layout, _) = SelafinHeader::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(read, h);
        assert_eq!(layout.byte_order, ByteOrder::Big);
        assert_eq!(layout.precision, Precision::F32);
        assert_eq!(layout.header_len, len);
    }

    #[test]
    fn test_detects_little_endian_double() {
        let h = two_triangles();
        let bytes = encode(&h, ByteOrder::Little, Precision::F64);
        let (_, layout, _) = SelafinHeader::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(layout.byte_order, ByteOrder::Little);
        assert_eq!(layout.precision, Precision::F64);
    }

    #[test]
    fn test_date_block_roundtrip() {
        let mut h = two_triangles();
        h.iparam[IPARAM_DATE] = 1;
        h.date = Some(SelafinDate::new(2021, 3, 14, 15, 9, 26));
        let bytes = encode(&h, ByteOrder::Big, Precision::F32);
        let (read, _, _) = SelafinHeader::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(read.date, h.date);
    }

    #[test]
    fn test_missing_date_rejected_on_write() {
        let mut h = two_triangles();
        h.iparam[IPARAM_DATE] = 1;
        let mut w = RecordWriter::new(Vec::new(), ByteOrder::Big);
        assert!(matches!(
            h.write_to(&mut w, Precision::F32),
            Err(SelafinError::Configuration(_))
        ));
    }

    #[test]
    fn test_names_are_space_padded() {
        let h = two_triangles();
        let bytes = encode(&h, ByteOrder::Big, Precision::F32);
        // 标题记录 88 字节, NBV 记录 16 字节, 随后是第一个变量记录
        let var = &bytes[88 + 16 + 4..88 + 16 + 4 + 32];
        assert_eq!(&var[..16], b"BOTTOM          ");
        assert_eq!(&var[16..], b"M               ");
    }

    #[test]
    fn test_corrupt_title_framing() {
        let mut bytes = encode(&two_triangles(), ByteOrder::Big, Precision::F32);
        bytes[3] = 81;
        let err = SelafinHeader::read_from(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SelafinError::Format { record: "title", .. }));
        assert!(err.to_string().contains("80 字节标题"));
    }

    #[test]
    fn test_ikle_out_of_range_is_format_error() {
        let h = two_triangles();
        let mut bytes = encode(&h, ByteOrder::Big, Precision::F32);
        // IKLE 记录的第一个值改为 NPOIN + 1
        let ikle_start = 88 + 16 + 2 * 40 + 48 + 24 + 4;
        bytes[ikle_start..ikle_start + 4].copy_from_slice(&5i32.to_be_bytes());
        let err = SelafinHeader::read_from(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SelafinError::Format { record: "ikle", .. }));
    }

    #[test]
    fn test_validate_shapes() {
        let mut h = two_triangles();
        h.y.pop();
        assert!(matches!(h.validate(), Err(SelafinError::Shape { .. })));

        let mut h = two_triangles();
        h.connectivity[0] = 4;
        assert!(matches!(
            h.validate(),
            Err(SelafinError::IndexOutOfRange { index: 4, len: 4, .. })
        ));
    }

    #[test]
    fn test_title_carries_format_tag() {
        let h = two_triangles();
        let bytes = encode(&h, ByteOrder::Big, Precision::F64);
        assert_eq!(&bytes[4 + 72..4 + 80], b"SERAFIND");
        assert_eq!(&bytes[4..13], b"TEST MESH");

        let long = "L".repeat(90);
        let raw = encode_title(&long, Precision::F32);
        assert_eq!(raw.len(), TITLE_LEN);
        let mut fixed = [0u8; TITLE_LEN];
        fixed.copy_from_slice(&raw);
        assert_eq!(decode_title(&fixed), "L".repeat(80));
    }

    #[test]
    fn test_empty_mesh_precision_from_tag() {
        let h = SelafinHeader::from_mesh("EMPTY", &[], vec![], vec![], vec![]).unwrap();
        let bytes = encode(&h, ByteOrder::Little, Precision::F64);
        let (read, layout, _) = SelafinHeader::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(layout.precision, Precision::F64);
        assert_eq!(read.title, "EMPTY");
    }

    #[test]
    fn test_plane_helpers() {
        let mut h = two_triangles();
        assert_eq!(h.plane_count(), 1);
        assert!(!h.is_3d());
        h.iparam[IPARAM_PLANES] = 2;
        assert_eq!(h.points_per_plane(), 2);
        let (x, y) = h.first_plane();
        assert_eq!(x.len(), 2);
        assert_eq!(y.len(), 2);
    }

    #[test]
    fn test_variable_lookup() {
        let h = two_triangles();
        assert_eq!(h.variable_index("free surface"), Some(1));
        assert_eq!(h.variable_index("VELOCITY U"), None);
        assert_eq!(h.element(1), Some(&[1, 3, 2][..]));
        assert_eq!(h.triangles().unwrap().len(), 2);
    }
}
