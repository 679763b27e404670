// crates/pp_selafin/src/framing.rs

//! 记录框架原语
//!
//! SELAFIN 文件由 Fortran 顺序记录组成：每个记录的负载前后各有一个 4 字节整数，
//! 其值等于负载字节数。
//!
//! ```text
//! +-----------+------------------+-----------+
//! | len (4B)  | payload (len B)  | len (4B)  |
//! +-----------+------------------+-----------+
//! ```
//!
//! 头部与时间步的所有读写都经过 [`RecordReader::read_framed`] 与
//! [`RecordWriter::write_framed`]，每个记录的首尾标记都会被校验。

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::error::{SelafinError, SelafinResult};
use crate::precision::{ByteOrder, Precision};

/// 长度标记字节数
pub const MARKER_LEN: usize = 4;

/// 负载为 `payload` 字节的记录在文件中占用的总字节数
#[inline]
pub fn framed_len(payload: usize) -> u64 {
    (payload + 2 * MARKER_LEN) as u64
}

/// 尽量读满缓冲区，返回实际读取的字节数
///
/// 与 `read_exact` 不同，遇到 EOF 时返回短读长度而不是错误，
/// 调用方据此区分“数据结束”与真正的 IO 故障。
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// 将字符串编码为定宽字段，右侧以空格填充，超长部分在字符边界处截断
pub fn pad_str(s: &str, width: usize) -> Vec<u8> {
    let mut end = s.len().min(width);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = Vec::with_capacity(width);
    out.extend_from_slice(&s.as_bytes()[..end]);
    out.resize(width, b' ');
    out
}

/// 解码定宽字段，去除右侧空格与 NUL
pub fn unpad_str(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

/// 解码 32 位整数序列
pub fn decode_i32s(bytes: &[u8], order: ByteOrder) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| order.i32_from([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// 按精度解码浮点序列（统一提升为 f64）
pub fn decode_floats(bytes: &[u8], order: ByteOrder, precision: Precision) -> Vec<f64> {
    bytes
        .chunks_exact(precision.size_bytes())
        .map(|c| order.float_from(c, precision))
        .collect()
}

fn check_marker(record: &'static str, which: &str, found: i32, expected: usize) -> SelafinResult<()> {
    if found < 0 || found as usize != expected {
        return Err(SelafinError::format(
            record,
            format!("{}长度标记为 {}, 期望 {}", which, found, expected),
        ));
    }
    Ok(())
}

/// 记录负载字节数，溢出视为格式错误
pub fn record_len(record: &'static str, count: usize, width: usize) -> SelafinResult<usize> {
    count.checked_mul(width).ok_or_else(|| {
        SelafinError::format(record, format!("{} × {} 字节超出可寻址范围", count, width))
    })
}

// ============================================================
// 读取端
// ============================================================

/// 带字节序的记录读取器
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    order: ByteOrder,
}

impl<R: Read + Seek> RecordReader<R> {
    /// 包装底层流
    pub fn new(inner: R, order: ByteOrder) -> Self {
        Self { inner, order }
    }

    /// 字节序
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// 当前流位置
    pub fn position(&mut self) -> SelafinResult<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// 定位到绝对偏移
    pub fn seek_to(&mut self, pos: u64) -> SelafinResult<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// 取回底层流
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_exact_or_truncated(&mut self, record: &'static str, buf: &mut [u8]) -> SelafinResult<()> {
        let offset = self.inner.stream_position()?;
        let n = read_full(&mut self.inner, buf)?;
        if n < buf.len() {
            return Err(SelafinError::truncated(record, offset, buf.len(), n));
        }
        Ok(())
    }

    /// 读取一个长度标记（不做校验）
    pub fn read_marker(&mut self, record: &'static str) -> SelafinResult<i32> {
        let mut b = [0u8; MARKER_LEN];
        self.read_exact_or_truncated(record, &mut b)?;
        Ok(self.order.i32_from(b))
    }

    /// 读取负载与尾随标记，前导标记已由调用方读取并确认为 `len`
    ///
    /// 缓冲区随实际读到的数据增长，声明的长度再大也不会预先分配。
    pub fn read_payload(&mut self, record: &'static str, len: usize) -> SelafinResult<Vec<u8>> {
        let offset = self.inner.stream_position()?;
        let mut payload = Vec::new();
        let n = (&mut self.inner).take(len as u64).read_to_end(&mut payload)?;
        if n < len {
            return Err(SelafinError::truncated(record, offset, len, n));
        }
        let tail = self.read_marker(record)?;
        check_marker(record, "尾随", tail, len)?;
        Ok(payload)
    }

    /// 读取一个完整记录并校验首尾标记都等于 `expected_len`
    pub fn read_framed(&mut self, record: &'static str, expected_len: usize) -> SelafinResult<Vec<u8>> {
        let lead = self.read_marker(record)?;
        check_marker(record, "前导", lead, expected_len)?;
        let payload = self.read_payload(record, expected_len)?;
        log::trace!("读取记录 {} ({} 字节)", record, expected_len);
        Ok(payload)
    }

    /// 跳过一个记录（校验首尾标记，不解码负载）
    pub fn skip_framed(&mut self, record: &'static str, expected_len: usize) -> SelafinResult<()> {
        let lead = self.read_marker(record)?;
        check_marker(record, "前导", lead, expected_len)?;
        self.inner.seek(SeekFrom::Current(expected_len as i64))?;
        let tail = self.read_marker(record)?;
        check_marker(record, "尾随", tail, expected_len)
    }

    /// 读取 `count` 个 32 位整数组成的记录
    pub fn read_i32s(&mut self, record: &'static str, count: usize) -> SelafinResult<Vec<i32>> {
        let payload = self.read_framed(record, record_len(record, count, 4)?)?;
        Ok(decode_i32s(&payload, self.order))
    }

    /// 读取 `count` 个浮点值组成的记录
    pub fn read_floats(
        &mut self,
        record: &'static str,
        count: usize,
        precision: Precision,
    ) -> SelafinResult<Vec<f64>> {
        let payload = self.read_framed(record, record_len(record, count, precision.size_bytes())?)?;
        Ok(decode_floats(&payload, self.order, precision))
    }

    /// 读取绝对偏移处的单个浮点值（不经过框架）
    pub fn read_float_at(
        &mut self,
        record: &'static str,
        pos: u64,
        precision: Precision,
    ) -> SelafinResult<f64> {
        self.seek_to(pos)?;
        let mut b = [0u8; 8];
        let buf = &mut b[..precision.size_bytes()];
        self.read_exact_or_truncated(record, buf)?;
        Ok(self.order.float_from(buf, precision))
    }
}

// ============================================================
// 写入端
// ============================================================

/// 带字节序的记录写入器
pub struct RecordWriter<W: Write> {
    inner: W,
    order: ByteOrder,
    bytes_written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// 包装底层流
    pub fn new(inner: W, order: ByteOrder) -> Self {
        Self {
            inner,
            order,
            bytes_written: 0,
        }
    }

    /// 字节序
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// 修改字节序（仅在写入任何记录之前有效）
    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// 已写入的字节数
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// 写入一个完整记录：前导标记、负载、尾随标记
    pub fn write_framed(&mut self, payload: &[u8]) -> SelafinResult<()> {
        let len = i32::try_from(payload.len()).map_err(|_| {
            SelafinError::configuration(format!(
                "记录长度 {} 字节超出 4 字节长度标记的表示范围",
                payload.len()
            ))
        })?;
        let marker = self.order.i32_to(len);
        self.inner.write_all(&marker)?;
        self.inner.write_all(payload)?;
        self.inner.write_all(&marker)?;
        self.bytes_written += framed_len(payload.len());
        Ok(())
    }

    /// 写入 32 位整数记录
    pub fn write_i32s(&mut self, values: &[i32]) -> SelafinResult<()> {
        let mut payload = Vec::with_capacity(values.len() * 4);
        for &v in values {
            payload.extend_from_slice(&self.order.i32_to(v));
        }
        self.write_framed(&payload)
    }

    /// 写入浮点记录
    pub fn write_floats(&mut self, values: &[f64], precision: Precision) -> SelafinResult<()> {
        let mut payload = Vec::with_capacity(values.len() * precision.size_bytes());
        for &v in values {
            self.order.push_float(&mut payload, v, precision);
        }
        self.write_framed(&payload)
    }

    /// 刷新底层流
    pub fn flush(&mut self) -> SelafinResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// 取回底层流
    pub fn into_inner(self) -> W {
        self.inner
    }
}
