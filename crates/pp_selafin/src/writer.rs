// crates/pp_selafin/src/writer.rs

//! SELAFIN 写入器
//!
//! 写入顺序固定：先通过 `set_*` 配置文件头，调用一次 [`SelafinWriter::write_header`]，
//! 再按时间顺序追加任意个时间步，最后 [`SelafinWriter::finish`] 或
//! [`SelafinWriter::close`]。违反顺序返回 [`SelafinError::Sequence`]。
//!
//! 写入失败时文件可能只写了一半，与求解器的行为一致，不做事务保证。
//! 底层缓冲在写入器被丢弃时刷新并关闭。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::SelafinConfig;
use crate::error::{SelafinError, SelafinResult};
use crate::framing::RecordWriter;
use crate::header::{
    SelafinDate, SelafinHeader, VariableInfo, IPARAM_DATE, IPARAM_LEN, NAME_LEN, TITLE_LEN,
};
use crate::precision::{ByteOrder, Precision};

/// 写入器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// 可修改文件头
    Configuring,
    /// 文件头已写出，只能追加时间步
    HeaderWritten,
    /// 写出过程中出错，流中可能残留半个记录，拒绝后续写入
    Failed,
}

/// SELAFIN 文件写入器
pub struct SelafinWriter<W: Write> {
    out: RecordWriter<W>,
    config: SelafinConfig,
    header: SelafinHeader,
    names: Vec<String>,
    units: Vec<String>,
    mesh_set: bool,
    state: WriterState,
    timesteps: usize,
}

impl SelafinWriter<BufWriter<File>> {
    /// 创建（或覆盖）输出文件
    pub fn create(path: impl AsRef<Path>, config: SelafinConfig) -> SelafinResult<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        log::info!(
            "写入 SELAFIN 文件: {} ({} 字节序, {} 精度)",
            path.display(),
            config.byte_order,
            config.precision
        );
        Ok(Self::new(BufWriter::new(file), config))
    }
}

impl<W: Write> SelafinWriter<W> {
    /// 包装任意字节流
    pub fn new(inner: W, config: SelafinConfig) -> Self {
        Self {
            out: RecordWriter::new(inner, config.byte_order),
            config,
            header: SelafinHeader::default(),
            names: Vec::new(),
            units: Vec::new(),
            mesh_set: false,
            state: WriterState::Configuring,
            timesteps: 0,
        }
    }

    fn ensure_configuring(&self, op: &str) -> SelafinResult<()> {
        match self.state {
            WriterState::Configuring => Ok(()),
            WriterState::HeaderWritten => Err(SelafinError::sequence(format!(
                "文件头已写出, 不能再调用 {}",
                op
            ))),
            WriterState::Failed => Err(failed(op)),
        }
    }

    // ========================================================
    // 配置
    // ========================================================

    /// 设置浮点精度
    pub fn set_precision(&mut self, precision: Precision) -> SelafinResult<()> {
        self.ensure_configuring("set_precision")?;
        self.config.precision = precision;
        Ok(())
    }

    /// 以格式代码与字节宽度设置浮点精度，如 `('f', 4)` 或 `('d', 8)`
    pub fn set_precision_code(&mut self, code: char, size: usize) -> SelafinResult<()> {
        let precision = Precision::from_code(code, size)?;
        self.set_precision(precision)
    }

    /// 设置字节序
    pub fn set_byte_order(&mut self, order: ByteOrder) -> SelafinResult<()> {
        self.ensure_configuring("set_byte_order")?;
        self.config.byte_order = order;
        self.out.set_order(order);
        Ok(())
    }

    /// 设置标题，超过 80 字节的部分被截断
    pub fn set_title(&mut self, title: impl Into<String>) -> SelafinResult<()> {
        self.ensure_configuring("set_title")?;
        let title = title.into();
        if title.len() > TITLE_LEN {
            log::warn!("标题超过 {} 字节, 将被截断: {}", TITLE_LEN, title);
        }
        self.header.title = title;
        Ok(())
    }

    /// 设置变量名，数量即 NBV1
    pub fn set_variable_names<S: AsRef<str>>(&mut self, names: &[S]) -> SelafinResult<()> {
        self.ensure_configuring("set_variable_names")?;
        self.names = names.iter().map(|s| fixed_field("变量名", s.as_ref())).collect();
        Ok(())
    }

    /// 设置变量单位，数量须与变量名一致
    pub fn set_variable_units<S: AsRef<str>>(&mut self, units: &[S]) -> SelafinResult<()> {
        self.ensure_configuring("set_variable_units")?;
        self.units = units.iter().map(|s| fixed_field("单位", s.as_ref())).collect();
        Ok(())
    }

    /// 设置 10 个整数参数
    ///
    /// 已通过 [`set_date`](Self::set_date) 设置日期时，`iparam[9]` 保持为 1。
    pub fn set_iparam(&mut self, iparam: [i32; IPARAM_LEN]) -> SelafinResult<()> {
        self.ensure_configuring("set_iparam")?;
        self.header.iparam = iparam;
        if self.header.date.is_some() && iparam[IPARAM_DATE] != 1 {
            log::warn!("已设置日期, iparam[9] = {} 改为 1", iparam[IPARAM_DATE]);
            self.header.iparam[IPARAM_DATE] = 1;
        }
        Ok(())
    }

    /// 设置日期并置位 `iparam[9]`
    pub fn set_date(&mut self, date: SelafinDate) -> SelafinResult<()> {
        self.ensure_configuring("set_date")?;
        self.header.date = Some(date);
        self.header.iparam[IPARAM_DATE] = 1;
        Ok(())
    }

    /// 设置网格
    ///
    /// `connectivity` 为 0 基、按单元排列，长度须为 `nelem * ndp`；
    /// `boundary_indicator`、`x`、`y` 长度须为 `npoin`。
    #[allow(clippy::too_many_arguments)]
    pub fn set_mesh(
        &mut self,
        nelem: usize,
        npoin: usize,
        ndp: usize,
        connectivity: Vec<usize>,
        boundary_indicator: Vec<i32>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> SelafinResult<()> {
        self.ensure_configuring("set_mesh")?;

        if connectivity.len() != nelem * ndp {
            return Err(SelafinError::shape(
                "connectivity",
                nelem * ndp,
                connectivity.len(),
            ));
        }
        for (name, len) in [
            ("boundary_indicator", boundary_indicator.len()),
            ("x", x.len()),
            ("y", y.len()),
        ] {
            if len != npoin {
                return Err(SelafinError::shape(name, npoin, len));
            }
        }
        if let Some(&bad) = connectivity.iter().find(|&&n| n >= npoin) {
            return Err(SelafinError::index_out_of_range("connectivity", bad, npoin));
        }

        self.header.element_count = nelem;
        self.header.point_count = npoin;
        self.header.points_per_element = ndp;
        self.header.connectivity = connectivity;
        self.header.boundary_indicator = boundary_indicator;
        self.header.x = x;
        self.header.y = y;
        self.mesh_set = true;
        Ok(())
    }

    /// 从已读取的文件头复制全部配置（附加变量除外）
    pub fn set_header(&mut self, header: &SelafinHeader) -> SelafinResult<()> {
        self.ensure_configuring("set_header")?;
        header.validate()?;
        self.set_title(header.title.clone())?;
        self.set_variable_names(&header.variable_names())?;
        self.set_variable_units(&header.variable_units())?;
        self.header.iparam = header.iparam;
        self.header.date = header.date;
        self.header.reserved = header.reserved;
        self.set_mesh(
            header.element_count,
            header.point_count,
            header.points_per_element,
            header.connectivity.clone(),
            header.boundary_indicator.clone(),
            header.x.clone(),
            header.y.clone(),
        )
    }

    // ========================================================
    // 写出
    // ========================================================

    /// 写出文件头，只能调用一次
    pub fn write_header(&mut self) -> SelafinResult<()> {
        self.ensure_configuring("write_header")?;

        if self.names.len() != self.units.len() {
            return Err(SelafinError::configuration(format!(
                "变量名 {} 个, 单位 {} 个, 数量必须一致",
                self.names.len(),
                self.units.len()
            )));
        }
        if !self.mesh_set {
            return Err(SelafinError::configuration("写出文件头前必须调用 set_mesh"));
        }

        self.header.variables = self
            .names
            .iter()
            .zip(&self.units)
            .map(|(n, u)| VariableInfo::new(n.clone(), u.clone()))
            .collect();
        if self.header.has_date() && self.header.date.is_none() {
            log::debug!("未设置日期, 使用默认日期 {}", self.config.default_date);
            self.header.date = Some(self.config.default_date);
        }

        self.header.validate()?;
        if let Err(e) = self.header.write_to(&mut self.out, self.config.precision) {
            self.state = WriterState::Failed;
            return Err(e);
        }
        self.state = WriterState::HeaderWritten;
        log::debug!(
            "SELAFIN 文件头已写出: {} 变量, {} 节点, {} 字节",
            self.header.nbv1(),
            self.header.point_count,
            self.out.bytes_written()
        );
        Ok(())
    }

    /// 追加一个时间步
    ///
    /// `variables` 必须包含 NBV1 个数组，每个长度为 NPOIN。
    pub fn write_timestep<V: AsRef<[f64]>>(
        &mut self,
        time: f64,
        variables: &[V],
    ) -> SelafinResult<()> {
        match self.state {
            WriterState::HeaderWritten => {}
            WriterState::Configuring => {
                return Err(SelafinError::sequence(
                    "写入时间步前必须先调用 write_header",
                ))
            }
            WriterState::Failed => return Err(failed("write_timestep")),
        }

        let nbv1 = self.header.nbv1();
        if variables.len() != nbv1 {
            return Err(SelafinError::shape("variables", nbv1, variables.len()));
        }
        let npoin = self.header.point_count;
        for (i, v) in variables.iter().enumerate() {
            let len = v.as_ref().len();
            if len != npoin {
                return Err(SelafinError::shape(format!("variables[{}]", i), npoin, len));
            }
        }

        if let Err(e) = self.append_timestep(time, variables) {
            self.state = WriterState::Failed;
            return Err(e);
        }
        self.timesteps += 1;
        log::trace!("写入时间步 {} (t = {})", self.timesteps - 1, time);
        Ok(())
    }

    fn append_timestep<V: AsRef<[f64]>>(&mut self, time: f64, variables: &[V]) -> SelafinResult<()> {
        let precision = self.config.precision;
        self.out.write_floats(&[time], precision)?;
        for v in variables {
            self.out.write_floats(v.as_ref(), precision)?;
        }
        Ok(())
    }

    // ========================================================
    // 状态
    // ========================================================

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// 当前配置
    pub fn config(&self) -> &SelafinConfig {
        &self.config
    }

    /// 已写入的时间步数
    pub fn timestep_count(&self) -> usize {
        self.timesteps
    }

    /// 已写入的字节数
    pub fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }

    /// 刷新并取回底层流
    pub fn finish(mut self) -> SelafinResult<W> {
        self.out.flush()?;
        log::debug!(
            "SELAFIN 写入完成: {} 个时间步, {} 字节",
            self.timesteps,
            self.out.bytes_written()
        );
        Ok(self.out.into_inner())
    }

    /// 刷新并关闭
    pub fn close(self) -> SelafinResult<()> {
        self.finish().map(drop)
    }
}

fn failed(op: &str) -> SelafinError {
    SelafinError::sequence(format!("先前的写入已失败, 不能再调用 {}", op))
}

/// 变量名与单位字段为 16 字节，超长时截断并警告
fn fixed_field(what: &str, s: &str) -> String {
    if s.len() > NAME_LEN {
        log::warn!("{}超过 {} 字节, 将被截断: {}", what, NAME_LEN, s);
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SelafinWriter<Vec<u8>> {
        let mut w = SelafinWriter::new(Vec::new(), SelafinConfig::default());
        w.set_title("UNIT").unwrap();
        w.set_variable_names(&["DEPTH"]).unwrap();
        w.set_variable_units(&["M"]).unwrap();
        w.set_mesh(
            1,
            3,
            3,
            vec![0, 1, 2],
            vec![1, 2, 3],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        )
        .unwrap();
        w
    }

    #[test]
    fn test_timestep_before_header() {
        let mut w = configured();
        let err = w.write_timestep(0.0, &[vec![0.0; 3]]).unwrap_err();
        assert!(matches!(err, SelafinError::Sequence(_)));
        assert_eq!(w.timestep_count(), 0);
    }

    #[test]
    fn test_header_twice() {
        let mut w = configured();
        w.write_header().unwrap();
        assert!(matches!(w.write_header(), Err(SelafinError::Sequence(_))));
        assert!(matches!(w.set_title("X"), Err(SelafinError::Sequence(_))));
        assert_eq!(w.state(), WriterState::HeaderWritten);
    }

    #[test]
    fn test_name_unit_mismatch() {
        let mut w = configured();
        w.set_variable_units(&["M", "M/S"]).unwrap();
        assert!(matches!(
            w.write_header(),
            Err(SelafinError::Configuration(_))
        ));
        // 配置错误不改变状态
        assert_eq!(w.state(), WriterState::Configuring);
    }

    #[test]
    fn test_missing_mesh() {
        let mut w = SelafinWriter::new(Vec::new(), SelafinConfig::default());
        w.set_variable_names::<&str>(&[]).unwrap();
        assert!(matches!(
            w.write_header(),
            Err(SelafinError::Configuration(_))
        ));
    }

    #[test]
    fn test_mesh_shape_checks() {
        let mut w = SelafinWriter::new(Vec::new(), SelafinConfig::default());
        let err = w
            .set_mesh(1, 3, 3, vec![0, 1], vec![0; 3], vec![0.0; 3], vec![0.0; 3])
            .unwrap_err();
        assert!(matches!(err, SelafinError::Shape { expected: 3, actual: 2, .. }));

        let err = w
            .set_mesh(1, 3, 3, vec![0, 1, 3], vec![0; 3], vec![0.0; 3], vec![0.0; 3])
            .unwrap_err();
        assert!(matches!(err, SelafinError::IndexOutOfRange { index: 3, len: 3, .. }));
    }

    #[test]
    fn test_timestep_shape_checks() {
        let mut w = configured();
        w.write_header().unwrap();
        assert!(matches!(
            w.write_timestep(0.0, &[vec![0.0; 3], vec![0.0; 3]]),
            Err(SelafinError::Shape { expected: 1, actual: 2, .. })
        ));
        assert!(matches!(
            w.write_timestep(0.0, &[vec![0.0; 2]]),
            Err(SelafinError::Shape { expected: 3, actual: 2, .. })
        ));
        w.write_timestep(0.0, &[[1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(w.timestep_count(), 1);
    }

    #[test]
    fn test_precision_code() {
        let mut w = configured();
        w.set_precision_code('d', 8).unwrap();
        assert_eq!(w.config().precision, Precision::F64);
        assert!(w.set_precision_code('d', 4).is_err());
    }

    #[test]
    fn test_default_date_filled() {
        let mut w = configured();
        let mut iparam = [0; IPARAM_LEN];
        iparam[0] = 1;
        iparam[IPARAM_DATE] = 1;
        w.set_iparam(iparam).unwrap();
        w.write_header().unwrap();
        let bytes = w.finish().unwrap();

        let (header, _, _) =
            SelafinHeader::read_from(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(header.date, Some(SelafinDate::new(1997, 8, 29, 2, 15, 0)));
    }

    #[test]
    fn test_date_survives_later_iparam() {
        let mut w = configured();
        let date = SelafinDate::new(2020, 1, 2, 3, 4, 5);
        w.set_date(date).unwrap();
        let mut iparam = [0; IPARAM_LEN];
        iparam[0] = 1;
        w.set_iparam(iparam).unwrap();
        w.write_header().unwrap();
        let bytes = w.finish().unwrap();

        let (header, _, _) =
            SelafinHeader::read_from(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(header.iparam[0], 1);
        assert_eq!(header.iparam[IPARAM_DATE], 1);
        assert_eq!(header.date, Some(date));
    }

    /// 写满 `budget` 字节后返回错误的输出流
    struct FullDisk {
        data: Vec<u8>,
        budget: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let room = self.budget - self.data.len();
            if room == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"));
            }
            let n = buf.len().min(room);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn configured_on(budget: usize) -> SelafinWriter<FullDisk> {
        let mut w = SelafinWriter::new(
            FullDisk {
                data: Vec::new(),
                budget,
            },
            SelafinConfig::default(),
        );
        w.set_title("UNIT").unwrap();
        w.set_variable_names(&["DEPTH"]).unwrap();
        w.set_variable_units(&["M"]).unwrap();
        w.set_mesh(
            1,
            3,
            3,
            vec![0, 1, 2],
            vec![1, 2, 3],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        )
        .unwrap();
        w
    }

    #[test]
    fn test_failed_header_blocks_further_writes() {
        let mut w = configured_on(100);
        assert!(matches!(w.write_header(), Err(SelafinError::Io(_))));
        assert_eq!(w.state(), WriterState::Failed);

        assert!(matches!(w.write_header(), Err(SelafinError::Sequence(_))));
        assert!(matches!(w.set_title("AGAIN"), Err(SelafinError::Sequence(_))));
        assert!(matches!(
            w.write_timestep(0.0, &[[0.0; 3]]),
            Err(SelafinError::Sequence(_))
        ));
        assert_eq!(w.finish().unwrap().data.len(), 100);
    }

    #[test]
    fn test_failed_timestep_blocks_further_writes() {
        let mut reference = configured();
        reference.write_header().unwrap();
        let header_len = reference.bytes_written() as usize;

        let mut w = configured_on(header_len + 10);
        w.write_header().unwrap();
        assert!(matches!(
            w.write_timestep(0.0, &[[1.0, 2.0, 3.0]]),
            Err(SelafinError::Io(_))
        ));
        assert_eq!(w.state(), WriterState::Failed);
        assert!(matches!(
            w.write_timestep(1.0, &[[1.0, 2.0, 3.0]]),
            Err(SelafinError::Sequence(_))
        ));
        assert_eq!(w.timestep_count(), 0);
    }
}
