// apps/pp_cli/src/commands/extract.rs

//! 单节点时间序列提取命令
//!
//! 逐时间步直接定位到节点数值，不读取整块变量数组。

use anyhow::{Context, Result};
use clap::Args;
use pp_selafin::SelafinReader;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// 提取参数
#[derive(Args)]
pub struct ExtractArgs {
    /// SELAFIN 文件路径
    pub file: PathBuf,

    /// 节点索引 (0 基)
    #[arg(short, long)]
    pub node: usize,

    /// 输出 CSV 文件，缺省写到标准输出
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 执行提取命令
pub fn execute(args: ExtractArgs) -> Result<()> {
    let mut reader = SelafinReader::open(&args.file)
        .with_context(|| format!("无法读取 SELAFIN 文件 {}", args.file.display()))?;

    let series = reader
        .read_variables_at_node(args.node)
        .with_context(|| format!("无法提取节点 {}", args.node))?;
    info!("节点 {}: {} 个时间步", args.node, series.len());

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(
                File::create(path).with_context(|| format!("无法创建 {}", path.display()))?,
            );
            write_csv(&mut out, &reader.variable_names(), reader.times(), &series)?;
            out.flush()?;
            info!("已写出 {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_csv(&mut out, &reader.variable_names(), reader.times(), &series)?;
        }
    }
    Ok(())
}

/// 写出 `time,<变量名>...` 表头及每个时间步一行
pub fn write_csv<W: Write>(
    out: &mut W,
    names: &[&str],
    times: &[f64],
    series: &[Vec<f64>],
) -> Result<()> {
    write!(out, "time")?;
    for n in names {
        write!(out, ",{}", n)?;
    }
    writeln!(out)?;
    for (t, values) in times.iter().zip(series) {
        write!(out, "{}", t)?;
        for v in values {
            write!(out, ",{}", v)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            &["BOTTOM", "FREE SURFACE"],
            &[0.0, 3600.0],
            &[vec![-1.0, 0.5], vec![-1.0, 0.25]],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "time,BOTTOM,FREE SURFACE\n0,-1,0.5\n3600,-1,0.25\n"
        );
    }
}
