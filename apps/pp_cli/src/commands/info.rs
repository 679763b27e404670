// apps/pp_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示 SELAFIN 文件头、变量与时间步。

use anyhow::{Context, Result};
use clap::Args;
use pp_selafin::{ByteOrder, Precision, SelafinDate, SelafinReader, VariableInfo};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// SELAFIN 文件路径
    pub file: PathBuf,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 文件摘要
#[derive(Debug, Serialize)]
pub struct SelafinSummary {
    pub title: String,
    pub byte_order: ByteOrder,
    pub precision: Precision,
    pub variables: Vec<VariableInfo>,
    pub clandestine: Vec<VariableInfo>,
    pub date: Option<SelafinDate>,
    pub element_count: usize,
    pub point_count: usize,
    pub points_per_element: usize,
    pub plane_count: usize,
    pub timestep_count: usize,
    pub times: Vec<f64>,
}

impl SelafinSummary {
    pub fn from_reader<R>(r: &SelafinReader<R>) -> Self
    where
        R: std::io::Read + std::io::Seek,
    {
        let h = r.header();
        Self {
            title: h.title.clone(),
            byte_order: r.byte_order(),
            precision: r.precision(),
            variables: h.variables.clone(),
            clandestine: h.clandestine.clone(),
            date: h.date,
            element_count: h.element_count,
            point_count: h.point_count,
            points_per_element: h.points_per_element,
            plane_count: h.plane_count(),
            timestep_count: r.len(),
            times: r.times().to_vec(),
        }
    }
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let reader = SelafinReader::open(&args.file)
        .with_context(|| format!("无法读取 SELAFIN 文件 {}", args.file.display()))?;
    let summary = SelafinSummary::from_reader(&reader);

    if args.json {
        let stdout = std::io::stdout();
        return write_json(&mut stdout.lock(), &summary);
    }

    info!("=== SELAFIN 信息: {} ===", args.file.display());
    print_summary(&summary);
    Ok(())
}

/// 以缩进 JSON 写出摘要
pub fn write_json<W: Write>(out: &mut W, summary: &SelafinSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)?;
    Ok(())
}

fn print_summary(s: &SelafinSummary) {
    println!("标题: {}", s.title);
    println!("编码: {} 字节序, {} 精度", s.byte_order, s.precision);
    if let Some(date) = s.date {
        println!("日期: {}", date);
    }
    println!(
        "网格: {} 单元, {} 节点, 每单元 {} 节点, {} 层",
        s.element_count, s.point_count, s.points_per_element, s.plane_count
    );

    println!("\n变量 ({}):", s.variables.len());
    for (i, v) in s.variables.iter().enumerate() {
        println!("  {:>2}. {:<16} [{}]", i, v.name, v.unit);
    }
    for v in &s.clandestine {
        println!("   -  {:<16} [{}] (附加)", v.name, v.unit);
    }

    println!("\n时间步: {}", s.timestep_count);
    if let (Some(first), Some(last)) = (s.times.first(), s.times.last()) {
        println!("  范围: {} .. {}", first, last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_selafin::{SelafinConfig, SelafinWriter};

    #[test]
    fn test_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.slf");
        let mut w = SelafinWriter::create(&path, SelafinConfig::default()).unwrap();
        w.set_title("DEMO").unwrap();
        w.set_variable_names(&["BOTTOM", "VELOCITY U"]).unwrap();
        w.set_variable_units(&["M", "M/S"]).unwrap();
        w.set_date(SelafinDate::new(2001, 2, 3, 4, 5, 6)).unwrap();
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
        w.write_header().unwrap();
        for t in [0.0, 60.0] {
            w.write_timestep(t, &[[0.0; 3], [t; 3]]).unwrap();
        }
        w.close().unwrap();

        let reader = SelafinReader::open(&path).unwrap();
        let summary = SelafinSummary::from_reader(&reader);
        let mut buf = Vec::new();
        write_json(&mut buf, &summary).unwrap();

        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["title"], "DEMO");
        assert_eq!(v["byte_order"], "big");
        assert_eq!(v["precision"], "f32");
        assert_eq!(v["variables"][1]["name"], "VELOCITY U");
        assert_eq!(v["variables"][1]["unit"], "M/S");
        assert_eq!(v["date"], serde_json::json!([2001, 2, 3, 4, 5, 6]));
        assert_eq!(v["point_count"], 3);
        assert_eq!(v["timestep_count"], 2);
        assert_eq!(v["times"], serde_json::json!([0.0, 60.0]));
    }
}
