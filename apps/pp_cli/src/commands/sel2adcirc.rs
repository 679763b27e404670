// apps/pp_cli/src/commands/sel2adcirc.rs

//! SELAFIN → ADCIRC 转换命令
//!
//! 选定变量在选定时间步的数值写为 ADCIRC 节点 z 值。

use anyhow::{bail, Context, Result};
use clap::Args;
use pp_mesh::io::AdcircWriter;
use pp_mesh::TriMesh;
use pp_selafin::SelafinReader;
use std::io::{Read, Seek};
use std::path::PathBuf;
use tracing::{info, warn};

/// 转换参数
#[derive(Args)]
pub struct Sel2AdcircArgs {
    /// 输入 SELAFIN 文件
    #[arg(short, long)]
    pub input: PathBuf,

    /// 输出 ADCIRC 网格
    #[arg(short, long)]
    pub output: PathBuf,

    /// 写为 z 值的变量名，缺省为第一个变量
    #[arg(long)]
    pub var: Option<String>,

    /// 时间步索引，缺省为最后一个时间步
    #[arg(long)]
    pub step: Option<usize>,
}

/// 执行转换命令
pub fn execute(args: Sel2AdcircArgs) -> Result<()> {
    let mut reader = SelafinReader::open(&args.input)
        .with_context(|| format!("无法读取 SELAFIN 文件 {}", args.input.display()))?;

    let mesh = to_trimesh(&mut reader, args.var.as_deref(), args.step)?;
    AdcircWriter::write(&args.output, &mesh)
        .with_context(|| format!("无法写出 {}", args.output.display()))?;
    info!(
        "已写出 {} ({} 节点, {} 单元)",
        args.output.display(),
        mesh.n_nodes(),
        mesh.n_elements()
    );
    Ok(())
}

/// 由 SELAFIN 文件构造二维三角网格
pub fn to_trimesh<R: Read + Seek>(
    reader: &mut SelafinReader<R>,
    var: Option<&str>,
    step: Option<usize>,
) -> Result<TriMesh> {
    let header = reader.header().clone();
    let Some(triangles) = header.triangles() else {
        bail!("仅支持三角形网格, 当前每单元 {} 个节点", header.points_per_element);
    };
    if header.is_3d() {
        bail!("不支持 {} 层的三维网格", header.plane_count());
    }

    let z = if header.variables.is_empty() || reader.is_empty() {
        warn!("文件没有变量或时间步, z 值写为 0");
        vec![0.0; header.point_count]
    } else {
        let var_idx = match var {
            Some(name) => header
                .variable_index(name)
                .with_context(|| format!("找不到变量 {:?}, 可用变量: {:?}", name, header.variable_names()))?,
            None => 0,
        };
        let step = step.unwrap_or(reader.len() - 1);
        info!(
            "使用变量 {} 在时间步 {} (t = {})",
            header.variables[var_idx].name,
            step,
            reader.times().get(step).copied().unwrap_or(f64::NAN)
        );
        reader.read_variable_at(step, var_idx)?
    };

    Ok(TriMesh::new(
        header.title.clone(),
        header.x,
        header.y,
        z,
        triangles,
    )?)
}
