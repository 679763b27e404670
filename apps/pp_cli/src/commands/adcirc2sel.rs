// apps/pp_cli/src/commands/adcirc2sel.rs

//! ADCIRC → SELAFIN 转换命令
//!
//! 节点高程写为单个 `BOTTOM` 变量，IPOBO 由边界提取生成，可选同时写出全固壁的 `.cli` 文件。

use anyhow::{bail, Context, Result};
use clap::Args;
use pp_mesh::io::{AdcircLoader, CliFile};
use pp_mesh::{BoundaryExtractor, TriMesh};
use pp_selafin::{ByteOrder, Precision, SelafinConfig, SelafinHeader, SelafinWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 转换参数
#[derive(Args)]
pub struct Adcirc2SelArgs {
    /// 输入 ADCIRC 网格
    #[arg(short, long)]
    pub input: PathBuf,

    /// 输出 SELAFIN 文件
    #[arg(short, long)]
    pub output: PathBuf,

    /// 同时写出 TELEMAC 边界条件文件
    #[arg(long)]
    pub cli: Option<PathBuf>,

    /// 双精度输出
    #[arg(long)]
    pub double: bool,

    /// 小端输出
    #[arg(long)]
    pub little_endian: bool,

    /// 写入器配置文件 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 读取配置文件并应用命令行开关
pub fn resolve_config(
    path: Option<&Path>,
    double: bool,
    little_endian: bool,
) -> Result<SelafinConfig> {
    let mut config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("无法读取配置文件 {}", p.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("配置文件格式错误 {}", p.display()))?
        }
        None => SelafinConfig::default(),
    };
    if double {
        config.precision = Precision::F64;
    }
    if little_endian {
        config.byte_order = ByteOrder::Little;
    }
    Ok(config)
}

/// 执行转换命令
pub fn execute(args: Adcirc2SelArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), args.double, args.little_endian)?;

    let mut mesh = AdcircLoader::load(&args.input)
        .with_context(|| format!("无法读取 ADCIRC 网格 {}", args.input.display()))?;
    prepare_mesh(&mut mesh)?;

    let loops = BoundaryExtractor::extract(&mesh)?;
    let ipobo = BoundaryExtractor::boundary_numbering(&loops, mesh.n_nodes())?;
    info!(
        "{} 个边界循环, {} 个边界节点",
        loops.len(),
        ipobo.iter().filter(|&&k| k > 0).count()
    );

    let header = SelafinHeader::from_mesh(
        mesh.title.clone(),
        &mesh.triangles,
        mesh.x.clone(),
        mesh.y.clone(),
        ipobo,
    )?;

    let mut writer = SelafinWriter::create(&args.output, config)
        .with_context(|| format!("无法创建 {}", args.output.display()))?;
    writer.set_header(&header)?;
    writer.set_variable_names(&["BOTTOM"])?;
    writer.set_variable_units(&["M"])?;
    writer.write_header()?;
    writer.write_timestep(0.0, &[&mesh.z])?;
    writer.close()?;
    info!("已写出 {}", args.output.display());

    if let Some(cli_path) = &args.cli {
        let cli = CliFile::land(&BoundaryExtractor::boundary_nodes(&loops));
        cli.write(cli_path)
            .with_context(|| format!("无法写出 {}", cli_path.display()))?;
        info!("已写出 {} ({} 个边界节点)", cli_path.display(), cli.len());
    }

    Ok(())
}

/// 统一单元方向并检查网格
fn prepare_mesh(mesh: &mut TriMesh) -> Result<()> {
    let flipped = mesh.orient_counter_clockwise();
    if flipped > 0 {
        warn!("{} 个顺时针单元已调整为逆时针", flipped);
    }

    let report = mesh.validate();
    for w in &report.warnings {
        warn!("{}", w);
    }
    if report.has_errors() {
        bail!("网格检查未通过:\n{}", report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_flags() {
        let config = resolve_config(None, true, true).unwrap();
        assert_eq!(config.precision, Precision::F64);
        assert_eq!(config.byte_order, ByteOrder::Little);
    }

    #[test]
    fn test_resolve_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "precision": "f64" }"#).unwrap();

        let config = resolve_config(Some(path.as_path()), false, false).unwrap();
        assert_eq!(config.precision, Precision::F64);
        assert_eq!(config.byte_order, ByteOrder::Big);
        assert_eq!(config.default_date.to_array(), [1997, 8, 29, 2, 15, 0]);
    }

    #[test]
    fn test_resolve_config_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ precision").unwrap();
        assert!(resolve_config(Some(path.as_path()), false, false).is_err());
    }
}
