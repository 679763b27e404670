// apps/pp_cli/src/commands/boundary.rs

//! 边界提取命令
//!
//! 读取 ADCIRC 网格，写出 gredit 格式的边界多边形。

use anyhow::{Context, Result};
use clap::Args;
use pp_mesh::io::{AdcircLoader, BndFile};
use pp_mesh::BoundaryExtractor;
use std::path::PathBuf;
use tracing::info;

/// 边界提取参数
#[derive(Args)]
pub struct BoundaryArgs {
    /// 输入 ADCIRC 网格
    #[arg(short, long)]
    pub input: PathBuf,

    /// 输出边界多边形文件
    #[arg(short, long, default_value = "gredit.bnd")]
    pub output: PathBuf,
}

/// 执行边界提取命令
pub fn execute(args: BoundaryArgs) -> Result<()> {
    let mut mesh = AdcircLoader::load(&args.input)
        .with_context(|| format!("无法读取 ADCIRC 网格 {}", args.input.display()))?;
    mesh.orient_counter_clockwise();

    let loops = BoundaryExtractor::extract(&mesh)?;
    for (i, l) in loops.iter().enumerate() {
        info!(
            "循环 {}: {} 节点, 周长 {:.3}, {}",
            i,
            l.len(),
            l.perimeter,
            if l.is_outer { "外边界" } else { "岛屿" }
        );
    }

    let bnd = BndFile::from_loops(&loops);
    bnd.write(&args.output)
        .with_context(|| format!("无法写出 {}", args.output.display()))?;
    info!("已写出 {} ({} 个多边形)", args.output.display(), bnd.polygons.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRD: &str = "\
square
2 4
1 0.0 0.0 -5.0
2 10.0 0.0 -6.0
3 0.0 10.0 -7.0
4 10.0 10.0 -8.0
1 3 1 2 3
2 3 2 4 3
";

    #[test]
    fn test_writes_gredit_bnd() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("square.grd");
        let output = dir.path().join("gredit.bnd");
        std::fs::write(&input, GRD).unwrap();

        execute(BoundaryArgs {
            input,
            output: output.clone(),
        })
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "1\n4 0\n1\n2\n4\n3\n"
        );
        let bnd = BndFile::load(&output).unwrap();
        assert_eq!(bnd.polygons[0].nodes, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(BoundaryArgs {
            input: dir.path().join("none.grd"),
            output: dir.path().join("gredit.bnd"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("none.grd"));
    }
}
