// apps/pp_cli/src/main.rs

//! PPUTILS 命令行界面
//!
//! SELAFIN 与 ADCIRC 网格的前后处理工具。库中的 `log` 记录经由
//! tracing-subscriber 输出。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// PPUTILS 网格前后处理工具
#[derive(Parser)]
#[command(name = "pputils")]
#[command(author = "PPUTILS Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pre/post-processing tools for SELAFIN and ADCIRC meshes", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示 SELAFIN 文件信息
    Info(commands::info::InfoArgs),
    /// 提取单个节点的时间序列
    Extract(commands::extract::ExtractArgs),
    /// ADCIRC 网格转换为 SELAFIN
    Adcirc2sel(commands::adcirc2sel::Adcirc2SelArgs),
    /// SELAFIN 转换为 ADCIRC 网格
    Sel2adcirc(commands::sel2adcirc::Sel2AdcircArgs),
    /// 提取 ADCIRC 网格的边界多边形
    Boundary(commands::boundary::BoundaryArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish()
        .try_init()?;

    // 执行命令
    match cli.command {
        Commands::Info(args) => commands::info::execute(args),
        Commands::Extract(args) => commands::extract::execute(args),
        Commands::Adcirc2sel(args) => commands::adcirc2sel::execute(args),
        Commands::Sel2adcirc(args) => commands::sel2adcirc::execute(args),
        Commands::Boundary(args) => commands::boundary::execute(args),
    }
}
