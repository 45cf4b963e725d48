//! 门户模块管理工具（portalctl）。
//!
//! 职责：
//! - 从清单目录加载业务模块清单（`<dir>/*.json`，按文件名升序作为发现顺序）
//! - 将物化后的候选集交给模块注册表，提供查询/编排/体检子命令
//! - `doctor` 子命令逐条复核候选清单并给出剔除原因（用于交付前自检）
//!
//! 约定：
//! - 注册表自身不做 IO；本工具就是规格中“外部加载器”这一协作方
//! - 按文件名升序加载，相当于一份显式的构建期索引，发现顺序与文件系统
//!   枚举顺序无关
//!
//! 作者：云合管理控制台项目组（自动生成）
//! 创建时间：2026-08-23
//! 修改时间：2026-08-23

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use yunhe_core::registry::{validate_candidate, ModuleCandidate, ModuleRegistry};
use yunhe_core::routes::compose_routes;
use yunhe_core::selection::ModuleSelection;

/// 命令行参数。
///
/// 说明：
/// - `manifest_dir` 指向模块清单目录（默认仓库根的 `manifests/`）
/// - 启用选择通过各子命令的 `--selection` 传入（`*` 或逗号分隔 id 列表）
#[derive(Debug, Parser)]
#[command(name = "yunhe-portalctl", version)]
struct Cli {
    #[arg(long, default_value = "manifests")]
    manifest_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// portalctl 支持的子命令。
#[derive(Debug, Subcommand)]
enum Commands {
    /// 列出全部有效模块（按 id 升序，附默认启用标记）。
    List,
    /// 按选择配置输出启用模块 id（保持选择顺序）。
    Enabled {
        #[arg(long, default_value = "")]
        selection: ModuleSelection,
    },
    /// 输出编排后的路由树 JSON（布局/独立路由、重定向表、活跃路径映射）。
    Routes {
        #[arg(long, default_value = "*")]
        selection: ModuleSelection,
    },
    /// 清单目录体检：逐条复核候选并报告剔除原因（存在问题时退出码非零）。
    Doctor,
}

/// 程序入口：解析参数并分发子命令。
///
/// 异常处理：
/// - 清单目录不可读属于调用环境问题，直接返回错误
/// - 单条清单的坏数据不会导致非 doctor 子命令失败（由注册表降级处理）
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_target(false)
        // 诊断日志走 stderr，stdout 留给子命令的机器可读输出。
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::List => list(&cli),
        Commands::Enabled { selection } => enabled(&cli, selection),
        Commands::Routes { selection } => routes(&cli, selection),
        Commands::Doctor => doctor(&cli),
    }
}

/// 枚举清单目录下的 `*.json` 文件，按文件名升序返回。
///
/// 异常处理：
/// - 目录不存在/不可读返回错误（发现顺序必须可复现，不能静默降级为空集）。
fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("读取清单目录失败: {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

/// 加载清单目录并物化候选集。
///
/// 行为：
/// - 每个文件解析为一条候选（来源标签 = 文件名）
/// - JSON 解析失败的文件记录 warn 后跳过，不影响其余候选
///   （与注册表“坏模块缺席”的降级语义一致）
fn load_candidates(dir: &Path) -> Result<Vec<ModuleCandidate>> {
    let mut candidates = Vec::new();
    for path in manifest_files(dir)? {
        let source = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("<unknown>")
            .to_string();
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("读取清单文件失败: {}", path.display()))?;
        match serde_json::from_str(&raw) {
            Ok(value) => candidates.push(ModuleCandidate::new(source, value)),
            Err(e) => warn!("portalctl: 清单文件 {source} 不是合法 JSON，已跳过: {e}"),
        }
    }
    Ok(candidates)
}

/// 加载清单目录并构建注册表。
fn load_registry(cli: &Cli) -> Result<ModuleRegistry> {
    Ok(ModuleRegistry::new(load_candidates(&cli.manifest_dir)?))
}

/// `list`：打印全部有效模块。
///
/// 输出格式（每模块一行）：
/// - `<id> enabledByDefault=<bool> apiNamespace=<tag>`
fn list(cli: &Cli) -> Result<()> {
    let registry = load_registry(cli)?;
    for m in registry.all_modules() {
        println!(
            "{} enabledByDefault={} apiNamespace={}",
            m.id, m.enabled_by_default, m.api_namespace
        );
    }
    Ok(())
}

/// `enabled`：按选择配置打印启用模块 id（每行一个，保持选择顺序）。
fn enabled(cli: &Cli, selection: &ModuleSelection) -> Result<()> {
    let registry = load_registry(cli)?;
    for m in registry.enabled_modules(selection) {
        println!("{}", m.id);
    }
    Ok(())
}

/// `routes`：编排启用模块的路由树并输出 JSON。
fn routes(cli: &Cli, selection: &ModuleSelection) -> Result<()> {
    let registry = load_registry(cli)?;
    let composed = compose_routes(&registry.enabled_modules(selection));
    println!("{}", serde_json::to_string_pretty(&composed)?);
    Ok(())
}

/// `doctor`：逐条复核候选清单并报告结果。
///
/// 输出格式（每文件一行）：
/// - 合法：`OK <文件名> id=<id>`
/// - 非法：`FAIL <文件名>: <原因>`（JSON 解析失败/校验失败/重复 id）
///
/// 异常处理：
/// - 任一候选不健康时返回错误（退出码非零），便于在 CI/交付脚本中拦截。
fn doctor(cli: &Cli) -> Result<()> {
    let mut seen_ids: Vec<String> = Vec::new();
    let mut failures = 0usize;
    let files = manifest_files(&cli.manifest_dir)?;
    for path in &files {
        let source = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("<unknown>")
            .to_string();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("读取清单文件失败: {}", path.display()))?;
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                println!("FAIL {source}: 不是合法 JSON: {e}");
                failures += 1;
                continue;
            }
        };
        match validate_candidate(&ModuleCandidate::new(source.clone(), value)) {
            Ok(m) if seen_ids.contains(&m.id) => {
                println!("FAIL {source}: 重复模块 id={}（先发现者生效）", m.id);
                failures += 1;
            }
            Ok(m) => {
                println!("OK {source} id={}", m.id);
                seen_ids.push(m.id);
            }
            Err(e) => {
                println!("FAIL {source}: {e}");
                failures += 1;
            }
        }
    }
    println!("检查完成: {} 个清单, {} 个问题", files.len(), failures);
    if failures > 0 {
        return Err(anyhow!("清单目录存在 {failures} 个问题"));
    }
    Ok(())
}
