use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rivetfix_config::{AppConfig, ConfigError};
use rivetfix_frontend::{RunOutcome, RunRequest};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// 校正 DXF 钣金展开图中铆钉孔到边缘的距离。
#[derive(Debug, Parser)]
#[command(name = "rivetfix", version, about)]
struct Cli {
    /// DXF 文件或包含 DXF 文件的目录
    input: PathBuf,

    /// 输出目录（默认写在输入文件旁边）
    output_dir: Option<PathBuf>,

    /// 仅报告，不修改也不保存任何文件
    #[arg(long)]
    dry_run: bool,

    /// 配置文件路径，优先于 RIVETFIX_CONFIG 与 ./config/default.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 目录模式下遇到第一个失败文件即停止
    #[arg(long)]
    fail_fast: bool,

    /// 在表格中列出被忽略的非铆钉孔
    #[arg(long)]
    show_ignored: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = match load_configuration(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    init_logging(&config);
    info!("启动 rivetfix");
    if let Some(err) = config_error {
        warn_config_fallback(&err);
    }

    let request = RunRequest {
        input: cli.input,
        output_dir: cli.output_dir,
        dry_run: cli.dry_run,
        show_ignored: cli.show_ignored,
        fail_fast: cli.fail_fast,
    };

    match rivetfix_frontend::run(&request, &config, io::stdout().lock()) {
        Ok(RunOutcome::File(summary)) => {
            info!(corrected = summary.counters.corrected, "处理完成");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Directory(batch)) => {
            info!(
                files = batch.files,
                corrected = batch.corrected_total(),
                failed = batch.failed.len(),
                "批处理完成"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "处理失败");
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}

/// 加载配置：`--config` 优先，否则按环境变量与默认路径自动发现。
///
/// 日志尚未初始化，错误交给调用方在 `init_logging` 之后输出。
fn load_configuration(override_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    }
}

fn warn_config_fallback(err: &ConfigError) {
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
        }
        ConfigError::Context { .. } => {
            warn!(error = %err, "加载配置失败，使用内建默认值");
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
