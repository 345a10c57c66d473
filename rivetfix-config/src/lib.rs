use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "RIVETFIX_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rivet: RivetConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `RIVETFIX_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_from(env::var_os(CONFIG_ENV), &cwd)
    }

    pub fn discover_from(env_path: Option<OsString>, base_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = env_path {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = base_dir.join("config").join("default.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 铆钉孔识别与校正参数，单位 mm。
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RivetConfig {
    pub nominal_diameter: f64,
    pub diameter_tolerance: f64,
    pub target_distance: f64,
    pub near_tolerance: f64,
    pub far_distance: f64,
    pub far_tolerance: f64,
    pub correction: f64,
}

impl Default for RivetConfig {
    fn default() -> Self {
        Self {
            nominal_diameter: 4.2,
            diameter_tolerance: 0.3,
            target_distance: 10.0,
            near_tolerance: 4.0,
            far_distance: 30.0,
            far_tolerance: 8.0,
            correction: -20.0,
        }
    }
}

/// 输出文件命名：`<stem><suffix>.<extension>`。
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_suffix")]
    pub suffix: String,
    #[serde(default = "OutputConfig::default_extension")]
    pub extension: String,
}

impl OutputConfig {
    fn default_suffix() -> String {
        "_fixed".to_string()
    }

    fn default_extension() -> String {
        "DXF".to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: Self::default_suffix(),
            extension: Self::default_extension(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// 目录模式下单个文件失败后是否继续处理其余文件。
    #[serde(default = "BatchConfig::default_continue_on_error")]
    pub continue_on_error: bool,
}

impl BatchConfig {
    fn default_continue_on_error() -> bool {
        true
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            continue_on_error: Self::default_continue_on_error(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
