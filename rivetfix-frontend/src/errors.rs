use std::path::PathBuf;

use rivetfix_engine::errors::EngineError;
use rivetfix_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("输入路径 {0:?} 不存在，或既不是文件也不是目录")]
    InputNotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("校正参数无效: {0}")]
    InvalidConfig(#[from] EngineError),
    #[error("创建输出目录 {path:?} 失败: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("遍历目录 {path:?} 失败: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("写出报告失败: {0}")]
    Report(#[from] std::io::Error),
    #[error("处理 {path:?} 失败，批处理已中止: {source}")]
    BatchAborted {
        path: PathBuf,
        #[source]
        source: Box<FrontendError>,
    },
}
