pub mod batch;
pub mod errors;
pub mod report;

use std::io::Write;
use std::path::PathBuf;

use batch::{
    BatchSummary, FileSummary, ProcessOptions, output_path_for, process_directory, process_file,
};
use errors::FrontendError;
use report::Report;
use rivetfix_config::{AppConfig, RivetConfig};
use rivetfix_engine::correction::{CorrectionConfig, ToleranceBand};
use rivetfix_io::DxfFacade;
use tracing::info;

/// 命令行解析后的一次运行请求。
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub show_ignored: bool,
    pub fail_fast: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    File(FileSummary),
    Directory(BatchSummary),
}

/// 把配置文件中的铆钉参数转换为校正引擎使用的不可变配置。
pub fn correction_config(rivet: &RivetConfig) -> Result<CorrectionConfig, FrontendError> {
    let diameter = ToleranceBand::new("diameter", rivet.nominal_diameter, rivet.diameter_tolerance)?;
    let near = ToleranceBand::new("near", rivet.target_distance, rivet.near_tolerance)?;
    let far = ToleranceBand::new("far", rivet.far_distance, rivet.far_tolerance)?;
    Ok(CorrectionConfig::new(diameter, near, far, rivet.correction)?)
}

/// 执行一次校正：输入为文件时处理单个文件，为目录时批量处理。
pub fn run<W: Write>(
    request: &RunRequest,
    config: &AppConfig,
    out: W,
) -> Result<RunOutcome, FrontendError> {
    let options = ProcessOptions {
        correction: correction_config(&config.rivet)?,
        output: config.output.clone(),
        dry_run: request.dry_run,
        show_ignored: request.dry_run || request.show_ignored,
        continue_on_error: config.batch.continue_on_error && !request.fail_fast,
    };
    let facade = DxfFacade::new();
    let mut report = Report::new(out, request.dry_run);
    let output_dir = request.output_dir.as_deref();

    if request.input.is_file() {
        info!(path = %request.input.display(), dry_run = request.dry_run, "处理单个 DXF 文件");
        let output_path = output_dir
            .filter(|_| !request.dry_run)
            .map(|dir| output_path_for(&request.input, Some(dir), &options.output));
        let summary = process_file(&facade, &request.input, output_path, &options, &mut report)?;
        Ok(RunOutcome::File(summary))
    } else if request.input.is_dir() {
        info!(path = %request.input.display(), dry_run = request.dry_run, "批量处理目录");
        let output_dir = output_dir.filter(|_| !request.dry_run);
        let summary =
            process_directory(&facade, &request.input, output_dir, &options, &mut report)?;
        Ok(RunOutcome::Directory(summary))
    } else {
        Err(FrontendError::InputNotFound(request.input.clone()))
    }
}
