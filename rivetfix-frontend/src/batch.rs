use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rivetfix_config::OutputConfig;
use rivetfix_engine::correction::CorrectionConfig;
use rivetfix_engine::pass::{Disposition, PassCounters, apply_corrections, run_pass};
use rivetfix_io::{DocumentLoader, DocumentSaver};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::FrontendError;
use crate::report::Report;

/// 一次运行内共享的处理选项。
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub correction: CorrectionConfig,
    pub output: OutputConfig,
    pub dry_run: bool,
    /// 是否在表格中列出被忽略的孔。
    pub show_ignored: bool,
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FileSummary {
    pub counters: PassCounters,
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub files: usize,
    pub counters: PassCounters,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    /// 各文件校正数量之和。
    #[inline]
    pub fn corrected_total(&self) -> usize {
        self.counters.corrected
    }
}

/// 生成输出文件路径：`<stem><suffix>.<extension>`，位于 `output_dir` 或输入文件所在目录。
pub fn output_path_for(input: &Path, output_dir: Option<&Path>, naming: &OutputConfig) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = if naming.extension.is_empty() {
        format!("{stem}{}", naming.suffix)
    } else {
        format!("{stem}{}.{}", naming.suffix, naming.extension)
    };
    let dir = output_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new(""));
    dir.join(file_name)
}

/// 列出目录下（不递归）扩展名为 `.dxf` 的文件，扩展名不区分大小写，按文件名排序。
pub fn discover_dxf_files(dir: &Path) -> Result<Vec<PathBuf>, FrontendError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| FrontendError::ListDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        let is_dxf = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dxf"));
        if entry.file_type().is_file() && is_dxf {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), FrontendError> {
    fs::create_dir_all(dir).map_err(|source| FrontendError::CreateOutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// 处理单个 DXF：评估全部孔、输出报告，必要时保存校正结果。
///
/// `output_path` 为空时写到输入文件旁边；输出目录只在确实需要保存时创建。
/// dry-run 模式从不修改或保存文档。
pub fn process_file<F, W>(
    facade: &F,
    path: &Path,
    output_path: Option<PathBuf>,
    options: &ProcessOptions,
    report: &mut Report<W>,
) -> Result<FileSummary, FrontendError>
where
    F: DocumentLoader + DocumentSaver,
    W: Write,
{
    report.file_header(path)?;

    let mut drawing = facade.load(path)?;
    let circle_count = drawing.document().circle_count();
    info!(path = %path.display(), circles = circle_count, "已加载 DXF");

    if circle_count == 0 {
        report.no_holes()?;
        return Ok(FileSummary::default());
    }

    let pass = run_pass(drawing.document(), &options.correction);

    report.table_header()?;
    for outcome in &pass.outcomes {
        if outcome.disposition == Disposition::Ignored && !options.show_ignored {
            continue;
        }
        report.hole_row(outcome, &options.correction)?;
    }
    report.summary(&pass.counters, &options.correction)?;

    let mut summary = FileSummary {
        counters: pass.counters,
        saved_to: None,
    };

    if options.dry_run || !pass.has_corrections() {
        debug!(path = %path.display(), dry_run = options.dry_run, "无需保存");
        return Ok(summary);
    }

    let moved = apply_corrections(drawing.document_mut(), &pass);
    let target = match output_path {
        Some(target) => {
            if let Some(dir) = target.parent() {
                ensure_output_dir(dir)?;
            }
            target
        }
        None => output_path_for(path, None, &options.output),
    };
    facade.save(&drawing, &target)?;
    info!(
        input = %path.display(),
        output = %target.display(),
        moved,
        "已保存校正后的 DXF"
    );
    report.saved(&target)?;
    summary.saved_to = Some(target);
    Ok(summary)
}

/// 处理目录下的全部 DXF 文件，汇总各文件的校正数量。
pub fn process_directory<F, W>(
    facade: &F,
    dir: &Path,
    output_dir: Option<&Path>,
    options: &ProcessOptions,
    report: &mut Report<W>,
) -> Result<BatchSummary, FrontendError>
where
    F: DocumentLoader + DocumentSaver,
    W: Write,
{
    let files = discover_dxf_files(dir)?;
    if files.is_empty() {
        report.no_files(dir)?;
        return Ok(BatchSummary::default());
    }

    report.batch_header(files.len())?;
    info!(dir = %dir.display(), files = files.len(), "开始批处理");

    let mut batch = BatchSummary {
        files: files.len(),
        ..BatchSummary::default()
    };

    for file in &files {
        let output_path = output_dir.map(|out| output_path_for(file, Some(out), &options.output));
        match process_file(facade, file, output_path, options, report) {
            Ok(summary) => batch.counters += summary.counters,
            Err(FrontendError::Report(err)) => return Err(FrontendError::Report(err)),
            Err(err) => {
                warn!(path = %file.display(), error = %err, "处理 DXF 失败");
                report.file_failed(file, &err)?;
                if !options.continue_on_error {
                    return Err(FrontendError::BatchAborted {
                        path: file.clone(),
                        source: Box::new(err),
                    });
                }
                batch.failed.push((file.clone(), err.to_string()));
            }
        }
    }

    report.batch_total(batch.corrected_total(), batch.files, batch.failed.len())?;
    Ok(batch)
}
