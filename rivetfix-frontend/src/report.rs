use std::io::{self, Write};
use std::path::Path;

use rivetfix_engine::correction::CorrectionConfig;
use rivetfix_engine::pass::{Disposition, HoleOutcome, PassCounters};

const RULE_WIDTH: usize = 70;
const TABLE_WIDTH: usize = 76;

/// 控制台报告。只负责排版，不参与任何判定。
pub struct Report<W: Write> {
    out: W,
    dry_run: bool,
}

impl<W: Write> Report<W> {
    pub fn new(out: W, dry_run: bool) -> Self {
        Self { out, dry_run }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    pub fn batch_header(&mut self, file_count: usize) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule()?;
        writeln!(self.out, "待处理 DXF 文件: {file_count} 个")?;
        let mode = if self.dry_run {
            "DRY-RUN（仅模拟）"
        } else {
            "PRODUCTION"
        };
        writeln!(self.out, "模式: {mode}")?;
        self.rule()
    }

    pub fn no_files(&mut self, dir: &Path) -> io::Result<()> {
        writeln!(self.out, " 目录 {} 中没有 DXF 文件", dir.display())
    }

    pub fn file_header(&mut self, path: &Path) -> io::Result<()> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        writeln!(self.out)?;
        self.rule()?;
        writeln!(self.out, "文件: {name}")?;
        self.rule()
    }

    pub fn no_holes(&mut self) -> io::Result<()> {
        writeln!(self.out, " 未找到任何孔")
    }

    pub fn table_header(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  {:<4} {:<20} {:<7} {:>8} 操作",
            "孔", "位置", "Ø", "距离"
        )?;
        writeln!(self.out, "{}", "-".repeat(TABLE_WIDTH))
    }

    pub fn hole_row(&mut self, outcome: &HoleOutcome, config: &CorrectionConfig) -> io::Result<()> {
        let position = format!("({:.1}, {:.1})", outcome.center.x(), outcome.center.y());
        let diameter = format!("{:.1}mm", outcome.diameter);
        let distance = outcome
            .distance
            .map(|d| format!("{d:.1}mm"))
            .unwrap_or_default();

        let (marker, action) = match outcome.disposition {
            Disposition::AlreadyCorrect => (
                "=",
                format!("正确（已在 {}mm）", config.near().nominal()),
            ),
            Disposition::Corrected { .. } => ("*", format!("移动 {}mm", config.correction())),
            Disposition::Indeterminate => match outcome.distance {
                Some(d) => ("?", format!("? （距离: {d:.1}mm）")),
                None => ("?", "? （没有可测量的直线边）".to_string()),
            },
            Disposition::Ignored => (
                " ",
                format!("忽略（Ø ≠ {}mm）", config.diameter().nominal()),
            ),
        };

        writeln!(
            self.out,
            "{marker} {:<4} {position:<20} {diameter:<7} {distance:>8} {action}",
            outcome.index
        )
    }

    pub fn summary(&mut self, counters: &PassCounters, config: &CorrectionConfig) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(TABLE_WIDTH))?;
        let corrected_label = if self.dry_run { "待校正" } else { "已校正" };
        write!(
            self.out,
            "汇总: {} 正确, {} {corrected_label}, {} 无法判定",
            counters.ok, counters.corrected, counters.unknown
        )?;
        if counters.ignored > 0 {
            write!(
                self.out,
                ", {} 已忽略（Ø ≠ {}mm）",
                counters.ignored,
                config.diameter().nominal()
            )?;
        }
        writeln!(self.out)
    }

    pub fn saved(&mut self, path: &Path) -> io::Result<()> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        writeln!(self.out, " 已保存: {name}")
    }

    pub fn file_failed(&mut self, path: &Path, reason: &dyn std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, " 处理 {} 失败: {reason}", path.display())
    }

    pub fn batch_total(&mut self, corrected: usize, files: usize, failed: usize) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule()?;
        let verb = if self.dry_run { "个孔待校正" } else { "个孔已校正" };
        write!(self.out, " 合计: {corrected} {verb}，共 {files} 个文件")?;
        if failed > 0 {
            write!(self.out, "，其中 {failed} 个文件处理失败")?;
        }
        writeln!(self.out)?;
        self.rule()
    }
}
