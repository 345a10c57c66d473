use std::ops::AddAssign;

use rivetfix_core::document::{Circle, Document, EntityId};
use rivetfix_core::geometry::{Point3, Segment2, Vector2};
use tracing::{debug, warn};

use crate::correction::{CorrectionConfig, Decision, HoleClass, classify, decide};
use crate::resolver::nearest_edge;

/// 单个孔的最终处置。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Disposition {
    AlreadyCorrect,
    Corrected { displacement: Vector2, target: Point3 },
    Indeterminate,
    Ignored,
}

/// 孔的完整评估结果，无论是否打印都会生成。
#[derive(Debug, Clone, PartialEq)]
pub struct HoleOutcome {
    /// 从 1 开始的孔序号，按文件顺序。
    pub index: usize,
    pub id: EntityId,
    pub center: Point3,
    pub diameter: f64,
    /// 到最近直边的距离；没有直边或孔被忽略时为 `None`。
    pub distance: Option<f64>,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounters {
    pub ok: usize,
    pub corrected: usize,
    pub unknown: usize,
    pub ignored: usize,
}

impl PassCounters {
    pub fn record(&mut self, disposition: &Disposition) {
        match disposition {
            Disposition::AlreadyCorrect => self.ok += 1,
            Disposition::Corrected { .. } => self.corrected += 1,
            Disposition::Indeterminate => self.unknown += 1,
            Disposition::Ignored => self.ignored += 1,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.ok + self.corrected + self.unknown + self.ignored
    }
}

impl AddAssign for PassCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.ok += rhs.ok;
        self.corrected += rhs.corrected;
        self.unknown += rhs.unknown;
        self.ignored += rhs.ignored;
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassReport {
    pub outcomes: Vec<HoleOutcome>,
    pub counters: PassCounters,
    pub edge_count: usize,
}

impl PassReport {
    #[inline]
    pub fn has_corrections(&self) -> bool {
        self.counters.corrected > 0
    }
}

/// 评估单个圆孔：分类 → 最近直边 → 校正判定。
pub fn evaluate_hole(
    index: usize,
    id: EntityId,
    circle: &Circle,
    edges: &[Segment2],
    config: &CorrectionConfig,
) -> HoleOutcome {
    let diameter = circle.diameter();
    let center = circle.center;

    if classify(diameter, &config.diameter()) == HoleClass::Ignored {
        return HoleOutcome {
            index,
            id,
            center,
            diameter,
            distance: None,
            disposition: Disposition::Ignored,
        };
    }

    let Some(proximity) = nearest_edge(center.xy(), edges) else {
        return HoleOutcome {
            index,
            id,
            center,
            diameter,
            distance: None,
            disposition: Disposition::Indeterminate,
        };
    };

    if !proximity.has_direction() {
        debug!(index, distance = proximity.distance, "最近直边没有可用方向，位移为零");
    }

    let disposition = match decide(&proximity, config) {
        Decision::AlreadyCorrect => Disposition::AlreadyCorrect,
        Decision::Corrected { displacement } => Disposition::Corrected {
            displacement,
            target: center.with_xy(center.xy().translate(displacement)),
        },
        Decision::Indeterminate => Disposition::Indeterminate,
    };

    HoleOutcome {
        index,
        id,
        center,
        diameter,
        distance: Some(proximity.distance),
        disposition,
    }
}

/// 对文档中的所有圆孔执行一次只读评估。
pub fn run_pass(document: &Document, config: &CorrectionConfig) -> PassReport {
    let edges = document.edges();
    let mut report = PassReport {
        edge_count: edges.len(),
        ..PassReport::default()
    };

    for (position, (id, circle)) in document.circles().enumerate() {
        let outcome = evaluate_hole(position + 1, id, circle, &edges, config);
        debug!(
            index = outcome.index,
            x = outcome.center.x(),
            y = outcome.center.y(),
            diameter = outcome.diameter,
            distance = ?outcome.distance,
            disposition = ?outcome.disposition,
            "孔评估完成"
        );
        report.counters.record(&outcome.disposition);
        report.outcomes.push(outcome);
    }

    if edges.is_empty() && report.counters.unknown > 0 {
        warn!(
            holes = report.counters.unknown,
            "文档中没有直线边，候选铆钉孔无法测距"
        );
    }

    report
}

/// 把评估结果中的移动写回文档，返回实际移动的孔数量。
pub fn apply_corrections(document: &mut Document, report: &PassReport) -> usize {
    let mut moved = 0;
    for outcome in &report.outcomes {
        if let Disposition::Corrected { target, .. } = outcome.disposition {
            if document.move_circle(outcome.id, target.xy()).is_some() {
                moved += 1;
            } else {
                warn!(id = outcome.id.get(), "待校正的孔已不在文档中");
            }
        }
    }
    moved
}
