pub mod correction;
pub mod pass;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    pub enum EngineError {
        #[error("{name} 的公差 {tolerance} 无效（必须为有限的非负数）")]
        InvalidTolerance { name: &'static str, tolerance: f64 },
        #[error("{name} 的取值 {value} 无效（必须为有限数）")]
        NonFinite { name: &'static str, value: f64 },
    }
}

pub mod resolver {
    use rivetfix_core::geometry::{Point2, Proximity, Segment2};

    /// 在所有直边中寻找离 `point` 最近的一条。
    ///
    /// 使用严格的 `<` 比较，距离相同时保留先扫描到的边。
    /// 边集合为空时返回 `None`，调用方应将其视为无法判定。
    pub fn nearest_edge(point: Point2, edges: &[Segment2]) -> Option<Proximity> {
        let mut best: Option<Proximity> = None;
        for edge in edges {
            let candidate = edge.proximity(point);
            match best {
                Some(current) if candidate.distance >= current.distance => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

}
