use rivetfix_core::geometry::{Proximity, Vector2};

use crate::errors::EngineError;

const DEFAULT_RIVET_DIAMETER: f64 = 4.2;
const DEFAULT_DIAMETER_TOLERANCE: f64 = 0.3;
const DEFAULT_TARGET_DISTANCE: f64 = 10.0;
const DEFAULT_NEAR_TOLERANCE: f64 = 4.0;
const DEFAULT_FAR_DISTANCE: f64 = 30.0;
const DEFAULT_FAR_TOLERANCE: f64 = 8.0;
const DEFAULT_CORRECTION: f64 = -20.0;

/// 以名义值为中心的对称闭区间 `[nominal - tolerance, nominal + tolerance]`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBand {
    nominal: f64,
    tolerance: f64,
}

impl ToleranceBand {
    pub fn new(name: &'static str, nominal: f64, tolerance: f64) -> Result<Self, EngineError> {
        if !nominal.is_finite() {
            return Err(EngineError::NonFinite {
                name,
                value: nominal,
            });
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(EngineError::InvalidTolerance { name, tolerance });
        }
        Ok(Self { nominal, tolerance })
    }

    #[inline]
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.nominal - self.tolerance
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.nominal + self.tolerance
    }

    /// 两端均为闭区间。
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.lower() <= value && value <= self.upper()
    }
}

/// 一次运行内不变的校正参数，显式传入分类器与校正引擎。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionConfig {
    diameter: ToleranceBand,
    near: ToleranceBand,
    far: ToleranceBand,
    correction: f64,
}

impl CorrectionConfig {
    pub fn new(
        diameter: ToleranceBand,
        near: ToleranceBand,
        far: ToleranceBand,
        correction: f64,
    ) -> Result<Self, EngineError> {
        if !correction.is_finite() {
            return Err(EngineError::NonFinite {
                name: "correction",
                value: correction,
            });
        }
        Ok(Self {
            diameter,
            near,
            far,
            correction,
        })
    }

    /// 铆钉孔直径区间。
    #[inline]
    pub fn diameter(&self) -> ToleranceBand {
        self.diameter
    }

    /// 正确边距区间（默认 6–14mm）。
    #[inline]
    pub fn near(&self) -> ToleranceBand {
        self.near
    }

    /// 按折边定位、需要校正的边距区间（默认 22–38mm）。
    #[inline]
    pub fn far(&self) -> ToleranceBand {
        self.far
    }

    /// 沿垂直方向施加的带符号位移。
    #[inline]
    pub fn correction(&self) -> f64 {
        self.correction
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            diameter: ToleranceBand {
                nominal: DEFAULT_RIVET_DIAMETER,
                tolerance: DEFAULT_DIAMETER_TOLERANCE,
            },
            near: ToleranceBand {
                nominal: DEFAULT_TARGET_DISTANCE,
                tolerance: DEFAULT_NEAR_TOLERANCE,
            },
            far: ToleranceBand {
                nominal: DEFAULT_FAR_DISTANCE,
                tolerance: DEFAULT_FAR_TOLERANCE,
            },
            correction: DEFAULT_CORRECTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleClass {
    RivetCandidate,
    Ignored,
}

pub fn classify(diameter: f64, band: &ToleranceBand) -> HoleClass {
    if band.contains(diameter) {
        HoleClass::RivetCandidate
    } else {
        HoleClass::Ignored
    }
}

/// 校正引擎的判定结果，不修改任何文档对象。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    AlreadyCorrect,
    Corrected { displacement: Vector2 },
    Indeterminate,
}

/// 根据最近直边的距离与方向作出判定。
///
/// 先检查正确区间，再检查折边区间；两者重叠时按正确处理。
/// 折边区间内位移恒为 `direction × correction`，方向为零向量时位移也为零。
pub fn decide(proximity: &Proximity, config: &CorrectionConfig) -> Decision {
    if config.near.contains(proximity.distance) {
        Decision::AlreadyCorrect
    } else if config.far.contains(proximity.distance) {
        Decision::Corrected {
            displacement: proximity.direction.scale(config.correction),
        }
    } else {
        Decision::Indeterminate
    }
}
