//! # 安全约束引擎
//!
//! 根据当前升降高度限制摆臂角度，防止摆臂与底盘 / 保险杠干涉。
//!
//! - 高度 **≤ H\***：只允许窄范围 `[constrained_min, constrained_max]`
//! - 高度 **> H\***：允许完整机械范围 `[full_min, full_max]`
//!
//! ⚠️ 每次调用都重新计算，不做缓存：两次调用之间升降高度可能已经变化。

use crate::config::ConfigError;
use crate::units::{Degrees, Meters};
use serde::{Deserialize, Serialize};

/// 闭区间角度范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: Degrees,
    pub max: Degrees,
}

impl AngleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min: Degrees(min),
            max: Degrees(max),
        }
    }

    /// 将角度钳位到范围内
    #[inline]
    pub fn clamp(&self, angle: Degrees) -> Degrees {
        angle.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, angle: Degrees) -> bool {
        angle >= self.min && angle <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::Invalid {
                field: name,
                reason: format!("expected finite min <= max, got [{}, {}]", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// 摆臂角度约束
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmConstraint {
    /// 阈值高度 H*（含）
    pub threshold: Meters,
    /// 高度 ≤ H* 时的窄范围
    pub constrained: AngleRange,
    /// 高度 > H* 时的完整范围
    pub full: AngleRange,
}

impl ArmConstraint {
    /// 创建约束并校验参数
    pub fn new(
        threshold: Meters,
        constrained: AngleRange,
        full: AngleRange,
    ) -> Result<Self, ConfigError> {
        let constraint = Self {
            threshold,
            constrained,
            full,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::Invalid {
                field: "arm.clearance_height",
                reason: "threshold height must be finite".to_string(),
            });
        }
        self.constrained.validate("arm.constrained")?;
        self.full.validate("arm.full")
    }

    /// 当前高度下适用的角度范围
    #[inline]
    pub fn range_at(&self, height: Meters) -> AngleRange {
        if height <= self.threshold {
            self.constrained
        } else {
            self.full
        }
    }

    /// 约束请求角度
    ///
    /// 恰好等于 H* 时使用窄范围。函数是幂等的：
    /// `constrain(constrain(a, h), h) == constrain(a, h)`。
    #[inline]
    pub fn constrain(&self, requested: Degrees, height: Meters) -> Degrees {
        self.range_at(height).clamp(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn constraint() -> ArmConstraint {
        ArmConstraint::new(
            Meters(0.3),
            AngleRange::new(40.0, 130.0),
            AngleRange::new(-30.0, 200.0),
        )
        .unwrap()
    }

    #[test]
    fn test_narrow_range_at_threshold() {
        let c = constraint();
        assert_eq!(c.constrain(Degrees(-20.0), Meters(0.3)), Degrees(40.0));
        assert_eq!(c.constrain(Degrees(-20.0), Meters(0.30001)), Degrees(-20.0));
    }

    #[test]
    fn test_in_range_passes_through() {
        let c = constraint();
        assert_eq!(c.constrain(Degrees(90.0), Meters(0.0)), Degrees(90.0));
        assert_eq!(c.constrain(Degrees(250.0), Meters(1.0)), Degrees(200.0));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = ArmConstraint::new(
            Meters(0.3),
            AngleRange::new(130.0, 40.0),
            AngleRange::new(-30.0, 200.0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("arm.constrained"));

        assert!(
            ArmConstraint::new(
                Meters(f64::NAN),
                AngleRange::new(40.0, 130.0),
                AngleRange::new(-30.0, 200.0),
            )
            .is_err()
        );
    }

    proptest! {
        /// 高度 ≤ H* 时结果总在窄范围内
        #[test]
        fn constrained_below_threshold(angle in -720.0..720.0f64, height in -1.0..0.3f64) {
            let c = constraint();
            let out = c.constrain(Degrees(angle), Meters(height));
            prop_assert!(c.constrained.contains(out));
        }

        /// 高度 > H* 时结果总在完整范围内
        #[test]
        fn full_above_threshold(angle in -720.0..720.0f64, height in 0.3001..2.0f64) {
            let c = constraint();
            let out = c.constrain(Degrees(angle), Meters(height));
            prop_assert!(c.full.contains(out));
        }

        /// 幂等性
        #[test]
        fn constrain_is_idempotent(angle in -720.0..720.0f64, height in -1.0..2.0f64) {
            let c = constraint();
            let once = c.constrain(Degrees(angle), Meters(height));
            let twice = c.constrain(once, Meters(height));
            prop_assert_eq!(once, twice);
        }
    }
}
