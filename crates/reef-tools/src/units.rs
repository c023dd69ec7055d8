//! 强类型单位系统
//!
//! 使用 NewType 模式防止升降高度与摆臂角度混用。
//!
//! ```rust
//! use reef_tools::{Degrees, Meters};
//!
//! let height = Meters(0.5) + Meters(0.25);
//! assert_eq!(height, Meters(0.75));
//!
//! // 类型安全：以下代码无法编译
//! // let _ = Meters(1.0) + Degrees(1.0);  // ❌ 类型不匹配
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

macro_rules! unit_newtype {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// 零值常量
            pub const ZERO: Self = $name(0.0);

            /// 获取原始值
            #[inline]
            pub fn value(self) -> f64 {
                self.0
            }

            /// 取绝对值
            #[inline]
            pub fn abs(self) -> Self {
                $name(self.0.abs())
            }

            /// 限制范围
            #[inline]
            pub fn clamp(self, min: Self, max: Self) -> Self {
                $name(self.0.clamp(min.0, max.0))
            }

            /// 是否与 `other` 相差不超过 `tolerance`
            #[inline]
            pub fn within(self, other: Self, tolerance: Self) -> bool {
                (self.0 - other.0).abs() <= tolerance.0
            }

            /// 是否为有限值（非 NaN / Inf）
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.3} {}", self.0, $suffix)
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                $name(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                $name(-self.0)
            }
        }
    };
}

unit_newtype!(
    /// 米（升降高度，从完全收回位置起算）
    Meters,
    "m"
);

unit_newtype!(
    /// 度（摆臂角度，90° 为竖直向上）
    Degrees,
    "deg"
);
