//! 游戏件分类器
//!
//! 由夹爪的三个检测器（珊瑚前端、珊瑚后端、藻类）推导当前持有的游戏件。
//! 纯函数，不保留任何内部状态；运行时每个 tick 重新计算一次。

use reef_driver::PieceSensors;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 珊瑚纵向检测状态
///
/// `Both` 表示珊瑚在夹爪内纵向居中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoralDetectionState {
    #[default]
    None,
    Front,
    Back,
    Both,
}

impl CoralDetectionState {
    /// 真值表：前∧后 → Both，仅前 → Front，仅后 → Back，否则 None
    pub fn from_detectors(front: bool, back: bool) -> Self {
        match (front, back) {
            (true, true) => Self::Both,
            (true, false) => Self::Front,
            (false, true) => Self::Back,
            (false, false) => Self::None,
        }
    }

    /// 是否检测到珊瑚（任一端）
    #[inline]
    pub fn detected(self) -> bool {
        self != Self::None
    }
}

/// 游戏件类型
///
/// 既用于"当前持有"（分类器输出），也用于"当前目标"（操作员/宏选择），
/// 两者相互独立。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GrabType {
    Coral,
    Algae,
    #[default]
    None,
}

impl fmt::Display for GrabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GrabType::Coral => "coral",
            GrabType::Algae => "algae",
            GrabType::None => "none",
        };
        f.write_str(name)
    }
}

/// 一次分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub coral: CoralDetectionState,
    pub algae: bool,
}

impl Classification {
    /// 当前持有的游戏件类型
    ///
    /// 藻类检测器优先；否则只要珊瑚任一端被检测到即为珊瑚。
    pub fn held_type(&self) -> GrabType {
        if self.algae {
            GrabType::Algae
        } else if self.coral.detected() {
            GrabType::Coral
        } else {
            GrabType::None
        }
    }

    /// 是否持有游戏件
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.held_type() != GrabType::None
    }
}

/// 对传感器快照分类
pub fn classify(sensors: PieceSensors) -> Classification {
    Classification {
        coral: CoralDetectionState::from_detectors(sensors.front, sensors.back),
        algae: sensors.algae,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensors(front: bool, back: bool, algae: bool) -> PieceSensors {
        PieceSensors { front, back, algae }
    }

    #[test]
    fn test_coral_truth_table() {
        let cases = [
            (false, false, CoralDetectionState::None),
            (true, false, CoralDetectionState::Front),
            (false, true, CoralDetectionState::Back),
            (true, true, CoralDetectionState::Both),
        ];
        for (front, back, expected) in cases {
            assert_eq!(
                classify(sensors(front, back, false)).coral,
                expected,
                "front={front} back={back}"
            );
        }
    }

    #[test]
    fn test_held_type() {
        assert_eq!(classify(sensors(false, false, false)).held_type(), GrabType::None);
        assert_eq!(classify(sensors(true, false, false)).held_type(), GrabType::Coral);
        assert_eq!(classify(sensors(false, true, false)).held_type(), GrabType::Coral);
        assert_eq!(classify(sensors(false, false, true)).held_type(), GrabType::Algae);
        // 藻类检测器优先
        assert_eq!(classify(sensors(true, true, true)).held_type(), GrabType::Algae);
    }

    #[test]
    fn test_holding_polarity() {
        assert!(!classify(sensors(false, false, false)).is_holding());
        assert!(classify(sensors(true, false, false)).is_holding());
        assert!(classify(sensors(false, false, true)).is_holding());
    }
}
