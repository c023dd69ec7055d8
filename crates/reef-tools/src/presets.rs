//! 位姿预设
//!
//! 每个层级 / 得分目标对应一个（升降高度，摆臂角度）对。预设缺失是合法的：
//! 解析结果为 `None`，上层宏把它当作无操作（no-op）处理。

use crate::field::AlgaeScoreTarget;
use crate::units::{Degrees, Meters};
use serde::{Deserialize, Serialize};

/// 上层结构位姿：升降高度 + 摆臂角度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub height: Meters,
    pub angle: Degrees,
}

impl Pose {
    pub const fn new(height: f64, angle: f64) -> Self {
        Self {
            height: Meters(height),
            angle: Degrees(angle),
        }
    }
}

/// 珊瑚得分层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoralLevel {
    L1,
    L2,
    L3,
    L4,
}

/// 藻类层级（礁石上的两层 + 地面）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgaeLevel {
    Ground,
    L2,
    L3,
}

/// 珊瑚各层级得分位姿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoralPresets {
    pub l1: Option<Pose>,
    pub l2: Option<Pose>,
    pub l3: Option<Pose>,
    pub l4: Option<Pose>,
}

/// 藻类各层级拾取位姿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgaePickupPresets {
    pub ground: Option<Pose>,
    pub l2: Option<Pose>,
    pub l3: Option<Pose>,
}

/// 藻类得分位姿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgaeScorePresets {
    pub processor: Option<Pose>,
    pub net: Option<Pose>,
}

/// 预设表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetTable {
    /// 收起位姿（行驶时使用）
    pub stow: Pose,

    /// 人类玩家站拾取珊瑚位姿
    pub coral_station: Option<Pose>,

    /// 珊瑚得分位姿
    #[serde(default)]
    pub coral: CoralPresets,

    /// 藻类拾取位姿
    #[serde(default)]
    pub algae_pickup: AlgaePickupPresets,

    /// 藻类得分位姿
    #[serde(default)]
    pub algae_score: AlgaeScorePresets,
}

impl PresetTable {
    pub fn coral_score(&self, level: CoralLevel) -> Option<Pose> {
        match level {
            CoralLevel::L1 => self.coral.l1,
            CoralLevel::L2 => self.coral.l2,
            CoralLevel::L3 => self.coral.l3,
            CoralLevel::L4 => self.coral.l4,
        }
    }

    pub fn algae_pickup(&self, level: AlgaeLevel) -> Option<Pose> {
        match level {
            AlgaeLevel::Ground => self.algae_pickup.ground,
            AlgaeLevel::L2 => self.algae_pickup.l2,
            AlgaeLevel::L3 => self.algae_pickup.l3,
        }
    }

    pub fn algae_score(&self, target: AlgaeScoreTarget) -> Option<Pose> {
        match target {
            AlgaeScoreTarget::Processor => self.algae_score.processor,
            AlgaeScoreTarget::Net => self.algae_score.net,
        }
    }

    /// 遍历所有已配置的位姿（用于配置校验）
    pub fn iter_configured(&self) -> impl Iterator<Item = (&'static str, Pose)> + '_ {
        [
            ("stow", Some(self.stow)),
            ("coral_station", self.coral_station),
            ("coral.l1", self.coral.l1),
            ("coral.l2", self.coral.l2),
            ("coral.l3", self.coral.l3),
            ("coral.l4", self.coral.l4),
            ("algae_pickup.ground", self.algae_pickup.ground),
            ("algae_pickup.l2", self.algae_pickup.l2),
            ("algae_pickup.l3", self.algae_pickup.l3),
            ("algae_score.processor", self.algae_score.processor),
            ("algae_score.net", self.algae_score.net),
        ]
        .into_iter()
        .filter_map(|(name, pose)| pose.map(|p| (name, p)))
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        // ⚠️ 这些值应该根据实际机器人参数调整
        Self {
            stow: Pose::new(0.0, 90.0),
            coral_station: Some(Pose::new(0.05, 125.0)),
            coral: CoralPresets {
                l1: Some(Pose::new(0.10, 20.0)),
                l2: Some(Pose::new(0.35, 55.0)),
                l3: Some(Pose::new(0.75, 55.0)),
                l4: Some(Pose::new(1.35, 70.0)),
            },
            algae_pickup: AlgaePickupPresets {
                ground: Some(Pose::new(0.0, -10.0)),
                l2: Some(Pose::new(0.55, 15.0)),
                l3: Some(Pose::new(0.95, 15.0)),
            },
            algae_score: AlgaeScorePresets {
                processor: Some(Pose::new(0.05, 0.0)),
                net: Some(Pose::new(1.40, 100.0)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_preset_resolves_to_none() {
        let mut table = PresetTable::default();
        table.coral.l4 = None;
        assert!(table.coral_score(CoralLevel::L4).is_none());
        assert!(table.coral_score(CoralLevel::L3).is_some());
    }

    #[test]
    fn test_iter_configured_skips_missing() {
        let mut table = PresetTable::default();
        let all = table.iter_configured().count();
        table.algae_score.net = None;
        assert_eq!(table.iter_configured().count(), all - 1);
        assert!(table.iter_configured().all(|(name, _)| name != "algae_score.net"));
    }
}
