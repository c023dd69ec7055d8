//! 自动阶段任务
//!
//! 四种具体任务形状的标签联合（tagged union），按家族分为拾取和得分两类。
//! 编译器对其做穷尽匹配，不需要继承层次。
//!
//! JSON 表示（例程文件中使用）：
//!
//! ```json
//! { "type": "ScoreCoral", "position": "A", "level": "L4" }
//! { "type": "ScoreAlgae", "position": "GH", "level": "L2", "target": "Net" }
//! ```

use crate::field::{AlgaePosition, AlgaeScoreTarget, CoralPosition, HumanPlayerPosition};
use crate::presets::{AlgaeLevel, CoralLevel, Pose, PresetTable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 任务家族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFamily {
    Pickup,
    Score,
}

/// 自动阶段任务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AutoTask {
    /// 在人类玩家站拾取珊瑚
    PickupCoral { station: HumanPlayerPosition },

    /// 在礁石某面拾取藻类
    PickupAlgae {
        position: AlgaePosition,
        level: AlgaeLevel,
    },

    /// 在某分支某层级放置珊瑚
    ScoreCoral {
        #[serde(default)]
        position: Option<CoralPosition>,
        level: CoralLevel,
    },

    /// 拾取藻类后送到得分目标
    ScoreAlgae {
        #[serde(default)]
        position: Option<AlgaePosition>,
        level: AlgaeLevel,
        target: AlgaeScoreTarget,
    },
}

impl AutoTask {
    pub fn family(&self) -> TaskFamily {
        match self {
            Self::PickupCoral { .. } | Self::PickupAlgae { .. } => TaskFamily::Pickup,
            Self::ScoreCoral { .. } | Self::ScoreAlgae { .. } => TaskFamily::Score,
        }
    }

    /// 解析为（升降高度，摆臂角度）
    ///
    /// 返回 `None` 表示预设缺失，任务是合法的无操作。
    pub fn resolve(&self, presets: &PresetTable) -> Option<Pose> {
        match *self {
            Self::PickupCoral { .. } => presets.coral_station,
            Self::PickupAlgae { level, .. } => presets.algae_pickup(level),
            Self::ScoreCoral { level, .. } => presets.coral_score(level),
            Self::ScoreAlgae { target, .. } => presets.algae_score(target),
        }
    }
}

impl fmt::Display for AutoTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PickupCoral { station } => write!(f, "PickupCoral({})", station.name()),
            Self::PickupAlgae { position, level } => {
                write!(f, "PickupAlgae({}, {:?})", position.name(), level)
            },
            Self::ScoreCoral { position, level } => match position {
                Some(p) => write!(f, "ScoreCoral({}, {:?})", p.name(), level),
                None => write!(f, "ScoreCoral(?, {:?})", level),
            },
            Self::ScoreAlgae {
                position,
                level,
                target,
            } => match position {
                Some(p) => write!(f, "ScoreAlgae({}, {:?}, {})", p.name(), level, target.name()),
                None => write!(f, "ScoreAlgae(?, {:?}, {})", level, target.name()),
            },
        }
    }
}
