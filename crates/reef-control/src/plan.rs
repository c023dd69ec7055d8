//! 编译后的自动阶段计划
//!
//! 计划按任务原始顺序保存每段（leg）的根动作，以及被丢弃的任务和原因。
//! [`Plan::to_action`] 把所有段顺序拼接成一个可交给运行时的根动作。

use reef_client::Action;
use reef_tools::{AutoTask, HumanPlayerPosition, StartPosition};
use serde::Serialize;
use std::fmt;

/// 任务被丢弃的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// 得分任务没有指定位置
    MissingPosition,
    /// 所需路径不存在
    MissingPath(String),
    /// 目标位姿没有配置预设
    UnresolvedPreset,
    /// 编译器不处理的任务形状
    Unsupported,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPosition => f.write_str("no field position given"),
            Self::MissingPath(name) => write!(f, "missing path {name}"),
            Self::UnresolvedPreset => f.write_str("no preset for the target pose"),
            Self::Unsupported => f.write_str("unsupported task"),
        }
    }
}

/// 被丢弃的任务
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedTask {
    /// 在原任务列表中的下标
    pub index: usize,
    pub task: AutoTask,
    pub reason: DropReason,
}

/// 计划中的一段
#[derive(Debug, Clone)]
pub struct PlanLeg {
    pub index: usize,
    pub task: AutoTask,
    /// 按跟随顺序排列的路径名称
    pub paths: Vec<String>,
    pub action: Action,
}

/// 自动阶段计划
#[derive(Debug, Clone)]
pub struct Plan {
    name: String,
    start: StartPosition,
    human_player: HumanPlayerPosition,
    legs: Vec<PlanLeg>,
    dropped: Vec<DroppedTask>,
}

impl Plan {
    pub(crate) fn new(
        name: impl Into<String>,
        start: StartPosition,
        human_player: HumanPlayerPosition,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            human_player,
            legs: Vec::new(),
            dropped: Vec::new(),
        }
    }

    pub(crate) fn push_leg(&mut self, leg: PlanLeg) {
        self.legs.push(leg);
    }

    pub(crate) fn push_dropped(&mut self, dropped: DroppedTask) {
        self.dropped.push(dropped);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> StartPosition {
        self.start
    }

    pub fn human_player(&self) -> HumanPlayerPosition {
        self.human_player
    }

    pub fn legs(&self) -> &[PlanLeg] {
        &self.legs
    }

    pub fn dropped(&self) -> &[DroppedTask] {
        &self.dropped
    }

    /// 没有任何可执行的段
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// 全部段按顺序跟随的路径
    pub fn path_names(&self) -> Vec<&str> {
        self.legs
            .iter()
            .flat_map(|leg| leg.paths.iter().map(String::as_str))
            .collect()
    }

    /// 拼接为单个顺序根动作（空计划为立即完成的空序列）
    pub fn to_action(&self) -> Action {
        Action::sequence(
            format!("auto:{}", self.name),
            self.legs.iter().map(|leg| leg.action.clone()).collect(),
        )
    }

    /// 可序列化的摘要（CLI 输出用）
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            name: self.name.clone(),
            start: self.start,
            human_player: self.human_player,
            legs: self
                .legs
                .iter()
                .map(|leg| LegSummary {
                    index: leg.index,
                    task: leg.task,
                    paths: leg.paths.clone(),
                })
                .collect(),
            dropped: self
                .dropped
                .iter()
                .map(|d| DroppedSummary {
                    index: d.index,
                    task: d.task,
                    reason: d.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// 计划摘要
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub name: String,
    pub start: StartPosition,
    pub human_player: HumanPlayerPosition,
    pub legs: Vec<LegSummary>,
    pub dropped: Vec<DroppedSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegSummary {
    pub index: usize,
    pub task: AutoTask,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DroppedSummary {
    pub index: usize,
    pub task: AutoTask,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reef_tools::CoralLevel;

    #[test]
    fn test_empty_plan_is_instant_sequence() {
        let plan = Plan::new("empty", StartPosition::S1, HumanPlayerPosition::Hp2);
        assert!(plan.is_empty());
        match plan.to_action() {
            Action::Sequential(seq) => assert!(seq.children().is_empty()),
            other => panic!("unexpected root {:?}", other.name()),
        }
    }

    #[test]
    fn test_summary_serializes_reasons() {
        let mut plan = Plan::new("one", StartPosition::S2, HumanPlayerPosition::Hp1);
        plan.push_dropped(DroppedTask {
            index: 0,
            task: AutoTask::ScoreCoral {
                position: None,
                level: CoralLevel::L2,
            },
            reason: DropReason::MissingPosition,
        });
        plan.push_leg(PlanLeg {
            index: 1,
            task: AutoTask::ScoreCoral {
                position: Some(reef_tools::CoralPosition::D),
                level: CoralLevel::L3,
            },
            paths: vec!["S2-HP1".to_string(), "HP1-D".to_string()],
            action: Action::Noop,
        });

        assert_eq!(plan.path_names(), vec!["S2-HP1", "HP1-D"]);
        let json = serde_json::to_value(plan.summary()).unwrap();
        assert_eq!(json["start"], "S2");
        assert_eq!(json["human_player"], "HP1");
        assert_eq!(json["dropped"][0]["reason"], "no field position given");
        assert_eq!(json["legs"][0]["task"]["type"], "ScoreCoral");
        assert_eq!(json["legs"][0]["paths"][1], "HP1-D");
    }
}
