//! 自动阶段任务编译器
//!
//! 把（起点、人类玩家站、有序任务列表）编译为一个 [`Plan`]。
//! 编译器维护"上一个位置"，每个任务的路径名称都从它拼接：
//!
//! - `ScoreCoral`：`上一位置→人类玩家站` 与 `人类玩家站→分支` 两段路径。
//!   得分路径还没有触发器时挂上两个：早触发吸入宏、晚触发得分宏（等待放置许可）。
//!   产出：（跟随取料路径 DEADLINE 吸入宏）THEN（跟随得分路径及其触发器）。
//! - `ScoreAlgae`：`上一位置→藻类位置` 与 `藻类位置→得分目标` 两段路径，顺序跟随，不挂触发器。
//! - 拾取类任务不单独编译。
//!
//! 目标位姿无法从预设解析的任务是合法的无操作，同样被丢弃。
//! 缺失路径或位置只丢弃该任务，不影响其余任务，也不是错误。

use crate::path_library::PathLibrary;
use crate::plan::{DropReason, DroppedTask, Plan, PlanLeg};
use reef_client::{Action, Condition, FollowPath, Macros, ProgressTrigger};
use reef_tools::{
    AlgaeLevel, AlgaePosition, AlgaeScoreTarget, AutoTask, CoralLevel, CoralPosition,
    FieldPosition, HumanPlayerPosition, RobotConfig, StartPosition, TaskFamily, path_name,
};
use tracing::{info, warn};

/// 编译出的一段：根动作、跟随的路径、结束位置
struct Leg {
    action: Action,
    paths: Vec<String>,
    end: FieldPosition,
}

/// 任务编译器
///
/// 编译会修改路径库：首次用到的得分路径会被挂上触发器。
pub struct TaskCompiler<'a> {
    config: &'a RobotConfig,
    library: &'a mut PathLibrary,
}

impl<'a> TaskCompiler<'a> {
    pub fn new(config: &'a RobotConfig, library: &'a mut PathLibrary) -> Self {
        Self { config, library }
    }

    /// 编译有序任务列表
    pub fn compile(
        &mut self,
        name: &str,
        start: StartPosition,
        human_player: HumanPlayerPosition,
        tasks: &[AutoTask],
    ) -> Plan {
        let mut plan = Plan::new(name, start, human_player);
        let mut last = FieldPosition::from(start);

        for (index, task) in tasks.iter().enumerate() {
            let compiled = self.check(task).and_then(|()| match *task {
                AutoTask::ScoreCoral { position, level } => {
                    self.score_coral(last, human_player, position, level)
                },
                AutoTask::ScoreAlgae {
                    position,
                    level,
                    target,
                } => self.score_algae(last, position, level, target),
                AutoTask::PickupCoral { .. } | AutoTask::PickupAlgae { .. } => {
                    Err(DropReason::Unsupported)
                },
            });

            match compiled {
                Ok(leg) => {
                    info!("{}: task {} {} via {:?}", name, index, task, leg.paths);
                    last = leg.end;
                    plan.push_leg(PlanLeg {
                        index,
                        task: *task,
                        paths: leg.paths,
                        action: leg.action,
                    });
                },
                Err(reason) => {
                    warn!("{}: dropping task {} {}: {}", name, index, task, reason);
                    plan.push_dropped(DroppedTask {
                        index,
                        task: *task,
                        reason,
                    });
                },
            }
        }

        info!(
            "{}: compiled {} legs, dropped {} tasks",
            name,
            plan.legs().len(),
            plan.dropped().len()
        );
        plan
    }

    /// 只编译得分家族，且目标位姿必须能从预设解析
    fn check(&self, task: &AutoTask) -> Result<(), DropReason> {
        if task.family() != TaskFamily::Score {
            return Err(DropReason::Unsupported);
        }
        task.resolve(&self.config.presets)
            .map(|_| ())
            .ok_or(DropReason::UnresolvedPreset)
    }

    fn score_coral(
        &mut self,
        last: FieldPosition,
        station: HumanPlayerPosition,
        position: Option<CoralPosition>,
        level: CoralLevel,
    ) -> Result<Leg, DropReason> {
        let position = position.ok_or(DropReason::MissingPosition)?;
        let station_path = self.require(path_name(last, station))?;
        let score_path = self.require(path_name(station, position))?;

        let macros = Macros::new(self.config);
        if !self.library.has_triggers(&score_path) {
            let auto = &self.config.auto;
            self.library.attach_triggers(
                &score_path,
                [
                    ProgressTrigger::new(
                        "intake",
                        auto.intake_trigger_fraction,
                        macros.intake_coral_station(),
                    ),
                    ProgressTrigger::new(
                        "score",
                        auto.score_trigger_fraction,
                        macros.score_coral(level, Some(Condition::MayPlace)),
                    ),
                ],
            );
        }
        let triggers = self
            .library
            .triggers(&score_path)
            .map(<[ProgressTrigger]>::to_vec)
            .unwrap_or_default();

        let action = Action::sequence(
            format!("score_coral_{}", position.name()),
            vec![
                Action::deadline(
                    format!("pickup_{}", station.name()),
                    FollowPath::new(station_path.clone()).into(),
                    vec![macros.intake_coral_station()],
                ),
                FollowPath::new(score_path.clone())
                    .with_triggers(triggers)
                    .into(),
            ],
        );

        Ok(Leg {
            action,
            paths: vec![station_path, score_path],
            end: position.into(),
        })
    }

    // 藻类的拾取与得分不挂在路径上：只编译两段路径
    fn score_algae(
        &mut self,
        last: FieldPosition,
        position: Option<AlgaePosition>,
        _level: AlgaeLevel,
        target: AlgaeScoreTarget,
    ) -> Result<Leg, DropReason> {
        let position = position.ok_or(DropReason::MissingPosition)?;
        let pickup_path = self.require(path_name(last, position))?;
        let score_path = self.require(path_name(position, target))?;

        let action = Action::sequence(
            format!("score_algae_{}_{}", position.name(), target.name()),
            vec![
                FollowPath::new(pickup_path.clone()).into(),
                FollowPath::new(score_path.clone()).into(),
            ],
        );

        Ok(Leg {
            action,
            paths: vec![pickup_path, score_path],
            end: target.into(),
        })
    }

    fn require(&self, name: String) -> Result<String, DropReason> {
        if self.library.contains(&name) {
            Ok(name)
        } else {
            Err(DropReason::MissingPath(name))
        }
    }
}

/// 便捷函数：用给定配置和路径库编译
pub fn compile(
    config: &RobotConfig,
    library: &mut PathLibrary,
    name: &str,
    start: StartPosition,
    human_player: HumanPlayerPosition,
    tasks: &[AutoTask],
) -> Plan {
    TaskCompiler::new(config, library).compile(name, start, human_player, tasks)
}
