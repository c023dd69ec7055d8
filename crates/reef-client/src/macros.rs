//! 宏序列器：标准宏
//!
//! 把原子动作组合成安全的多步行为。每个宏只是一棵 [`Action`] 树，
//! 任何一步都可以通过当前活动动作的 `stop(true)` 取消，不自动重试。
//!
//! | 宏 | 步骤 |
//! |----|------|
//! | 防倾覆过渡 | 摆臂到安全竖直角 → 升降到目标 → 摆臂到最终角 |
//! | 吸入 | 设定目标类型 → Intaking → 并行移动到拾取位姿 → 限时吸入 →（珊瑚居中）→ Holding |
//! | 得分 | Positioning → 并行移动到得分位姿 →（等待允许放置）→ Scoring → 定时吐出 → Idle |
//! | 爬升准备 | 摆臂到爬升角 → 展开爬升机构 → 摆臂到安全角 → 标记 Ready |
//! | 爬升执行 | 仅在已准备时：进入 Climbing → 摆臂到爬升角 → 收回爬升机构 → 标记 Climbed |
//! | 收起 | 防倾覆过渡到收起位姿 |
//! | 升降归零 | 摆臂到安全角 → 归零 |
//!
//! 目标位姿无法解析（预设未配置）时，宏是合法的空操作。

use crate::action::{
    Action, CenterCoral, Condition, EjectPiece, HomeLift, IntakePiece, MoveArm, MoveClimb,
    MoveLift, StateUpdate, WaitUntil,
};
use crate::classifier::GrabType;
use crate::state::{ClimbStatus, ManipulatorPhase};
use reef_tools::{AlgaeLevel, AlgaeScoreTarget, CoralLevel, Pose, RobotConfig};
use tracing::warn;

/// 标准宏构造器
#[derive(Debug, Clone, Copy)]
pub struct Macros<'a> {
    config: &'a RobotConfig,
}

impl<'a> Macros<'a> {
    pub fn new(config: &'a RobotConfig) -> Self {
        Self { config }
    }

    /// 升降与摆臂并行移动到位姿
    pub fn move_to_pose(&self, pose: Pose) -> Action {
        Action::parallel(
            "move_to_pose",
            vec![
                MoveLift::to_height(pose.height).into(),
                MoveArm::to_angle(pose.angle).into(),
            ],
        )
    }

    /// 防倾覆安全过渡
    ///
    /// 固定三步，即使最终角度等于安全角度也不省略。
    pub fn anti_tip_transition(&self, target: Pose) -> Action {
        self.transition("anti_tip", target)
    }

    fn transition(&self, label: &str, target: Pose) -> Action {
        Action::sequence(
            label,
            vec![
                MoveArm::to_angle(self.config.arm.safe_angle).into(),
                MoveLift::to_height(target.height).into(),
                MoveArm::to_angle(target.angle).into(),
            ],
        )
    }

    /// 吸入序列
    ///
    /// 吸入动作在启动时读取状态机中的**目标**类型（本序列第一步写入）。
    pub fn intake(&self, piece: GrabType, pose: Option<Pose>) -> Action {
        let label = format!("intake_{piece}");
        let Some(pose) = pose else {
            warn!("{label}: pickup pose not configured, nothing to do");
            return Action::Noop;
        };
        if piece == GrabType::None {
            warn!("{label}: no game piece type selected, nothing to do");
            return Action::Noop;
        }

        let timeout = self.config.tick.ticks(self.config.grabber.intake_timeout_s);
        let mut steps = vec![
            Action::update(StateUpdate::SetTarget(piece)),
            Action::update(StateUpdate::SetPhase(ManipulatorPhase::Intaking)),
            self.move_to_pose(pose),
            IntakePiece::targeted().with_timeout(timeout).into(),
        ];
        if piece == GrabType::Coral {
            steps.push(CenterCoral::new().with_timeout(timeout).into());
        }
        steps.push(Action::update(StateUpdate::SetPhase(ManipulatorPhase::Holding)));

        Action::sequence(label, steps)
    }

    /// 在人类玩家站吸入珊瑚
    pub fn intake_coral_station(&self) -> Action {
        self.intake(GrabType::Coral, self.config.presets.coral_station)
    }

    /// 在指定层级吸入藻类
    pub fn intake_algae(&self, level: AlgaeLevel) -> Action {
        self.intake(GrabType::Algae, self.config.presets.algae_pickup(level))
    }

    /// 得分序列
    ///
    /// `gate` 为 `Some` 时在进入 Scoring 之前等待条件成立（自动阶段使用允许放置信号）。
    pub fn score(
        &self,
        label: impl Into<String>,
        pose: Option<Pose>,
        gate: Option<Condition>,
    ) -> Action {
        let label = label.into();
        let Some(pose) = pose else {
            warn!("{label}: score pose not configured, nothing to do");
            return Action::Noop;
        };

        let eject_ticks = self.config.tick.ticks(self.config.grabber.eject_duration_s);
        let mut steps = vec![
            Action::update(StateUpdate::SetPhase(ManipulatorPhase::Positioning)),
            self.move_to_pose(pose),
        ];
        if let Some(condition) = gate {
            steps.push(WaitUntil::new(condition).into());
        }
        steps.extend([
            Action::update(StateUpdate::SetPhase(ManipulatorPhase::Scoring)),
            EjectPiece::for_ticks(eject_ticks).into(),
            Action::update(StateUpdate::SetPhase(ManipulatorPhase::Idle)),
        ]);

        Action::sequence(label, steps)
    }

    pub fn score_coral(&self, level: CoralLevel, gate: Option<Condition>) -> Action {
        self.score(
            format!("score_coral_{level:?}"),
            self.config.presets.coral_score(level),
            gate,
        )
    }

    pub fn score_algae(&self, target: AlgaeScoreTarget, gate: Option<Condition>) -> Action {
        self.score(
            format!("score_algae_{}", target.name()),
            self.config.presets.algae_score(target),
            gate,
        )
    }

    /// 爬升准备
    pub fn climb_prepare(&self) -> Action {
        let arm = &self.config.arm;
        Action::sequence(
            "climb_prepare",
            vec![
                MoveArm::to_angle(arm.climb_angle).into(),
                MoveClimb::extend().into(),
                MoveArm::to_angle(arm.safe_angle).into(),
                Action::update(StateUpdate::SetClimbStatus(ClimbStatus::Ready)),
            ],
        )
    }

    /// 爬升执行（未准备时为记录日志的空操作）
    pub fn climb_execute(&self) -> Action {
        Action::conditional(
            "climb_execute",
            Condition::ClimbPrepared,
            Action::sequence(
                "climb",
                vec![
                    Action::update(StateUpdate::EnterClimbing),
                    MoveArm::to_angle(self.config.arm.climb_angle).into(),
                    MoveClimb::retract().into(),
                    Action::update(StateUpdate::SetClimbStatus(ClimbStatus::Climbed)),
                ],
            ),
        )
    }

    /// 收起到收起位姿（夹爪不动，持有的游戏件继续保持）
    pub fn stow(&self) -> Action {
        self.transition("stow", self.config.presets.stow)
    }

    /// 升降归零
    pub fn home_lift(&self) -> Action {
        Action::sequence(
            "home_lift",
            vec![
                MoveArm::to_angle(self.config.arm.safe_angle).into(),
                HomeLift::new().into(),
            ],
        )
    }
}
