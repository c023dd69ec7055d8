//! 动作树
//!
//! 所有多 tick 行为都是 [`Action`]：一个拥有子节点的枚举树。叶子是原子动作
//! （单一执行器的移动、夹爪控制、路径跟随），内部节点是组合原语
//! （顺序、并行、截止、条件）。
//!
//! # 生命周期
//!
//! ```text
//! start() ──▶ step() ×N ──▶ is_done() == true ──▶ stop(false)
//!    │                                              ▲
//!    └──────────── 被抢占 / 取消 ───────────────────┴─ stop(true)
//! ```
//!
//! - `start()` 和 `step()` 从不阻塞；等待就是 `is_done()` 在后续 tick 重新检查
//! - `stop()` 对每次 `start()` 恰好调用一次
//! - 超时是协作式的自我完成，结果标记为 [`Outcome::TimedOut`]
//!
//! 动作通过 [`ActionContext`] 借用硬件、状态机和配置；动作树本身不持有任何全局状态。

mod atomic;
mod compose;
mod path;

pub use atomic::{
    CenterCoral, ClimbDirection, EjectPiece, HomeLift, IntakePiece, JogTarget, ManualJog,
    MoveArm, MoveClimb, MoveLift, RunGrabber,
};
pub use compose::{Concurrent, Conditional, Sequential, StateUpdate, WaitTicks, WaitUntil};
pub use path::{FollowPath, ProgressTrigger};

use crate::state::{ClimbStatus, Superstructure};
use reef_driver::{Hardware, ResourceSet};
use reef_tools::RobotConfig;

/// 外部信号（由比赛控制前端写入）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    /// 是否允许放置游戏件
    pub may_place: bool,
}

/// 动作执行上下文
///
/// 每个 tick 由运行时构造一次，借用所有动作需要的外部资源。
pub struct ActionContext<'a> {
    pub hw: &'a mut Hardware,
    pub state: &'a mut Superstructure,
    pub config: &'a RobotConfig,
    pub signals: &'a Signals,
}

/// 动作结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    Completed,
    /// 超时完成：视为成功，但作为异常完成上报
    TimedOut,
    Interrupted,
}

impl Outcome {
    /// 合并子动作结果：中断 > 超时 > 完成
    pub fn merge(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Interrupted, _) | (_, Outcome::Interrupted) => Outcome::Interrupted,
            (Outcome::TimedOut, _) | (_, Outcome::TimedOut) => Outcome::TimedOut,
            _ => Outcome::Completed,
        }
    }
}

/// 运行时条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// 外部允许放置
    MayPlace,
    /// 持有游戏件
    PieceHeld,
    /// 爬升机构已展开
    ClimbPrepared,
}

impl Condition {
    pub fn evaluate(self, ctx: &ActionContext<'_>) -> bool {
        match self {
            Condition::MayPlace => ctx.signals.may_place,
            Condition::PieceHeld => ctx.state.game_piece_held(),
            Condition::ClimbPrepared => ctx.state.climb_status() == ClimbStatus::Ready,
        }
    }
}

/// 动作生命周期（每种具体动作实现）
pub(crate) trait Lifecycle {
    /// 日志中使用的名称
    fn name(&self) -> &str;

    /// 独占的执行器资源
    fn requirements(&self) -> ResourceSet;

    fn start(&mut self, ctx: &mut ActionContext<'_>);

    fn step(&mut self, ctx: &mut ActionContext<'_>);

    fn is_done(&self) -> bool;

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool);

    /// 结束方式（仅在 `is_done()` 或 `stop()` 之后有意义）
    fn outcome(&self) -> Outcome {
        Outcome::Completed
    }
}

/// 动作树节点
#[derive(Debug, Clone)]
pub enum Action {
    /// 空操作（立即完成，被顺序组合跳过）
    Noop,
    Update(StateUpdate),
    WaitTicks(WaitTicks),
    WaitUntil(WaitUntil),
    MoveLift(MoveLift),
    MoveArm(MoveArm),
    RunGrabber(RunGrabber),
    Eject(EjectPiece),
    Intake(IntakePiece),
    CenterCoral(CenterCoral),
    HomeLift(HomeLift),
    MoveClimb(MoveClimb),
    ManualJog(ManualJog),
    FollowPath(FollowPath),
    Sequential(Sequential),
    Concurrent(Concurrent),
    Conditional(Conditional),
}

/// 分派到具体动作；`Noop` 使用单独的分支
macro_rules! dispatch {
    ($action:expr, $inner:ident => $body:expr, noop => $noop:expr) => {
        match $action {
            Action::Noop => $noop,
            Action::Update($inner) => $body,
            Action::WaitTicks($inner) => $body,
            Action::WaitUntil($inner) => $body,
            Action::MoveLift($inner) => $body,
            Action::MoveArm($inner) => $body,
            Action::RunGrabber($inner) => $body,
            Action::Eject($inner) => $body,
            Action::Intake($inner) => $body,
            Action::CenterCoral($inner) => $body,
            Action::HomeLift($inner) => $body,
            Action::MoveClimb($inner) => $body,
            Action::ManualJog($inner) => $body,
            Action::FollowPath($inner) => $body,
            Action::Sequential($inner) => $body,
            Action::Concurrent($inner) => $body,
            Action::Conditional($inner) => $body,
        }
    };
}

impl Action {
    pub fn name(&self) -> &str {
        dispatch!(self, a => a.name(), noop => "noop")
    }

    /// 动作树独占的全部资源（所有子节点的并集）
    pub fn requirements(&self) -> ResourceSet {
        dispatch!(self, a => a.requirements(), noop => ResourceSet::empty())
    }

    pub fn start(&mut self, ctx: &mut ActionContext<'_>) {
        dispatch!(self, a => a.start(ctx), noop => ())
    }

    pub fn step(&mut self, ctx: &mut ActionContext<'_>) {
        dispatch!(self, a => a.step(ctx), noop => ())
    }

    pub fn is_done(&self) -> bool {
        dispatch!(self, a => a.is_done(), noop => true)
    }

    pub fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        dispatch!(self, a => a.stop(ctx, interrupted), noop => ())
    }

    pub fn outcome(&self) -> Outcome {
        dispatch!(self, a => a.outcome(), noop => Outcome::Completed)
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Action::Noop)
    }

    // ==================== 构造快捷方式 ====================

    /// 顺序组合
    pub fn sequence(label: impl Into<String>, children: Vec<Action>) -> Self {
        Action::Sequential(Sequential::new(label, children))
    }

    /// 并行组合（全部完成才完成）
    pub fn parallel(label: impl Into<String>, children: Vec<Action>) -> Self {
        Action::Concurrent(Concurrent::all(label, children))
    }

    /// 截止组合（`deadline` 完成即完成，中断其余子动作）
    pub fn deadline(label: impl Into<String>, deadline: Action, others: Vec<Action>) -> Self {
        Action::Concurrent(Concurrent::deadline(label, deadline, others))
    }

    /// 条件组合
    pub fn conditional(label: impl Into<String>, condition: Condition, branch: Action) -> Self {
        Action::Conditional(Conditional::new(label, condition, branch))
    }

    pub fn update(update: StateUpdate) -> Self {
        Action::Update(update)
    }
}

/// 为具体动作生成 `From<T> for Action`
macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Action {
                fn from(value: $ty) -> Self {
                    Action::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    Update(StateUpdate),
    WaitTicks(WaitTicks),
    WaitUntil(WaitUntil),
    MoveLift(MoveLift),
    MoveArm(MoveArm),
    RunGrabber(RunGrabber),
    Eject(EjectPiece),
    Intake(IntakePiece),
    CenterCoral(CenterCoral),
    HomeLift(HomeLift),
    MoveClimb(MoveClimb),
    ManualJog(ManualJog),
    FollowPath(FollowPath),
    Sequential(Sequential),
    Concurrent(Concurrent),
    Conditional(Conditional),
);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_merge() {
        assert_eq!(Outcome::Completed.merge(Outcome::Completed), Outcome::Completed);
        assert_eq!(Outcome::Completed.merge(Outcome::TimedOut), Outcome::TimedOut);
        assert_eq!(Outcome::TimedOut.merge(Outcome::Interrupted), Outcome::Interrupted);
    }

    #[test]
    fn test_noop() {
        let mut h = testing::Harness::new();
        let mut action = Action::Noop;
        assert_eq!(action.requirements(), ResourceSet::empty());
        assert_eq!(h.run(&mut action, 1), Some(0));
        assert_eq!(action.outcome(), Outcome::Completed);
    }

    #[test]
    fn test_conditions() {
        let mut h = testing::Harness::new();
        assert!(!Condition::MayPlace.evaluate(&h.ctx()));
        h.signals.may_place = true;
        assert!(Condition::MayPlace.evaluate(&h.ctx()));

        assert!(!Condition::ClimbPrepared.evaluate(&h.ctx()));
        h.state.set_climb_status(ClimbStatus::Ready);
        assert!(Condition::ClimbPrepared.evaluate(&h.ctx()));
    }
}
