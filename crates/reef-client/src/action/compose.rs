//! 组合原语
//!
//! - [`Sequential`]：子动作严格按顺序执行；立即完成的子动作（空操作、状态更新）
//!   在同一个 tick 内被跳过
//! - [`Concurrent`]：所有子动作在同一个 tick 启动。`all` 在全部完成时完成；
//!   `deadline` 在指定子动作完成时完成，并中断其余仍在运行的子动作。
//!   兄弟动作占用同一资源时，后启动的中断先前的（与调度器相同的单一所有者规则）
//! - [`Conditional`]：启动时求值一次条件，不满足则是记录日志的空操作
//!
//! 以及不占用资源的辅助动作：状态更新、等待固定 tick、等待条件。

use super::{Action, ActionContext, Condition, Lifecycle, Outcome};
use crate::classifier::GrabType;
use crate::state::{ClimbStatus, ManipulatorPhase};
use reef_driver::ResourceSet;
use tracing::{debug, warn};

// ==================== 顺序 ====================

/// 顺序组合
///
/// 子动作 N 报告完成后立即 `stop(false)`，子动作 N+1 在同一个 tick 内启动，
/// 从下一个 tick 开始接受 `step()`。被中断时只停止当前正在运行的子动作。
#[derive(Debug, Clone)]
pub struct Sequential {
    label: String,
    children: Vec<Action>,
    index: usize,
    outcome: Outcome,
}

impl Sequential {
    pub fn new(label: impl Into<String>, children: Vec<Action>) -> Self {
        Self {
            label: label.into(),
            children,
            index: 0,
            outcome: Outcome::Completed,
        }
    }

    pub fn children(&self) -> &[Action] {
        &self.children
    }

    /// 当前正在运行的子动作下标（全部完成时等于子动作数）
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// 从当前下标开始启动子动作，跳过启动即完成的子动作
    fn advance(&mut self, ctx: &mut ActionContext<'_>) {
        while let Some(child) = self.children.get_mut(self.index) {
            child.start(ctx);
            if !child.is_done() {
                return;
            }
            child.stop(ctx, false);
            self.outcome = self.outcome.merge(child.outcome());
            self.index += 1;
        }
    }
}

impl Lifecycle for Sequential {
    fn name(&self) -> &str {
        &self.label
    }

    fn requirements(&self) -> ResourceSet {
        self.children
            .iter()
            .fold(ResourceSet::empty(), |acc, child| acc | child.requirements())
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.index = 0;
        self.outcome = Outcome::Completed;
        self.advance(ctx);
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(child) = self.children.get_mut(self.index) else {
            return;
        };
        child.step(ctx);
        if child.is_done() {
            child.stop(ctx, false);
            debug!("{}: step {} ({}) done", self.label, self.index, child.name());
            self.outcome = self.outcome.merge(child.outcome());
            self.index += 1;
            self.advance(ctx);
        }
    }

    fn is_done(&self) -> bool {
        self.index >= self.children.len()
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if !interrupted {
            return;
        }
        if let Some(child) = self.children.get_mut(self.index) {
            child.stop(ctx, true);
        }
        self.outcome = Outcome::Interrupted;
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }
}

// ==================== 并行 / 截止 ====================

/// 并行组合
#[derive(Debug, Clone)]
pub struct Concurrent {
    label: String,
    children: Vec<Action>,
    finished: Vec<bool>,
    /// 截止子动作的下标
    deadline: Option<usize>,
    outcome: Outcome,
    done: bool,
}

impl Concurrent {
    /// 全部子动作完成时完成
    pub fn all(label: impl Into<String>, children: Vec<Action>) -> Self {
        Self {
            label: label.into(),
            finished: vec![false; children.len()],
            children,
            deadline: None,
            outcome: Outcome::Completed,
            done: false,
        }
    }

    /// `deadline` 完成时完成，其余子动作被中断
    pub fn deadline(label: impl Into<String>, deadline: Action, others: Vec<Action>) -> Self {
        let mut children = Vec::with_capacity(others.len() + 1);
        children.push(deadline);
        children.extend(others);
        Self {
            deadline: Some(0),
            ..Self::all(label, children)
        }
    }

    pub fn children(&self) -> &[Action] {
        &self.children
    }

    pub fn deadline_child(&self) -> Option<&Action> {
        self.deadline.and_then(|index| self.children.get(index))
    }

    fn finish_child(&mut self, index: usize, ctx: &mut ActionContext<'_>) {
        let child = &mut self.children[index];
        child.stop(ctx, false);
        self.outcome = self.outcome.merge(child.outcome());
        self.finished[index] = true;
    }

    /// 中断所有仍在运行的子动作
    fn interrupt_remaining(&mut self, ctx: &mut ActionContext<'_>) {
        for (child, finished) in self.children.iter_mut().zip(self.finished.iter_mut()) {
            if !*finished {
                child.stop(ctx, true);
                *finished = true;
            }
        }
    }

    /// 启动第 `index` 个子动作之前，中断仍在占用其资源的先前兄弟动作
    ///
    /// 被抢占的子动作视为已结束，不参与结果合并。
    fn preempt_conflicting(&mut self, index: usize, ctx: &mut ActionContext<'_>) {
        let required = self.children[index].requirements();
        for earlier in 0..index {
            let shared = self.children[earlier].requirements() & required;
            if self.finished[earlier] || shared.is_empty() {
                continue;
            }
            warn!(
                "{}: '{}' preempted by sibling '{}' (resources {:?})",
                self.label,
                self.children[earlier].name(),
                self.children[index].name(),
                shared.names()
            );
            self.children[earlier].stop(ctx, true);
            self.finished[earlier] = true;
            if self.deadline == Some(earlier) {
                self.outcome = Outcome::Interrupted;
            }
        }
    }

    fn update_done(&mut self, ctx: &mut ActionContext<'_>) {
        match self.deadline {
            Some(index) if self.finished[index] => {
                self.interrupt_remaining(ctx);
                self.done = true;
            },
            Some(_) => {},
            None => self.done = self.finished.iter().all(|f| *f),
        }
    }
}

impl Lifecycle for Concurrent {
    fn name(&self) -> &str {
        &self.label
    }

    fn requirements(&self) -> ResourceSet {
        self.children
            .iter()
            .fold(ResourceSet::empty(), |acc, child| acc | child.requirements())
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.finished = vec![false; self.children.len()];
        self.outcome = Outcome::Completed;
        self.done = false;
        for index in 0..self.children.len() {
            self.preempt_conflicting(index, ctx);
            self.children[index].start(ctx);
            if self.children[index].is_done() {
                self.finish_child(index, ctx);
            }
        }
        self.update_done(ctx);
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        for index in 0..self.children.len() {
            if self.finished[index] {
                continue;
            }
            self.children[index].step(ctx);
            if self.children[index].is_done() {
                self.finish_child(index, ctx);
            }
        }
        self.update_done(ctx);
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if interrupted {
            self.interrupt_remaining(ctx);
            self.outcome = Outcome::Interrupted;
        }
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }
}

// ==================== 条件 ====================

/// 条件组合：启动时求值一次
#[derive(Debug, Clone)]
pub struct Conditional {
    label: String,
    condition: Condition,
    branch: Box<Action>,
    taken: Option<bool>,
    interrupted: bool,
}

impl Conditional {
    pub fn new(label: impl Into<String>, condition: Condition, branch: Action) -> Self {
        Self {
            label: label.into(),
            condition,
            branch: Box::new(branch),
            taken: None,
            interrupted: false,
        }
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn branch(&self) -> &Action {
        &self.branch
    }
}

impl Lifecycle for Conditional {
    fn name(&self) -> &str {
        &self.label
    }

    fn requirements(&self) -> ResourceSet {
        self.branch.requirements()
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.interrupted = false;
        let taken = self.condition.evaluate(ctx);
        self.taken = Some(taken);
        if taken {
            self.branch.start(ctx);
        } else {
            warn!("{} skipped: {:?} not satisfied", self.label, self.condition);
        }
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        if self.taken == Some(true) && !self.branch.is_done() {
            self.branch.step(ctx);
        }
    }

    fn is_done(&self) -> bool {
        match self.taken {
            Some(true) => self.branch.is_done(),
            Some(false) | None => true,
        }
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if self.taken == Some(true) {
            self.branch.stop(ctx, interrupted);
        }
        self.interrupted = interrupted;
    }

    fn outcome(&self) -> Outcome {
        if self.interrupted {
            Outcome::Interrupted
        } else if self.taken == Some(true) {
            self.branch.outcome()
        } else {
            Outcome::Completed
        }
    }
}

// ==================== 辅助动作 ====================

/// 即时状态更新（启动即完成，不占用资源）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    SetTarget(GrabType),
    SetPhase(ManipulatorPhase),
    SetClimbStatus(ClimbStatus),
    EnterClimbing,
    ExitClimbing,
}

impl Lifecycle for StateUpdate {
    fn name(&self) -> &str {
        "state_update"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::empty()
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        match *self {
            StateUpdate::SetTarget(target) => ctx.state.set_target_grab_type(target),
            StateUpdate::SetPhase(phase) => ctx.state.set_phase(phase),
            StateUpdate::SetClimbStatus(status) => ctx.state.set_climb_status(status),
            StateUpdate::EnterClimbing => ctx.state.enter_climbing(),
            StateUpdate::ExitClimbing => ctx.state.exit_climbing(),
        }
    }

    fn step(&mut self, _ctx: &mut ActionContext<'_>) {}

    fn is_done(&self) -> bool {
        true
    }

    fn stop(&mut self, _ctx: &mut ActionContext<'_>, _interrupted: bool) {}
}

/// 等待固定 tick 数
#[derive(Debug, Clone)]
pub struct WaitTicks {
    total: u32,
    elapsed: u32,
}

impl WaitTicks {
    pub fn new(total: u32) -> Self {
        Self { total, elapsed: 0 }
    }
}

impl Lifecycle for WaitTicks {
    fn name(&self) -> &str {
        "wait"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::empty()
    }

    fn start(&mut self, _ctx: &mut ActionContext<'_>) {
        self.elapsed = 0;
    }

    fn step(&mut self, _ctx: &mut ActionContext<'_>) {
        self.elapsed += 1;
    }

    fn is_done(&self) -> bool {
        self.elapsed >= self.total
    }

    fn stop(&mut self, _ctx: &mut ActionContext<'_>, _interrupted: bool) {}
}

/// 等待条件成立（每 tick 重新求值）
#[derive(Debug, Clone)]
pub struct WaitUntil {
    condition: Condition,
    satisfied: bool,
}

impl WaitUntil {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            satisfied: false,
        }
    }
}

impl Lifecycle for WaitUntil {
    fn name(&self) -> &str {
        "wait_until"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::empty()
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.satisfied = self.condition.evaluate(ctx);
        if !self.satisfied {
            debug!("Waiting for {:?}", self.condition);
        }
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.satisfied = self.condition.evaluate(ctx);
    }

    fn is_done(&self) -> bool {
        self.satisfied
    }

    fn stop(&mut self, _ctx: &mut ActionContext<'_>, _interrupted: bool) {}
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::super::{IntakePiece, MoveLift, RunGrabber};
    use super::*;
    use reef_driver::Setpoint;
    use reef_tools::Meters;

    #[test]
    fn test_sequential_skips_instant_children() {
        let mut h = Harness::new();
        let mut action = Action::sequence(
            "seq",
            vec![
                Action::update(StateUpdate::SetPhase(ManipulatorPhase::Intaking)),
                Action::Noop,
                WaitTicks::new(2).into(),
                Action::update(StateUpdate::SetPhase(ManipulatorPhase::Holding)),
            ],
        );

        h.start(&mut action);
        assert_eq!(h.state.phase(), ManipulatorPhase::Intaking);
        assert!(!h.tick(&mut action));
        assert_eq!(h.state.phase(), ManipulatorPhase::Intaking);
        assert!(h.tick(&mut action));
        assert_eq!(h.state.phase(), ManipulatorPhase::Holding);
    }

    #[test]
    fn test_sequential_of_instant_children_finishes_at_start() {
        let mut h = Harness::new();
        let mut action = Action::sequence(
            "instant",
            vec![Action::Noop, Action::update(StateUpdate::SetTarget(GrabType::Coral))],
        );
        assert_eq!(h.run(&mut action, 1), Some(0));
        assert_eq!(h.state.target_grab_type(), GrabType::Coral);
    }

    #[test]
    fn test_sequential_interrupt_stops_active_child_only() {
        let mut h = Harness::new();
        let mut action = Action::sequence(
            "seq",
            vec![
                RunGrabber::new(0.4).into(),
                MoveLift::to_height(Meters(1.0)).into(),
            ],
        );
        h.start(&mut action);
        h.tick(&mut action);
        h.interrupt(&mut action);

        assert_eq!(h.rig.grabber.setpoint(), None);
        assert!(h.rig.lift.history().is_empty());
        assert_eq!(action.outcome(), Outcome::Interrupted);
    }

    #[test]
    fn test_sequential_propagates_timeout() {
        let mut h = Harness::new();
        let mut action = Action::sequence(
            "seq",
            vec![IntakePiece::of(GrabType::Coral).with_timeout(2).into()],
        );
        assert_eq!(h.run(&mut action, 10), Some(2));
        assert_eq!(action.outcome(), Outcome::TimedOut);
    }

    #[test]
    fn test_concurrent_waits_for_all() {
        let mut h = Harness::new();
        let mut action = Action::parallel(
            "par",
            vec![WaitTicks::new(1).into(), WaitTicks::new(4).into()],
        );
        assert_eq!(h.run(&mut action, 10), Some(4));
    }

    #[test]
    fn test_deadline_interrupts_siblings() {
        let mut h = Harness::new();
        let mut action = Action::deadline(
            "deadline",
            WaitTicks::new(3).into(),
            vec![RunGrabber::new(0.5).into()],
        );
        h.start(&mut action);
        assert_eq!(h.rig.grabber.setpoint(), Some(Setpoint::Speed(0.5)));

        assert_eq!(h.run(&mut action, 10), Some(3));
        assert_eq!(h.rig.grabber.setpoint(), None);
        assert_eq!(action.outcome(), Outcome::Completed);
    }

    #[test]
    fn test_concurrent_later_child_preempts_shared_resource() {
        let mut h = Harness::new();
        let mut action = Action::parallel(
            "par",
            vec![RunGrabber::new(0.3).into(), RunGrabber::new(-0.3).into()],
        );
        h.start(&mut action);

        assert_eq!(h.rig.grabber.stop_count(), 1);
        assert_eq!(h.rig.grabber.setpoint(), Some(Setpoint::Speed(-0.3)));
        assert!(!h.tick(&mut action));
        assert_eq!(h.rig.grabber.setpoint(), Some(Setpoint::Speed(-0.3)));

        h.interrupt(&mut action);
        assert_eq!(h.rig.grabber.stop_count(), 2);
        assert_eq!(action.outcome(), Outcome::Interrupted);
    }

    #[test]
    fn test_deadline_sibling_conflict_keeps_single_owner() {
        let mut h = Harness::new();
        let mut action = Action::deadline(
            "deadline",
            WaitTicks::new(3).into(),
            vec![
                RunGrabber::new(0.5).into(),
                IntakePiece::of(GrabType::Coral).into(),
            ],
        );

        assert_eq!(h.run(&mut action, 10), Some(3));
        // 一次抢占 + 截止时中断吸入
        assert_eq!(h.rig.grabber.stop_count(), 2);
        assert_eq!(
            h.rig.grabber.history(),
            vec![
                Setpoint::Speed(0.5),
                Setpoint::Speed(h.config.grabber.coral.intake)
            ]
        );
        assert_eq!(h.rig.grabber.setpoint(), None);
        assert_eq!(action.outcome(), Outcome::Completed);
    }

    #[test]
    fn test_deadline_child_preempted_by_sibling_ends_group() {
        let mut h = Harness::new();
        let mut action = Action::deadline(
            "deadline",
            RunGrabber::new(0.5).into(),
            vec![RunGrabber::new(-0.5).into(), WaitTicks::new(5).into()],
        );
        h.start(&mut action);

        assert!(action.is_done());
        assert_eq!(action.outcome(), Outcome::Interrupted);
    }

    #[test]
    fn test_concurrent_requirements_union() {
        let action = Action::parallel(
            "par",
            vec![
                MoveLift::to_height(Meters(0.5)).into(),
                RunGrabber::new(0.1).into(),
            ],
        );
        assert_eq!(
            action.requirements(),
            ResourceSet::LIFT | ResourceSet::GRABBER
        );
    }

    #[test]
    fn test_conditional_false_is_noop() {
        let mut h = Harness::new();
        let mut action = Action::conditional(
            "climb",
            Condition::ClimbPrepared,
            RunGrabber::new(0.5).into(),
        );
        assert_eq!(h.run(&mut action, 5), Some(0));
        assert!(h.rig.grabber.history().is_empty());
        // 资源在调度时按分支声明
        assert_eq!(action.requirements(), ResourceSet::GRABBER);
    }

    #[test]
    fn test_conditional_true_runs_branch() {
        let mut h = Harness::new();
        h.signals.may_place = true;
        let mut action =
            Action::conditional("gated", Condition::MayPlace, WaitTicks::new(2).into());
        assert_eq!(h.run(&mut action, 5), Some(2));
    }

    #[test]
    fn test_wait_until_rechecks_each_tick() {
        let mut h = Harness::new();
        let mut action = Action::from(WaitUntil::new(Condition::MayPlace));
        h.start(&mut action);
        assert!(!h.tick(&mut action));
        h.signals.may_place = true;
        assert!(h.tick(&mut action));
    }

    #[test]
    fn test_climb_state_updates() {
        let mut h = Harness::new();
        let mut action = Action::sequence(
            "climb",
            vec![
                Action::update(StateUpdate::EnterClimbing),
                Action::update(StateUpdate::SetClimbStatus(ClimbStatus::Climbed)),
            ],
        );
        h.run(&mut action, 1);
        assert!(h.state.is_climbing());
        assert_eq!(h.state.climb_status(), ClimbStatus::Climbed);

        let mut exit = Action::update(StateUpdate::ExitClimbing);
        h.run(&mut exit, 1);
        assert!(!h.state.is_climbing());
    }
}
