//! 资源调度器
//!
//! 持有所有活动的根动作及其占用的资源。单一所有者规则：
//! 新动作占用已被持有的资源时，当前持有者先被 `stop(true)`，然后新动作才 `start()`。
//! 冲突从不排队，也不拒绝。
//!
//! 每个 tick 按调度顺序推进所有根动作；完成的动作被 `stop(false)` 并记录完成报告。

use crate::action::{Action, ActionContext, Outcome};
use crate::state::RequestKind;
use reef_driver::ResourceSet;
use std::fmt;
use tracing::{debug, info, warn};

/// 调度标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 根动作完成报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub id: ActionId,
    pub name: String,
    pub kind: RequestKind,
    pub outcome: Outcome,
}

impl CompletionReport {
    /// 异常完成（超时）
    pub fn is_abnormal(&self) -> bool {
        self.outcome == Outcome::TimedOut
    }
}

#[derive(Debug)]
struct Scheduled {
    id: ActionId,
    kind: RequestKind,
    requirements: ResourceSet,
    action: Action,
}

/// 资源调度器
#[derive(Debug, Default)]
pub struct Scheduler {
    active: Vec<Scheduled>,
    next_id: u64,
    reports: Vec<CompletionReport>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 调度根动作
    ///
    /// 先中断所有与之资源冲突的活动动作，再启动新动作。
    /// 启动即完成的动作（空操作、条件不满足）不会进入活动列表。
    pub fn schedule(
        &mut self,
        mut action: Action,
        kind: RequestKind,
        ctx: &mut ActionContext<'_>,
    ) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        let requirements = action.requirements();

        let mut index = 0;
        while index < self.active.len() {
            if self.active[index].requirements.conflicts_with(requirements) {
                let mut holder = self.active.remove(index);
                info!(
                    "{} {} interrupted by {} {} (resources {:?})",
                    holder.action.name(),
                    holder.id,
                    action.name(),
                    id,
                    (holder.requirements & requirements).names()
                );
                holder.action.stop(ctx, true);
                self.record(holder, Outcome::Interrupted);
            } else {
                index += 1;
            }
        }

        info!(
            "Starting {} {} ({}, resources {:?})",
            action.name(),
            id,
            kind,
            requirements.names()
        );
        action.start(ctx);
        let scheduled = Scheduled {
            id,
            kind,
            requirements,
            action,
        };
        if scheduled.action.is_done() {
            self.finish(scheduled, ctx);
        } else {
            self.active.push(scheduled);
        }
        id
    }

    /// 推进所有活动根动作一个 tick
    pub fn run_tick(&mut self, ctx: &mut ActionContext<'_>) {
        let mut index = 0;
        while index < self.active.len() {
            self.active[index].action.step(ctx);
            if self.active[index].action.is_done() {
                let scheduled = self.active.remove(index);
                self.finish(scheduled, ctx);
            } else {
                index += 1;
            }
        }
    }

    /// 取消指定动作，返回它是否仍在运行
    pub fn cancel(&mut self, id: ActionId, ctx: &mut ActionContext<'_>) -> bool {
        let Some(index) = self.active.iter().position(|s| s.id == id) else {
            return false;
        };
        let mut scheduled = self.active.remove(index);
        info!("Cancelling {} {}", scheduled.action.name(), id);
        scheduled.action.stop(ctx, true);
        self.record(scheduled, Outcome::Interrupted);
        true
    }

    /// 取消所有满足条件的请求类别下的动作
    pub fn cancel_where(
        &mut self,
        mut predicate: impl FnMut(RequestKind) -> bool,
        ctx: &mut ActionContext<'_>,
    ) -> usize {
        let ids: Vec<ActionId> = self
            .active
            .iter()
            .filter(|s| predicate(s.kind))
            .map(|s| s.id)
            .collect();
        for id in &ids {
            self.cancel(*id, ctx);
        }
        ids.len()
    }

    /// 取消全部活动动作（逆调度顺序）
    pub fn cancel_all(&mut self, ctx: &mut ActionContext<'_>) {
        while let Some(mut scheduled) = self.active.pop() {
            debug!("Cancelling {} {}", scheduled.action.name(), scheduled.id);
            scheduled.action.stop(ctx, true);
            self.record(scheduled, Outcome::Interrupted);
        }
    }

    pub fn is_active(&self, id: ActionId) -> bool {
        self.active.iter().any(|s| s.id == id)
    }

    /// 当前持有指定资源的动作
    pub fn holder_of(&self, resource: ResourceSet) -> Option<ActionId> {
        self.active
            .iter()
            .find(|s| s.requirements.conflicts_with(resource))
            .map(|s| s.id)
    }

    /// 当前被占用的全部资源
    pub fn held_resources(&self) -> ResourceSet {
        self.active
            .iter()
            .fold(ResourceSet::empty(), |acc, s| acc | s.requirements)
    }

    /// 活动动作（标识、名称）
    pub fn active(&self) -> impl Iterator<Item = (ActionId, &str)> + '_ {
        self.active.iter().map(|s| (s.id, s.action.name()))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// 取出累计的完成报告
    pub fn drain_reports(&mut self) -> Vec<CompletionReport> {
        std::mem::take(&mut self.reports)
    }

    fn finish(&mut self, mut scheduled: Scheduled, ctx: &mut ActionContext<'_>) {
        scheduled.action.stop(ctx, false);
        let outcome = scheduled.action.outcome();
        self.record(scheduled, outcome);
    }

    fn record(&mut self, scheduled: Scheduled, outcome: Outcome) {
        let name = scheduled.action.name().to_string();
        match outcome {
            Outcome::Completed => info!("{} {} completed", name, scheduled.id),
            Outcome::TimedOut => warn!("{} {} completed abnormally: timed out", name, scheduled.id),
            Outcome::Interrupted => info!("{} {} interrupted", name, scheduled.id),
        }
        self.reports.push(CompletionReport {
            id: scheduled.id,
            name,
            kind: scheduled.kind,
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::Harness;
    use crate::action::{IntakePiece, MoveLift, RunGrabber, WaitTicks};
    use crate::classifier::GrabType;
    use reef_driver::Setpoint;
    use reef_tools::Meters;

    #[test]
    fn test_conflict_interrupts_holder_before_start() {
        let mut h = Harness::new();
        let mut scheduler = Scheduler::new();

        let first = scheduler.schedule(RunGrabber::new(0.3).into(), RequestKind::Macro, &mut h.ctx());
        let lift = scheduler.schedule(
            MoveLift::hold(Meters(0.2)).into(),
            RequestKind::Macro,
            &mut h.ctx(),
        );
        assert_eq!(scheduler.holder_of(ResourceSet::GRABBER), Some(first));

        let second = scheduler.schedule(RunGrabber::new(-0.3).into(), RequestKind::Macro, &mut h.ctx());

        assert!(!scheduler.is_active(first));
        assert!(scheduler.is_active(second));
        assert!(scheduler.is_active(lift));
        assert_eq!(h.rig.grabber.stop_count(), 1);
        assert_eq!(h.rig.grabber.setpoint(), Some(Setpoint::Speed(-0.3)));

        let reports = scheduler.drain_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, first);
        assert_eq!(reports[0].outcome, Outcome::Interrupted);
    }

    #[test]
    fn test_instant_action_is_reported_immediately() {
        let mut h = Harness::new();
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(Action::Noop, RequestKind::Macro, &mut h.ctx());
        assert!(!scheduler.is_active(id));
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.drain_reports()[0].outcome, Outcome::Completed);
    }

    #[test]
    fn test_run_tick_finishes_and_reports_timeouts() {
        let mut h = Harness::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(WaitTicks::new(2).into(), RequestKind::Autonomous, &mut h.ctx());
        scheduler.schedule(
            IntakePiece::of(GrabType::Coral).with_timeout(1).into(),
            RequestKind::Macro,
            &mut h.ctx(),
        );

        scheduler.run_tick(&mut h.ctx());
        let reports = scheduler.drain_reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_abnormal());

        scheduler.run_tick(&mut h.ctx());
        let reports = scheduler.drain_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "wait");
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_where_and_cancel_all() {
        let mut h = Harness::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(RunGrabber::new(0.3).into(), RequestKind::Manual, &mut h.ctx());
        scheduler.schedule(
            MoveLift::hold(Meters(0.2)).into(),
            RequestKind::Macro,
            &mut h.ctx(),
        );
        assert_eq!(
            scheduler.held_resources(),
            ResourceSet::GRABBER | ResourceSet::LIFT
        );

        assert_eq!(
            scheduler.cancel_where(|kind| kind == RequestKind::Manual, &mut h.ctx()),
            1
        );
        assert_eq!(scheduler.len(), 1);
        assert_eq!(h.rig.grabber.setpoint(), None);

        scheduler.cancel_all(&mut h.ctx());
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.holder_of(ResourceSet::LIFT), None);
    }
}
