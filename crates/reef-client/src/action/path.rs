//! 路径跟随动作与进度触发器
//!
//! [`FollowPath`] 独占底盘，请求路径跟随服务按名称跟随路径，并在进度分数
//! 越过触发器的分数时启动附加动作。附加动作由本动作自己驱动，不阻塞跟随：
//! 路径跟随完成且所有附加动作结束后本动作才完成。
//!
//! 附加动作之间按资源互斥：后触发的动作中断仍在占用同一资源的先前动作。

use super::{Action, ActionContext, Lifecycle, Outcome};
use reef_driver::{PathHandle, ResourceSet};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

/// 进度触发器：进度越过 `fraction` 时启动一次 `action`
///
/// 附加动作装箱存放：触发器本身位于 [`Action`] 树内部。
#[derive(Debug, Clone)]
pub struct ProgressTrigger {
    name: String,
    fraction: f64,
    action: Box<Action>,
}

impl ProgressTrigger {
    /// 创建触发器（分数限制在 [0, 1]）
    pub fn new(name: impl Into<String>, fraction: f64, action: Action) -> Self {
        Self {
            name: name.into(),
            fraction: fraction.clamp(0.0, 1.0),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// 跟随命名路径
#[derive(Debug, Clone)]
pub struct FollowPath {
    path: String,
    /// 按分数升序排列
    triggers: SmallVec<[ProgressTrigger; 2]>,
    fired: SmallVec<[bool; 2]>,
    /// 已触发、仍在运行的附加动作
    running: Vec<Action>,
    handle: Option<PathHandle>,
    path_done: bool,
    outcome: Outcome,
}

impl FollowPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            triggers: SmallVec::new(),
            fired: SmallVec::new(),
            running: Vec::new(),
            handle: None,
            path_done: false,
            outcome: Outcome::Completed,
        }
    }

    /// 附加触发器列表
    pub fn with_triggers(mut self, triggers: impl IntoIterator<Item = ProgressTrigger>) -> Self {
        self.triggers.extend(triggers);
        self.triggers
            .sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
        self.fired = SmallVec::from_elem(false, self.triggers.len());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn triggers(&self) -> &[ProgressTrigger] {
        &self.triggers
    }

    /// 启动进度已越过的触发器
    fn fire_crossed(&mut self, progress: f64, ctx: &mut ActionContext<'_>) {
        for index in 0..self.triggers.len() {
            if self.fired[index] || self.triggers[index].fraction > progress {
                continue;
            }
            self.fired[index] = true;
            let trigger = &self.triggers[index];
            info!(
                "{}: trigger '{}' fired at {:.2} (mark {:.2})",
                self.path, trigger.name, progress, trigger.fraction
            );
            let action = Action::clone(&trigger.action);
            self.launch(action, ctx);
        }
    }

    fn launch(&mut self, mut action: Action, ctx: &mut ActionContext<'_>) {
        let required = action.requirements();
        let mut index = 0;
        while index < self.running.len() {
            if self.running[index].requirements().intersects(required) {
                let mut previous = self.running.remove(index);
                debug!(
                    "{}: '{}' interrupted by '{}'",
                    self.path,
                    previous.name(),
                    action.name()
                );
                previous.stop(ctx, true);
            } else {
                index += 1;
            }
        }

        action.start(ctx);
        if action.is_done() {
            action.stop(ctx, false);
            self.outcome = self.outcome.merge(action.outcome());
        } else {
            self.running.push(action);
        }
    }

    fn step_running(&mut self, ctx: &mut ActionContext<'_>) {
        let mut index = 0;
        while index < self.running.len() {
            self.running[index].step(ctx);
            if self.running[index].is_done() {
                let mut action = self.running.remove(index);
                action.stop(ctx, false);
                self.outcome = self.outcome.merge(action.outcome());
            } else {
                index += 1;
            }
        }
    }
}

impl Lifecycle for FollowPath {
    fn name(&self) -> &str {
        &self.path
    }

    fn requirements(&self) -> ResourceSet {
        self.triggers
            .iter()
            .fold(ResourceSet::BASE, |acc, trigger| {
                acc | trigger.action.requirements()
            })
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.fired = SmallVec::from_elem(false, self.triggers.len());
        self.running.clear();
        self.outcome = Outcome::Completed;
        self.path_done = false;

        match ctx.hw.paths.follow(&self.path) {
            Ok(handle) => {
                info!("Following path {}", self.path);
                self.handle = Some(handle);
                self.fire_crossed(0.0, ctx);
            },
            Err(e) => {
                warn!("Skipping path {}: {}", self.path, e);
                self.handle = None;
                self.path_done = true;
            },
        }
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.step_running(ctx);

        if self.path_done {
            return;
        }
        let Some(handle) = self.handle else {
            return;
        };
        let progress = ctx.hw.paths.progress(handle);
        self.fire_crossed(progress, ctx);

        if ctx.hw.paths.is_finished(handle) {
            // 完成时补发尚未触发的触发器
            self.fire_crossed(1.0, ctx);
            info!("Path {} finished", self.path);
            self.path_done = true;
        }
    }

    fn is_done(&self) -> bool {
        self.path_done && self.running.is_empty()
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if !interrupted {
            return;
        }
        if let (Some(handle), false) = (self.handle, self.path_done) {
            warn!("Path {} cancelled", self.path);
            ctx.hw.paths.cancel(handle);
        }
        for mut action in self.running.drain(..) {
            action.stop(ctx, true);
        }
        self.outcome = Outcome::Interrupted;
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }
}
