//! Tick 运行时
//!
//! [`Robot`] 持有硬件集合、状态机、配置和调度器，由外部以固定周期调用 [`Robot::tick`]：
//!
//! 1. 用分类器刷新持有状态
//! 2. 推进所有活动动作
//! 3. 取消不再被准入的动作（例如进入爬升后的宏）
//! 4. 发布状态快照（变化时）
//!
//! 所有操作员请求先经过状态机准入，再交给调度器；被拒绝的请求不改变任何状态。

use crate::action::{Action, ActionContext, JogTarget, ManualJog, Signals};
use crate::classifier::classify;
use crate::error::RequestError;
use crate::macros::Macros;
use crate::scheduler::{ActionId, CompletionReport, Scheduler};
use crate::state::{
    ControlMode, DriveMode, RequestKind, Superstructure, SuperstructureSnapshot,
};
use reef_driver::{ChassisSpeeds, Hardware, ResourceSet};
use reef_tools::{
    AlgaeLevel, AlgaeScoreTarget, ConfigError, CoralLevel, Pose, RobotConfig,
};
use tracing::{debug, info, warn};

/// 操作员宏请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MacroRequest {
    /// 在人类玩家站吸入珊瑚
    IntakeCoral,
    IntakeAlgae(AlgaeLevel),
    ScoreCoral(CoralLevel),
    ScoreAlgae(AlgaeScoreTarget),
    /// 防倾覆过渡到任意位姿
    GoTo(Pose),
    Stow,
    HomeLift,
    ClimbPrepare,
    ClimbExecute,
    /// 手动点动（手动控制模式）
    Jog(JogTarget, f64),
}

impl MacroRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            MacroRequest::ClimbPrepare | MacroRequest::ClimbExecute => RequestKind::Climb,
            MacroRequest::Jog(..) => RequestKind::Manual,
            _ => RequestKind::Macro,
        }
    }

    /// 展开为动作树
    pub fn build(&self, macros: &Macros<'_>) -> Action {
        match *self {
            MacroRequest::IntakeCoral => macros.intake_coral_station(),
            MacroRequest::IntakeAlgae(level) => macros.intake_algae(level),
            MacroRequest::ScoreCoral(level) => macros.score_coral(level, None),
            MacroRequest::ScoreAlgae(target) => macros.score_algae(target, None),
            MacroRequest::GoTo(pose) => macros.anti_tip_transition(pose),
            MacroRequest::Stow => macros.stow(),
            MacroRequest::HomeLift => macros.home_lift(),
            MacroRequest::ClimbPrepare => macros.climb_prepare(),
            MacroRequest::ClimbExecute => macros.climb_execute(),
            MacroRequest::Jog(target, speed) => ManualJog::new(target, speed).into(),
        }
    }
}

/// 机器人运行时
pub struct Robot {
    hw: Hardware,
    state: Superstructure,
    config: RobotConfig,
    signals: Signals,
    scheduler: Scheduler,
    completions: Vec<CompletionReport>,
    tick_count: u64,
}

impl Robot {
    /// 创建运行时
    ///
    /// # 错误
    ///
    /// - `ConfigError::Invalid`: 配置未通过校验
    pub fn new(hw: Hardware, config: RobotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hw,
            state: Superstructure::new(),
            config,
            signals: Signals::default(),
            scheduler: Scheduler::new(),
            completions: Vec::new(),
            tick_count: 0,
        })
    }

    fn split(&mut self) -> (&mut Scheduler, ActionContext<'_>) {
        let Robot {
            hw,
            state,
            config,
            signals,
            scheduler,
            ..
        } = self;
        (
            scheduler,
            ActionContext {
                hw,
                state,
                config,
                signals,
            },
        )
    }

    // ==================== 查询 ====================

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn state(&self) -> &Superstructure {
        &self.state
    }

    pub fn snapshot(&self) -> SuperstructureSnapshot {
        self.state.snapshot()
    }

    pub fn signals(&self) -> Signals {
        self.signals
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_active(&self, id: ActionId) -> bool {
        self.scheduler.is_active(id)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// 取出累计的完成报告
    pub fn take_completions(&mut self) -> Vec<CompletionReport> {
        std::mem::take(&mut self.completions)
    }

    // ==================== 周期 ====================

    /// 执行一个 tick，状态变化时返回新快照
    pub fn tick(&mut self) -> Option<SuperstructureSnapshot> {
        self.tick_count += 1;
        let classification = classify(self.hw.piece_sensors());
        self.state.refresh(classification);

        let (scheduler, mut ctx) = self.split();
        scheduler.run_tick(&mut ctx);
        self.revoke_inadmissible();
        self.collect_reports();

        self.state.publish()
    }

    /// 取消当前状态下不再被准入的动作
    fn revoke_inadmissible(&mut self) {
        let (scheduler, mut ctx) = self.split();
        let state = ctx.state.clone();
        let revoked = scheduler.cancel_where(|kind| state.admit(kind).is_err(), &mut ctx);
        if revoked > 0 {
            info!("Revoked {} action(s) no longer admitted", revoked);
        }
    }

    fn collect_reports(&mut self) {
        let reports = self.scheduler.drain_reports();
        self.completions.extend(reports);
    }

    // ==================== 请求 ====================

    /// 提交一棵动作树
    ///
    /// # 错误
    ///
    /// - `RequestError::Climbing` / `RequestError::WrongControlMode`: 被状态机拒绝
    pub fn request(&mut self, kind: RequestKind, action: Action) -> Result<ActionId, RequestError> {
        if let Err(e) = self.state.admit(kind) {
            warn!("Rejected {}: {}", action.name(), e);
            return Err(e);
        }
        let (scheduler, mut ctx) = self.split();
        let id = scheduler.schedule(action, kind, &mut ctx);
        self.collect_reports();
        Ok(id)
    }

    /// 提交标准宏
    pub fn request_macro(&mut self, request: MacroRequest) -> Result<ActionId, RequestError> {
        let action = request.build(&Macros::new(&self.config));
        self.request(request.kind(), action)
    }

    /// 运行自动阶段计划
    pub fn run_autonomous(&mut self, plan: Action) -> Result<ActionId, RequestError> {
        self.request(RequestKind::Autonomous, plan)
    }

    pub fn cancel(&mut self, id: ActionId) -> bool {
        let (scheduler, mut ctx) = self.split();
        let cancelled = scheduler.cancel(id, &mut ctx);
        self.collect_reports();
        cancelled
    }

    /// 急停
    ///
    /// 任何状态下都合法：中断所有活动动作，所有执行器零输出，
    /// 状态机回到 `Ready` 并清除持有标志。
    pub fn emergency_stop(&mut self) {
        warn!("EMERGENCY STOP requested");
        let (scheduler, mut ctx) = self.split();
        scheduler.cancel_all(&mut ctx);
        self.hw.stop_all();
        self.state.emergency_stop();
        self.collect_reports();
    }

    /// 设置允许放置信号
    pub fn set_may_place(&mut self, may_place: bool) {
        if self.signals.may_place != may_place {
            info!("May place: {}", may_place);
            self.signals.may_place = may_place;
        }
    }

    // ==================== 模式 ====================

    pub fn enable_manual(&mut self) -> Result<(), RequestError> {
        self.state.enable_manual()?;
        self.revoke_inadmissible();
        self.collect_reports();
        Ok(())
    }

    pub fn disable_manual(&mut self) -> Result<(), RequestError> {
        self.state.disable_manual()?;
        self.revoke_inadmissible();
        self.collect_reports();
        Ok(())
    }

    pub fn toggle_control_mode(&mut self) -> Result<ControlMode, RequestError> {
        let mode = self.state.toggle_control_mode()?;
        self.revoke_inadmissible();
        self.collect_reports();
        Ok(mode)
    }

    /// 退出爬升（操作员显式请求）
    pub fn exit_climbing(&mut self) {
        self.state.exit_climbing();
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        self.state.set_drive_mode(mode);
    }

    pub fn cycle_drive_mode(&mut self) -> DriveMode {
        self.state.cycle_drive_mode()
    }

    /// 操作员底盘驾驶
    ///
    /// 按底盘模式缩放平移速度；`Locked` 锁死轮子。
    /// 底盘被路径跟随占用时忽略操作员输入。
    ///
    /// # 错误
    ///
    /// - `RequestError::Climbing`: 爬升期间被拒绝
    pub fn teleop_drive(&mut self, speeds: ChassisSpeeds) -> Result<(), RequestError> {
        self.state.admit(RequestKind::Drive)?;
        if let Some(holder) = self.scheduler.holder_of(ResourceSet::BASE) {
            debug!("Operator drive ignored: base held by {}", holder);
            return Ok(());
        }
        match self.state.drive_mode() {
            DriveMode::Locked => self.hw.base.lock(),
            mode => self
                .hw
                .base
                .drive(speeds.scale_translation(mode.speed_scale())),
        }
        Ok(())
    }
}
