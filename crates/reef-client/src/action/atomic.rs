//! 原子动作
//!
//! 每个原子动作独占一个执行器资源。被中断时保证硬件处于安全状态：
//! 升降和摆臂保持当前位置，滚轮和爬升机构零输出。

use super::{ActionContext, Lifecycle, Outcome};
use crate::classifier::{GrabType, classify};
use reef_driver::{ResourceSet, Setpoint};
use reef_tools::{Degrees, Meters, PieceSpeeds, RobotConfig};
use tracing::{debug, info, warn};

/// 升降速度低于此值视为已停稳（m/s）
const LIFT_SETTLED_VELOCITY: f64 = 0.01;

/// 手动点动摆臂时，满占空比每 tick 前进的角度（度）
const ARM_JOG_DEG_PER_TICK: f64 = 3.0;

/// 某类游戏件的滚轮速度
fn piece_speeds(config: &RobotConfig, piece: GrabType) -> Option<&PieceSpeeds> {
    match piece {
        GrabType::Coral => Some(&config.grabber.coral),
        GrabType::Algae => Some(&config.grabber.algae),
        GrabType::None => None,
    }
}

/// 当前是否检测到指定类型的游戏件
fn piece_detected(ctx: &ActionContext<'_>, piece: GrabType) -> bool {
    let classification = classify(ctx.hw.piece_sensors());
    match piece {
        GrabType::Coral => classification.coral.detected(),
        GrabType::Algae => classification.algae,
        GrabType::None => false,
    }
}

fn hold_lift(ctx: &mut ActionContext<'_>) {
    let position = ctx.hw.lift.position();
    ctx.hw.lift.set_target(Setpoint::Position(position));
}

fn hold_arm(ctx: &mut ActionContext<'_>) {
    let position = ctx.hw.arm.position();
    ctx.hw.arm.set_target(Setpoint::Position(position));
}

// ==================== 升降 ====================

/// 升降到指定高度
///
/// - `to_height`：到达设定值（容差内）后完成
/// - `hold`：持续保持，直到被中断（用作截止组合的陪跑子动作）
///
/// 目标先被限制在升降行程内。
#[derive(Debug, Clone)]
pub struct MoveLift {
    target: Meters,
    finish_at_setpoint: bool,
    issued: Meters,
    done: bool,
}

impl MoveLift {
    pub fn to_height(target: Meters) -> Self {
        Self {
            target,
            finish_at_setpoint: true,
            issued: target,
            done: false,
        }
    }

    pub fn hold(target: Meters) -> Self {
        Self {
            finish_at_setpoint: false,
            ..Self::to_height(target)
        }
    }

    pub fn target(&self) -> Meters {
        self.target
    }
}

impl Lifecycle for MoveLift {
    fn name(&self) -> &str {
        "move_lift"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::LIFT
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        let lift = &ctx.config.lift;
        self.issued = self.target.clamp(lift.min_height, lift.max_height);
        if self.issued != self.target {
            warn!(
                "Lift target {} outside travel, clamped to {}",
                self.target, self.issued
            );
        }
        self.done = false;
        debug!("Lift -> {}", self.issued);
        ctx.hw.lift.set_target(Setpoint::Position(self.issued.value()));
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        if self.finish_at_setpoint {
            let position = Meters(ctx.hw.lift.position());
            self.done = position.within(self.issued, ctx.config.lift.tolerance);
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if interrupted {
            hold_lift(ctx);
        }
    }
}

// ==================== 摆臂 ====================

/// 摆臂到指定角度
///
/// 每个 tick 都用当前升降高度重新经过安全约束引擎，
/// 升降在运动中时被限制的目标会随高度变化而放开。
///
/// 到达判定：到达约束后的角度，并且约束没有生效或升降已停稳。
#[derive(Debug, Clone)]
pub struct MoveArm {
    requested: Degrees,
    finish_at_setpoint: bool,
    issued: Option<Degrees>,
    done: bool,
}

impl MoveArm {
    pub fn to_angle(requested: Degrees) -> Self {
        Self {
            requested,
            finish_at_setpoint: true,
            issued: None,
            done: false,
        }
    }

    pub fn hold(requested: Degrees) -> Self {
        Self {
            finish_at_setpoint: false,
            ..Self::to_angle(requested)
        }
    }

    pub fn requested(&self) -> Degrees {
        self.requested
    }

    fn issue(&mut self, ctx: &mut ActionContext<'_>) -> Degrees {
        let height = Meters(ctx.hw.lift.position());
        let allowed = ctx.config.arm.constraint().constrain(self.requested, height);
        if self.issued != Some(allowed) {
            if allowed != self.requested {
                debug!(
                    "Arm target {} constrained to {} at lift height {}",
                    self.requested, allowed, height
                );
            }
            ctx.hw.arm.set_target(Setpoint::Position(allowed.value()));
            self.issued = Some(allowed);
        }
        allowed
    }
}

impl Lifecycle for MoveArm {
    fn name(&self) -> &str {
        "move_arm"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::ARM
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.issued = None;
        self.done = false;
        self.issue(ctx);
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        let allowed = self.issue(ctx);
        if self.finish_at_setpoint {
            let at_target =
                Degrees(ctx.hw.arm.position()).within(allowed, ctx.config.arm.tolerance);
            let settled = allowed == self.requested
                || ctx.hw.lift.velocity().abs() < LIFT_SETTLED_VELOCITY;
            self.done = at_target && settled;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if interrupted {
            hold_arm(ctx);
        }
    }
}

// ==================== 夹爪 ====================

/// 以固定占空比运行夹爪滚轮，直到被中断
#[derive(Debug, Clone)]
pub struct RunGrabber {
    speed: f64,
}

impl RunGrabber {
    pub fn new(speed: f64) -> Self {
        Self {
            speed: speed.clamp(-1.0, 1.0),
        }
    }
}

impl Lifecycle for RunGrabber {
    fn name(&self) -> &str {
        "run_grabber"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::GRABBER
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.hw.grabber.set_target(Setpoint::Speed(self.speed));
    }

    fn step(&mut self, _ctx: &mut ActionContext<'_>) {}

    fn is_done(&self) -> bool {
        false
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, _interrupted: bool) {
        ctx.hw.grabber.stop();
    }
}

/// 固定时长吐出游戏件
///
/// 吐出速度按**当前持有**的类型选择；分类器没有检测到游戏件时
/// 回退到**当前目标**类型；两者都没有时是记录日志的空操作。
#[derive(Debug, Clone)]
pub struct EjectPiece {
    duration_ticks: u32,
    elapsed: u32,
    done: bool,
}

impl EjectPiece {
    pub fn for_ticks(duration_ticks: u32) -> Self {
        Self {
            duration_ticks: duration_ticks.max(1),
            elapsed: 0,
            done: false,
        }
    }
}

impl Lifecycle for EjectPiece {
    fn name(&self) -> &str {
        "eject"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::GRABBER
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed = 0;
        self.done = false;

        let held = ctx.state.held_piece();
        let piece = if held != GrabType::None {
            held
        } else {
            ctx.state.target_grab_type()
        };
        match piece_speeds(ctx.config, piece) {
            Some(speeds) => {
                debug!("Ejecting {} at {:.2}", piece, speeds.eject);
                ctx.hw.grabber.set_target(Setpoint::Speed(speeds.eject));
            },
            None => {
                warn!("Eject skipped: no held or targeted game piece");
                self.done = true;
            },
        }
    }

    fn step(&mut self, _ctx: &mut ActionContext<'_>) {
        self.elapsed += 1;
        self.done = self.elapsed >= self.duration_ticks;
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, _interrupted: bool) {
        ctx.hw.grabber.stop();
    }
}

/// 吸入游戏件
///
/// 吸入速度按**当前目标**类型选择（构造时可显式指定类型）。
/// 可选：检测到游戏件即完成；超时（视为尽力而为的成功，标记 `TimedOut`）。
/// 正常结束且检测到游戏件时切换到保持速度。
#[derive(Debug, Clone)]
pub struct IntakePiece {
    piece: Option<GrabType>,
    finish_on_detection: bool,
    timeout_ticks: Option<u32>,
    active: GrabType,
    elapsed: u32,
    done: bool,
    timed_out: bool,
}

impl IntakePiece {
    /// 吸入当前目标类型的游戏件（在 `start()` 时读取目标）
    pub fn targeted() -> Self {
        Self {
            piece: None,
            finish_on_detection: true,
            timeout_ticks: None,
            active: GrabType::None,
            elapsed: 0,
            done: false,
            timed_out: false,
        }
    }

    /// 吸入指定类型的游戏件
    pub fn of(piece: GrabType) -> Self {
        Self {
            piece: Some(piece),
            ..Self::targeted()
        }
    }

    pub fn finish_on_detection(mut self, enabled: bool) -> Self {
        self.finish_on_detection = enabled;
        self
    }

    pub fn with_timeout(mut self, ticks: u32) -> Self {
        self.timeout_ticks = Some(ticks.max(1));
        self
    }
}

impl Lifecycle for IntakePiece {
    fn name(&self) -> &str {
        "intake"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::GRABBER
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed = 0;
        self.done = false;
        self.timed_out = false;
        self.active = self.piece.unwrap_or(ctx.state.target_grab_type());

        match piece_speeds(ctx.config, self.active) {
            Some(speeds) => {
                debug!("Intaking {} at {:.2}", self.active, speeds.intake);
                ctx.hw.grabber.set_target(Setpoint::Speed(speeds.intake));
            },
            None => {
                warn!("Intake skipped: no target game piece selected");
                self.done = true;
            },
        }
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed += 1;
        if self.finish_on_detection && piece_detected(ctx, self.active) {
            debug!("Intake detected {} after {} ticks", self.active, self.elapsed);
            self.done = true;
        } else if self.timeout_ticks.is_some_and(|limit| self.elapsed >= limit) {
            warn!("Intake of {} timed out after {} ticks", self.active, self.elapsed);
            self.done = true;
            self.timed_out = true;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        let hold = piece_speeds(ctx.config, self.active).map(|s| s.hold);
        match hold {
            Some(hold) if !interrupted && piece_detected(ctx, self.active) => {
                ctx.hw.grabber.set_target(Setpoint::Speed(hold));
            },
            _ => ctx.hw.grabber.stop(),
        }
    }

    fn outcome(&self) -> Outcome {
        if self.timed_out {
            Outcome::TimedOut
        } else {
            Outcome::Completed
        }
    }
}

/// 珊瑚智能居中
///
/// | 检测状态 | 滚轮 |
/// |----------|------|
/// | None | 快速吸入 |
/// | Front | 慢速吸入 |
/// | Both | 保持（记录"见过居中"） |
/// | Back | 慢速反转 |
///
/// 见过 `Both` 之后，在之后某个 tick 再次观察到 `Both` 才完成（过滤瞬态）。
/// 正常结束以保持速度夹住珊瑚；被中断时停止滚轮。
#[derive(Debug, Clone)]
pub struct CenterCoral {
    timeout_ticks: Option<u32>,
    elapsed: u32,
    centered_seen: bool,
    done: bool,
    timed_out: bool,
}

impl CenterCoral {
    pub fn new() -> Self {
        Self {
            timeout_ticks: None,
            elapsed: 0,
            centered_seen: false,
            done: false,
            timed_out: false,
        }
    }

    pub fn with_timeout(mut self, ticks: u32) -> Self {
        self.timeout_ticks = Some(ticks.max(1));
        self
    }

    fn observe(&mut self, ctx: &mut ActionContext<'_>) {
        use crate::classifier::CoralDetectionState as Detection;

        let speeds = &ctx.config.grabber.centering;
        let detection = classify(ctx.hw.piece_sensors()).coral;
        let speed = match detection {
            Detection::None => speeds.fast_intake,
            Detection::Front => speeds.slow_intake,
            Detection::Back => speeds.slow_reverse,
            Detection::Both => {
                if self.centered_seen {
                    debug!("Coral centering confirmed");
                    self.done = true;
                }
                self.centered_seen = true;
                speeds.hold
            },
        };
        ctx.hw.grabber.set_target(Setpoint::Speed(speed));
    }
}

impl Default for CenterCoral {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for CenterCoral {
    fn name(&self) -> &str {
        "center_coral"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::GRABBER
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed = 0;
        self.centered_seen = false;
        self.done = false;
        self.timed_out = false;
        self.observe(ctx);
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed += 1;
        self.observe(ctx);
        if !self.done && self.timeout_ticks.is_some_and(|limit| self.elapsed >= limit) {
            warn!("Coral centering timed out after {} ticks", self.elapsed);
            self.done = true;
            self.timed_out = true;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if interrupted {
            ctx.hw.grabber.stop();
        } else {
            let hold = ctx.config.grabber.centering.hold;
            ctx.hw.grabber.set_target(Setpoint::Speed(hold));
        }
    }

    fn outcome(&self) -> Outcome {
        if self.timed_out {
            Outcome::TimedOut
        } else {
            Outcome::Completed
        }
    }
}

// ==================== 升降归零 ====================

/// 升降归零
///
/// 以慢速开环向下，电流超过堵转阈值后把编码器当前读数设为零点。
/// 超时视为成功但标记 `TimedOut`（此时不归零，保持当前位置）。
#[derive(Debug, Clone, Default)]
pub struct HomeLift {
    timeout_ticks: u32,
    elapsed: u32,
    zeroed: bool,
    done: bool,
}

impl HomeLift {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Lifecycle for HomeLift {
    fn name(&self) -> &str {
        "home_lift"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::LIFT
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        let lift = &ctx.config.lift;
        self.timeout_ticks = ctx.config.tick.ticks(lift.homing_timeout_s);
        self.elapsed = 0;
        self.zeroed = false;
        self.done = false;
        debug!("Homing lift at {:.2}", lift.homing_speed);
        ctx.hw.lift.set_target(Setpoint::Speed(lift.homing_speed));
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed += 1;
        if ctx.hw.lift.current() >= ctx.config.lift.homing_current_threshold {
            ctx.hw.lift.zero_position();
            info!("Lift homed after {} ticks", self.elapsed);
            self.zeroed = true;
            self.done = true;
        } else if self.elapsed >= self.timeout_ticks {
            warn!("Lift homing timed out after {} ticks", self.elapsed);
            self.done = true;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, interrupted: bool) {
        if self.zeroed && !interrupted {
            let floor = ctx.config.lift.min_height.value();
            ctx.hw.lift.set_target(Setpoint::Position(floor));
        } else {
            hold_lift(ctx);
        }
    }

    fn outcome(&self) -> Outcome {
        if self.done && !self.zeroed {
            Outcome::TimedOut
        } else {
            Outcome::Completed
        }
    }
}

// ==================== 爬升 ====================

/// 爬升机构运动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbDirection {
    Extend,
    Retract,
}

/// 把爬升机构开环驱动到展开 / 收回限位
///
/// 到达限位（容差内）完成；超时标记 `TimedOut`。结束时零输出（机构自锁）。
#[derive(Debug, Clone)]
pub struct MoveClimb {
    direction: ClimbDirection,
    timeout_ticks: u32,
    elapsed: u32,
    done: bool,
    timed_out: bool,
}

impl MoveClimb {
    pub fn new(direction: ClimbDirection) -> Self {
        Self {
            direction,
            timeout_ticks: 0,
            elapsed: 0,
            done: false,
            timed_out: false,
        }
    }

    pub fn extend() -> Self {
        Self::new(ClimbDirection::Extend)
    }

    pub fn retract() -> Self {
        Self::new(ClimbDirection::Retract)
    }

    fn at_limit(&self, ctx: &ActionContext<'_>) -> bool {
        let climb = &ctx.config.climb;
        let position = ctx.hw.climb.position();
        match self.direction {
            ClimbDirection::Extend => position >= climb.extend_limit - climb.tolerance,
            ClimbDirection::Retract => position <= climb.retract_limit + climb.tolerance,
        }
    }
}

impl Lifecycle for MoveClimb {
    fn name(&self) -> &str {
        match self.direction {
            ClimbDirection::Extend => "extend_climb",
            ClimbDirection::Retract => "retract_climb",
        }
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::CLIMB
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        let climb = &ctx.config.climb;
        self.timeout_ticks = ctx.config.tick.ticks(climb.timeout_s);
        self.elapsed = 0;
        self.timed_out = false;
        self.done = self.at_limit(ctx);
        if self.done {
            debug!("Climb already at {:?} limit", self.direction);
            return;
        }

        let speed = match self.direction {
            ClimbDirection::Extend => climb.speed,
            ClimbDirection::Retract => -climb.speed,
        };
        ctx.hw.climb.set_target(Setpoint::Speed(speed));
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.elapsed += 1;
        if self.at_limit(ctx) {
            self.done = true;
        } else if self.elapsed >= self.timeout_ticks {
            warn!(
                "Climb {:?} timed out after {} ticks",
                self.direction, self.elapsed
            );
            self.done = true;
            self.timed_out = true;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, _interrupted: bool) {
        ctx.hw.climb.stop();
    }

    fn outcome(&self) -> Outcome {
        if self.timed_out {
            Outcome::TimedOut
        } else {
            Outcome::Completed
        }
    }
}

// ==================== 手动点动 ====================

/// 点动目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JogTarget {
    Lift,
    Arm,
    Grabber,
    Climb,
}

impl JogTarget {
    pub fn resource(self) -> ResourceSet {
        match self {
            JogTarget::Lift => ResourceSet::LIFT,
            JogTarget::Arm => ResourceSet::ARM,
            JogTarget::Grabber => ResourceSet::GRABBER,
            JogTarget::Climb => ResourceSet::CLIMB,
        }
    }
}

/// 手动点动（按住期间持续运行，直到被中断）
///
/// 升降在软限位处停住；摆臂点动换算成角度目标，照常经过安全约束引擎。
#[derive(Debug, Clone)]
pub struct ManualJog {
    target: JogTarget,
    speed: f64,
}

impl ManualJog {
    pub fn new(target: JogTarget, speed: f64) -> Self {
        Self {
            target,
            speed: speed.clamp(-1.0, 1.0),
        }
    }

    fn drive(&self, ctx: &mut ActionContext<'_>) {
        match self.target {
            JogTarget::Lift => {
                let lift = &ctx.config.lift;
                let position = Meters(ctx.hw.lift.position());
                let blocked = (self.speed > 0.0 && position >= lift.max_height)
                    || (self.speed < 0.0 && position <= lift.min_height);
                if blocked {
                    hold_lift(ctx);
                } else {
                    ctx.hw.lift.set_target(Setpoint::Speed(self.speed));
                }
            },
            JogTarget::Arm => {
                let desired = Degrees(ctx.hw.arm.position() + self.speed * ARM_JOG_DEG_PER_TICK);
                let height = Meters(ctx.hw.lift.position());
                let allowed = ctx.config.arm.constraint().constrain(desired, height);
                ctx.hw.arm.set_target(Setpoint::Position(allowed.value()));
            },
            JogTarget::Grabber => ctx.hw.grabber.set_target(Setpoint::Speed(self.speed)),
            JogTarget::Climb => ctx.hw.climb.set_target(Setpoint::Speed(self.speed)),
        }
    }
}

impl Lifecycle for ManualJog {
    fn name(&self) -> &str {
        "manual_jog"
    }

    fn requirements(&self) -> ResourceSet {
        self.target.resource()
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        debug!("Jogging {:?} at {:.2}", self.target, self.speed);
        self.drive(ctx);
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) {
        self.drive(ctx);
    }

    fn is_done(&self) -> bool {
        false
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>, _interrupted: bool) {
        match self.target {
            JogTarget::Lift => hold_lift(ctx),
            JogTarget::Arm => hold_arm(ctx),
            JogTarget::Grabber => ctx.hw.grabber.stop(),
            JogTarget::Climb => ctx.hw.climb.stop(),
        }
    }
}
