//! 上层结构状态机
//!
//! 持有机器人全部"独立轴"状态：机器人状态、控制模式、底盘模式、
//! 持有游戏件、操纵器阶段、爬升进度。每个轴任意时刻只有一个值，
//! 并且只能通过这里的显式转换修改。
//!
//! # 状态转换
//!
//! ```text
//!            enable_manual / toggle(Macro→Manual)
//!   Ready ───────────────────────────────────────▶ Manual
//!     ▲  ◀─────────────────────────────────────────  │
//!     │      disable_manual / toggle(Manual→Macro)   │
//!     │                                              │
//!     │ exit_climbing           enter_climbing       │
//!     └────────────── Climbing ◀─────────────────────┘
//! ```
//!
//! `Climbing` 是排他的：期间只接受爬升请求，手动切换被拒绝。
//! 急停在任何状态下都合法，强制回到 `Ready`。
//!
//! 状态机本身从不接触硬件；急停的零输出由运行时通过硬件集合执行。

use super::snapshot::SuperstructureSnapshot;
use crate::classifier::{Classification, CoralDetectionState, GrabType};
use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// 机器人状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RobotState {
    #[default]
    Ready,
    Climbing,
    Manual,
}

/// 控制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlMode {
    Manual,
    #[default]
    Macro,
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Manual => f.write_str("manual"),
            ControlMode::Macro => f.write_str("macro"),
        }
    }
}

/// 底盘驾驶模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriveMode {
    Slow,
    #[default]
    Medium,
    Turbo,
    Locked,
}

impl DriveMode {
    /// 循环切换：Slow → Medium → Turbo → Slow
    ///
    /// `Locked` 只能通过显式设置进入；从 `Locked` 循环回到 `Slow`。
    pub fn next(self) -> Self {
        match self {
            DriveMode::Slow => DriveMode::Medium,
            DriveMode::Medium => DriveMode::Turbo,
            DriveMode::Turbo => DriveMode::Slow,
            DriveMode::Locked => DriveMode::Slow,
        }
    }

    /// 平移速度比例
    pub fn speed_scale(self) -> f64 {
        match self {
            DriveMode::Slow => 0.25,
            DriveMode::Medium => 0.5,
            DriveMode::Turbo => 1.0,
            DriveMode::Locked => 0.0,
        }
    }
}

/// 操纵器阶段（由宏写入）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ManipulatorPhase {
    #[default]
    Idle,
    Intaking,
    Holding,
    Positioning,
    Scoring,
}

/// 爬升进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClimbStatus {
    #[default]
    Stowed,
    /// 爬升机构已展开，可以执行爬升
    Ready,
    Climbed,
}

/// 请求类别（用于准入判断）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Macro,
    Manual,
    Climb,
    Autonomous,
    /// 操作员底盘驾驶
    Drive,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Macro => "macro",
            RequestKind::Manual => "manual",
            RequestKind::Climb => "climb",
            RequestKind::Autonomous => "autonomous",
            RequestKind::Drive => "drive",
        };
        f.write_str(name)
    }
}

/// 上层结构状态机
///
/// 不变量：`control_mode == Manual` ⇒ `robot_state ∈ {Manual, Climbing}`。
#[derive(Debug, Clone, Default)]
pub struct Superstructure {
    robot_state: RobotState,
    control_mode: ControlMode,
    drive_mode: DriveMode,
    game_piece_held: bool,
    held_piece: GrabType,
    coral_detection: CoralDetectionState,
    target_grab_type: GrabType,
    phase: ManipulatorPhase,
    climb_status: ClimbStatus,
    /// 进入手动控制前的机器人状态（离开手动控制时恢复）
    pre_manual_state: Option<RobotState>,
    last_published: Option<SuperstructureSnapshot>,
}

impl Superstructure {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 查询 ====================

    pub fn robot_state(&self) -> RobotState {
        self.robot_state
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.drive_mode
    }

    /// 是否持有游戏件（持有 ⇔ 分类结果不为 None）
    pub fn game_piece_held(&self) -> bool {
        self.game_piece_held
    }

    /// 当前持有的游戏件类型（分类器输出）
    pub fn held_piece(&self) -> GrabType {
        self.held_piece
    }

    pub fn coral_detection(&self) -> CoralDetectionState {
        self.coral_detection
    }

    /// 当前目标游戏件类型（宏或操作员选择，与检测无关）
    pub fn target_grab_type(&self) -> GrabType {
        self.target_grab_type
    }

    pub fn phase(&self) -> ManipulatorPhase {
        self.phase
    }

    pub fn climb_status(&self) -> ClimbStatus {
        self.climb_status
    }

    pub fn is_climbing(&self) -> bool {
        self.robot_state == RobotState::Climbing
    }

    // ==================== 每 tick 刷新 ====================

    /// 用分类结果刷新持有状态
    pub fn refresh(&mut self, classification: Classification) {
        let held = classification.held_type();
        if held != self.held_piece {
            info!("Held game piece: {} -> {}", self.held_piece, held);
        }
        self.held_piece = held;
        self.coral_detection = classification.coral;
        self.game_piece_held = classification.is_holding();
    }

    // ==================== 转换 ====================

    /// 进入爬升（无条件）
    pub fn enter_climbing(&mut self) {
        if self.robot_state != RobotState::Climbing {
            info!("Robot state: {:?} -> Climbing", self.robot_state);
            self.robot_state = RobotState::Climbing;
        }
    }

    /// 退出爬升（无条件）
    ///
    /// 手动控制下回到 `Manual`，否则回到 `Ready`。
    pub fn exit_climbing(&mut self) {
        if self.robot_state != RobotState::Climbing {
            return;
        }
        self.robot_state = match self.control_mode {
            ControlMode::Manual => RobotState::Manual,
            ControlMode::Macro => RobotState::Ready,
        };
        info!("Robot state: Climbing -> {:?}", self.robot_state);
    }

    /// 进入手动控制
    ///
    /// 控制模式切到 `Manual`，机器人状态强制为 `Manual`；已在手动控制下是空操作。
    /// 机器人状态与控制模式始终一起变化，准入只需看控制模式。
    ///
    /// # 错误
    ///
    /// - `RequestError::ManualWhileClimbing`: 爬升期间被拒绝，状态不变
    pub fn enable_manual(&mut self) -> Result<(), RequestError> {
        self.reject_while_climbing()?;
        if self.control_mode == ControlMode::Macro {
            self.enter_manual_control();
        }
        Ok(())
    }

    /// 离开手动控制，回到宏控制模式和进入前的机器人状态
    ///
    /// # 错误
    ///
    /// - `RequestError::ManualWhileClimbing`: 爬升期间被拒绝，状态不变
    pub fn disable_manual(&mut self) -> Result<(), RequestError> {
        self.reject_while_climbing()?;
        if self.control_mode == ControlMode::Manual {
            self.leave_manual_control();
        }
        Ok(())
    }

    /// 切换控制模式
    ///
    /// - Macro → Manual：记住当前机器人状态，并强制 `Manual`
    /// - Manual → Macro：恢复进入手动前的机器人状态（没有则 `Ready`）
    ///
    /// 两次切换回到原状态（对外可见部分）。
    ///
    /// # 错误
    ///
    /// - `RequestError::ManualWhileClimbing`: 爬升期间被拒绝，状态不变
    pub fn toggle_control_mode(&mut self) -> Result<ControlMode, RequestError> {
        self.reject_while_climbing()?;
        match self.control_mode {
            ControlMode::Macro => self.enter_manual_control(),
            ControlMode::Manual => self.leave_manual_control(),
        }
        Ok(self.control_mode)
    }

    fn enter_manual_control(&mut self) {
        self.pre_manual_state = Some(self.robot_state);
        self.control_mode = ControlMode::Manual;
        self.robot_state = RobotState::Manual;
        info!("Control mode -> manual, robot state -> Manual");
    }

    fn leave_manual_control(&mut self) {
        self.control_mode = ControlMode::Macro;
        self.robot_state = self.pre_manual_state.take().unwrap_or(RobotState::Ready);
        info!("Control mode -> macro, robot state -> {:?}", self.robot_state);
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        if mode != self.drive_mode {
            info!("Drive mode: {:?} -> {:?}", self.drive_mode, mode);
            self.drive_mode = mode;
        }
    }

    /// 循环切换底盘模式，返回新模式
    pub fn cycle_drive_mode(&mut self) -> DriveMode {
        self.set_drive_mode(self.drive_mode.next());
        self.drive_mode
    }

    /// 急停（状态部分）
    ///
    /// 任何状态下都合法：强制 `Ready`，清除持有标志，回到宏控制模式，
    /// 操纵器阶段回到 `Idle`。零输出由运行时负责。
    pub fn emergency_stop(&mut self) {
        warn!(
            "Emergency stop: robot state {:?} -> Ready (control mode {})",
            self.robot_state, self.control_mode
        );
        self.robot_state = RobotState::Ready;
        self.control_mode = ControlMode::Macro;
        self.pre_manual_state = None;
        self.game_piece_held = false;
        self.held_piece = GrabType::None;
        self.phase = ManipulatorPhase::Idle;
    }

    // ==================== 宏写入的子状态 ====================

    pub fn set_target_grab_type(&mut self, target: GrabType) {
        if target != self.target_grab_type {
            info!("Target game piece: {} -> {}", self.target_grab_type, target);
            self.target_grab_type = target;
        }
    }

    pub fn set_phase(&mut self, phase: ManipulatorPhase) {
        if phase != self.phase {
            info!("Manipulator phase: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn set_climb_status(&mut self, status: ClimbStatus) {
        if status != self.climb_status {
            info!("Climb status: {:?} -> {:?}", self.climb_status, status);
            self.climb_status = status;
        }
    }

    // ==================== 准入 ====================

    /// 判断某类请求当前是否被接受
    ///
    /// | 请求 | 条件 |
    /// |------|------|
    /// | Climb | 总是 |
    /// | Autonomous, Drive | 非爬升 |
    /// | Macro | 非爬升，且控制模式为 Macro |
    /// | Manual | 非爬升，且控制模式为 Manual |
    pub fn admit(&self, kind: RequestKind) -> Result<(), RequestError> {
        if kind == RequestKind::Climb {
            return Ok(());
        }
        if self.is_climbing() {
            return Err(RequestError::Climbing { request: kind });
        }
        let required = match kind {
            RequestKind::Macro => ControlMode::Macro,
            RequestKind::Manual => ControlMode::Manual,
            RequestKind::Autonomous | RequestKind::Drive | RequestKind::Climb => return Ok(()),
        };
        if self.control_mode != required {
            return Err(RequestError::WrongControlMode {
                request: kind,
                mode: self.control_mode,
            });
        }
        Ok(())
    }

    // ==================== 发布 ====================

    pub fn snapshot(&self) -> SuperstructureSnapshot {
        SuperstructureSnapshot {
            robot_state: self.robot_state,
            control_mode: self.control_mode,
            drive_mode: self.drive_mode,
            game_piece_held: self.game_piece_held,
            held_piece: self.held_piece,
            coral_detection: self.coral_detection,
            target_grab_type: self.target_grab_type,
            phase: self.phase,
            climb_status: self.climb_status,
        }
    }

    /// 发布快照：与上一次发布不同时返回新快照
    pub fn publish(&mut self) -> Option<SuperstructureSnapshot> {
        let snapshot = self.snapshot();
        if self.last_published == Some(snapshot) {
            return None;
        }
        debug!(?snapshot, "Publishing superstructure state");
        self.last_published = Some(snapshot);
        Some(snapshot)
    }

    fn reject_while_climbing(&self) -> Result<(), RequestError> {
        if self.is_climbing() {
            warn!("Manual override rejected: robot is climbing");
            return Err(RequestError::ManualWhileClimbing);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use proptest::prelude::*;
    use reef_driver::PieceSensors;

    fn holding_coral() -> Classification {
        classify(PieceSensors {
            front: true,
            back: true,
            algae: false,
        })
    }

    #[test]
    fn test_defaults() {
        let s = Superstructure::new();
        assert_eq!(s.robot_state(), RobotState::Ready);
        assert_eq!(s.control_mode(), ControlMode::Macro);
        assert_eq!(s.target_grab_type(), GrabType::None);
        assert!(!s.game_piece_held());
    }

    #[test]
    fn test_refresh_from_classifier() {
        let mut s = Superstructure::new();
        s.refresh(holding_coral());
        assert!(s.game_piece_held());
        assert_eq!(s.held_piece(), GrabType::Coral);
        assert_eq!(s.coral_detection(), CoralDetectionState::Both);

        s.refresh(Classification::default());
        assert!(!s.game_piece_held());
        assert_eq!(s.held_piece(), GrabType::None);
    }

    #[test]
    fn test_manual_rejected_while_climbing() {
        let mut s = Superstructure::new();
        s.enter_climbing();

        assert_eq!(s.enable_manual(), Err(RequestError::ManualWhileClimbing));
        assert_eq!(s.disable_manual(), Err(RequestError::ManualWhileClimbing));
        assert_eq!(s.toggle_control_mode(), Err(RequestError::ManualWhileClimbing));
        assert_eq!(s.robot_state(), RobotState::Climbing);
        assert_eq!(s.control_mode(), ControlMode::Macro);
    }

    #[test]
    fn test_enable_manual_switches_control_mode_and_gating() {
        let mut s = Superstructure::new();
        s.enable_manual().unwrap();
        assert_eq!(s.robot_state(), RobotState::Manual);
        assert_eq!(s.control_mode(), ControlMode::Manual);
        assert!(s.admit(RequestKind::Manual).is_ok());
        assert!(matches!(
            s.admit(RequestKind::Macro),
            Err(RequestError::WrongControlMode { .. })
        ));

        // 重复进入不覆盖记住的状态
        s.enable_manual().unwrap();
        s.disable_manual().unwrap();
        assert_eq!(s.robot_state(), RobotState::Ready);
        assert_eq!(s.control_mode(), ControlMode::Macro);
        assert!(s.admit(RequestKind::Macro).is_ok());
        assert!(s.admit(RequestKind::Manual).is_err());
    }

    #[test]
    fn test_toggle_forces_manual_and_restores() {
        let mut s = Superstructure::new();
        assert_eq!(s.toggle_control_mode(), Ok(ControlMode::Manual));
        assert_eq!(s.robot_state(), RobotState::Manual);

        assert_eq!(s.toggle_control_mode(), Ok(ControlMode::Macro));
        assert_eq!(s.robot_state(), RobotState::Ready);
    }

    #[test]
    fn test_exit_climbing_respects_control_mode() {
        let mut s = Superstructure::new();
        s.toggle_control_mode().unwrap();
        s.enter_climbing();
        s.exit_climbing();
        assert_eq!(s.robot_state(), RobotState::Manual);

        let mut s = Superstructure::new();
        s.enter_climbing();
        s.exit_climbing();
        assert_eq!(s.robot_state(), RobotState::Ready);
    }

    #[test]
    fn test_emergency_stop_during_climbing() {
        for manual in [false, true] {
            let mut s = Superstructure::new();
            if manual {
                s.toggle_control_mode().unwrap();
            }
            s.refresh(holding_coral());
            s.enter_climbing();

            s.emergency_stop();

            assert_eq!(s.robot_state(), RobotState::Ready);
            assert!(!s.game_piece_held());
            assert_eq!(s.control_mode(), ControlMode::Macro);
        }
    }

    #[test]
    fn test_cycle_drive_mode() {
        let mut s = Superstructure::new();
        s.set_drive_mode(DriveMode::Slow);
        let visited: Vec<_> = (0..6).map(|_| s.cycle_drive_mode()).collect();
        assert_eq!(
            visited,
            vec![
                DriveMode::Medium,
                DriveMode::Turbo,
                DriveMode::Slow,
                DriveMode::Medium,
                DriveMode::Turbo,
                DriveMode::Slow,
            ]
        );

        s.set_drive_mode(DriveMode::Locked);
        assert_eq!(s.cycle_drive_mode(), DriveMode::Slow);
    }

    #[test]
    fn test_admit() {
        let mut s = Superstructure::new();
        assert!(s.admit(RequestKind::Macro).is_ok());
        assert!(s.admit(RequestKind::Autonomous).is_ok());
        assert_eq!(
            s.admit(RequestKind::Manual),
            Err(RequestError::WrongControlMode {
                request: RequestKind::Manual,
                mode: ControlMode::Macro,
            })
        );

        s.toggle_control_mode().unwrap();
        assert!(s.admit(RequestKind::Manual).is_ok());
        assert!(s.admit(RequestKind::Macro).is_err());

        s.enter_climbing();
        assert!(s.admit(RequestKind::Climb).is_ok());
        for kind in [
            RequestKind::Macro,
            RequestKind::Manual,
            RequestKind::Autonomous,
            RequestKind::Drive,
        ] {
            assert_eq!(
                s.admit(kind),
                Err(RequestError::Climbing { request: kind })
            );
        }
    }

    #[test]
    fn test_publish_only_on_change() {
        let mut s = Superstructure::new();
        assert!(s.publish().is_some());
        assert!(s.publish().is_none());
        s.set_phase(ManipulatorPhase::Intaking);
        let snapshot = s.publish().unwrap();
        assert_eq!(snapshot.phase, ManipulatorPhase::Intaking);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        EnterClimbing,
        ExitClimbing,
        EnableManual,
        DisableManual,
        Toggle,
        Cycle,
        EmergencyStop,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::EnterClimbing),
            Just(Op::ExitClimbing),
            Just(Op::EnableManual),
            Just(Op::DisableManual),
            Just(Op::Toggle),
            Just(Op::Cycle),
            Just(Op::EmergencyStop),
        ]
    }

    fn apply(s: &mut Superstructure, op: Op) {
        match op {
            Op::EnterClimbing => s.enter_climbing(),
            Op::ExitClimbing => s.exit_climbing(),
            Op::EnableManual => {
                let _ = s.enable_manual();
            },
            Op::DisableManual => {
                let _ = s.disable_manual();
            },
            Op::Toggle => {
                let _ = s.toggle_control_mode();
            },
            Op::Cycle => {
                s.cycle_drive_mode();
            },
            Op::EmergencyStop => s.emergency_stop(),
        }
    }

    proptest! {
        /// 两次切换控制模式回到原状态；爬升期间切换是空操作
        #[test]
        fn prop_toggle_involutive(ops in prop::collection::vec(op_strategy(), 0..24)) {
            let mut s = Superstructure::new();
            for op in ops {
                apply(&mut s, op);
            }
            let before = s.snapshot();

            if s.is_climbing() {
                prop_assert!(s.toggle_control_mode().is_err());
                prop_assert_eq!(s.snapshot(), before);
            } else {
                s.toggle_control_mode().unwrap();
                s.toggle_control_mode().unwrap();
                prop_assert_eq!(s.snapshot(), before);
            }
        }

        /// 手动控制模式下机器人状态只能是 Manual 或 Climbing；
        /// Manual 状态只出现在手动控制模式下
        #[test]
        fn prop_manual_control_follows_mode(ops in prop::collection::vec(op_strategy(), 0..32)) {
            let mut s = Superstructure::new();
            for op in ops {
                apply(&mut s, op);
                if s.control_mode() == ControlMode::Manual {
                    prop_assert!(matches!(
                        s.robot_state(),
                        RobotState::Manual | RobotState::Climbing
                    ));
                }
                if s.robot_state() == RobotState::Manual {
                    prop_assert_eq!(s.control_mode(), ControlMode::Manual);
                }
            }
        }

        /// 循环切换从不进入 Locked
        #[test]
        fn prop_cycle_never_locks(n in 0usize..20) {
            let mut s = Superstructure::new();
            for _ in 0..n {
                prop_assert_ne!(s.cycle_drive_mode(), DriveMode::Locked);
            }
        }
    }
}
