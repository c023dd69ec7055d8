//! 上层结构客户端
//!
//! 本 crate 提供机器人上层结构（升降、摆臂、夹爪、爬升、底盘）的决策与编排：
//! - 游戏件分类器（纯函数，每 tick 由传感器快照计算）
//! - 原子动作库（start / step / is_done / stop 生命周期）
//! - 宏序列器（顺序、并行、截止、条件组合 + 标准宏）
//! - 上层结构状态机（模式、请求准入、状态发布）
//! - 资源调度器与 tick 运行时 [`Robot`]
//!
//! # 使用场景
//!
//! 这是大多数调用方应该使用的层。硬件接口见 [`reef_driver`]，
//! 自动阶段任务编译见 `reef-control`。
//!
//! # 示例
//!
//! ```rust,ignore
//! use reef_client::{MacroRequest, Robot};
//! use reef_tools::{CoralLevel, RobotConfig};
//!
//! let mut robot = Robot::new(hardware, RobotConfig::default())?;
//! robot.request_macro(MacroRequest::ScoreCoral(CoralLevel::L4))?;
//! loop {
//!     robot.tick();
//! }
//! ```

pub mod action;
pub mod classifier;
mod error;
pub mod macros;
pub mod robot;
pub mod scheduler;
pub mod state;

pub use action::{
    Action, ActionContext, CenterCoral, ClimbDirection, Concurrent, Condition, Conditional,
    EjectPiece, FollowPath, HomeLift, IntakePiece, JogTarget, ManualJog, MoveArm, MoveClimb,
    MoveLift, Outcome, ProgressTrigger, RunGrabber, Sequential, Signals, StateUpdate, WaitTicks,
    WaitUntil,
};
pub use classifier::{Classification, CoralDetectionState, GrabType, classify};
pub use error::RequestError;
pub use macros::Macros;
pub use robot::{MacroRequest, Robot};
pub use scheduler::{ActionId, CompletionReport, Scheduler};
pub use state::{
    ClimbStatus, ControlMode, DriveMode, ManipulatorPhase, RequestKind, RobotState,
    Superstructure, SuperstructureSnapshot,
};
