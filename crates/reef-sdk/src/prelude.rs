//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use reef_sdk::prelude::*;
//! ```

// 运行时与请求（推荐使用）
pub use crate::client::{MacroRequest, Robot};
pub use crate::client::{Action, ActionId, CompletionReport, Condition, Outcome};
pub use crate::client::{
    ControlMode, DriveMode, GrabType, RequestKind, RobotState, SuperstructureSnapshot,
};

// 自动阶段
pub use crate::control::{PathLibrary, Plan, PlanRegistry, RoutineSpec};

// 共享数据结构
pub use crate::tools::{
    AlgaeLevel, AlgaePosition, AlgaeScoreTarget, AutoTask, CoralLevel, CoralPosition, Degrees,
    HumanPlayerPosition, Meters, Pose, RobotConfig, StartPosition,
};

// 硬件接口
pub use crate::driver::{Actuator, ChassisSpeeds, DriveBase, Grabber, Hardware, PathFollower};

// 错误类型
pub use crate::client::RequestError;
pub use crate::control::ControlError;
pub use crate::driver::DriverError;
pub use crate::tools::ConfigError;
