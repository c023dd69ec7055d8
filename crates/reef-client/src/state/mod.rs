//! 上层结构状态
//!
//! - [`machine`]：状态机本体（模式、转换、请求准入）
//! - [`snapshot`]：可序列化的状态快照，用于发布

pub mod machine;
pub mod snapshot;

pub use machine::{
    ClimbStatus, ControlMode, DriveMode, ManipulatorPhase, RequestKind, RobotState,
    Superstructure,
};
pub use snapshot::SuperstructureSnapshot;
