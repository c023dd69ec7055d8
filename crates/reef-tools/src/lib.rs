//! # Reef Tools - 共享数据结构和配置
//!
//! **依赖原则**: 不依赖任何硬件层 crate（`reef-driver`、`reef-client`）
//!
//! ## 包含模块
//!
//! - `units` - 强类型单位（`Meters`、`Degrees`）
//! - `field` - 场地位置枚举（起点、人类玩家站、珊瑚分支、藻类位置、藻类得分点）
//! - `task` - 自动阶段任务（四种具体形状的标签联合）
//! - `presets` - 各层级的升降高度 / 摆臂角度预设
//! - `safety` - 安全约束引擎（依赖升降高度的摆臂角度限制）
//! - `config` - 机器人配置（TOML）
//!
//! ## 使用示例
//!
//! ```rust
//! use reef_tools::{Degrees, Meters, RobotConfig};
//!
//! let config = RobotConfig::default();
//! let allowed = config.arm.constraint().constrain(Degrees(170.0), Meters(0.1));
//! assert!(allowed <= config.arm.constrained.max);
//! ```

pub mod config;
pub mod field;
pub mod presets;
pub mod safety;
pub mod task;
pub mod units;

// 重新导出常用类型
pub use config::{
    ArmConfig, AutoConfig, CenteringSpeeds, ClimbConfig, ConfigError, GrabberConfig, LiftConfig,
    PathEntry, PieceSpeeds, RobotConfig, TickConfig,
};
pub use field::{
    AlgaePosition, AlgaeScoreTarget, CoralPosition, FieldPosition, HumanPlayerPosition,
    StartPosition, path_name,
};
pub use presets::{AlgaeLevel, CoralLevel, Pose, PresetTable};
pub use safety::{AngleRange, ArmConstraint};
pub use task::{AutoTask, TaskFamily};
pub use units::{Degrees, Meters};
