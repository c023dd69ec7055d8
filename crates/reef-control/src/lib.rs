//! 自动阶段控制层
//!
//! 本 crate 在赛前把自动阶段例程编译为可执行计划：
//! - 路径库（[`PathLibrary`]）：已知的命名路径及挂在路径上的进度触发器
//! - 任务编译器（[`TaskCompiler`]）：有序任务列表 → 路径跟随与宏组成的计划
//! - 计划（[`Plan`]）：按任务顺序的各段，以及被丢弃的任务和原因
//! - 注册表（[`PlanRegistry`]）：比赛控制前端按名称选择计划
//! - 例程文件（[`RoutineSpec`]）：JSON 格式的例程描述
//!
//! # 示例
//!
//! ```rust
//! use reef_control::{PathLibrary, RoutineSpec};
//! use reef_tools::RobotConfig;
//!
//! let routine = RoutineSpec::from_json_str(
//!     r#"{ "name": "one", "start": "S1", "human_player": "HP2",
//!          "tasks": [{ "type": "ScoreCoral", "position": "A", "level": "L4" }] }"#,
//! )?;
//! let mut library = PathLibrary::new();
//! library.insert("HP2-A");
//!
//! // S1-HP2 不存在：任务被丢弃，计划为空
//! let plan = routine.compile(&RobotConfig::default(), &mut library);
//! assert!(plan.is_empty());
//! # Ok::<(), reef_control::ControlError>(())
//! ```

pub mod compiler;
mod error;
pub mod path_library;
pub mod plan;
pub mod registry;
pub mod routine;

pub use compiler::{TaskCompiler, compile};
pub use error::ControlError;
pub use path_library::PathLibrary;
pub use plan::{DropReason, DroppedTask, Plan, PlanLeg, PlanSummary};
pub use registry::PlanRegistry;
pub use routine::RoutineSpec;
