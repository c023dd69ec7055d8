//! Reef SDK - 机器人上层结构编排
//!
//! 比赛机器人上层结构（升降、摆臂、夹爪、爬升、底盘）的决策与编排层，
//! 位于操作员 / 自动阶段请求与执行器驱动之间。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **工具层** (`tools`): 单位、场地位置、预设、安全约束、配置
//! - **驱动层** (`driver`): 执行器与路径跟随服务接口、资源标识、Mock 硬件
//! - **客户端层** (`client`): 分类器、原子动作、宏、状态机、调度器与 tick 运行时
//! - **控制层** (`control`): 自动阶段任务编译、路径库、计划注册表
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use reef_sdk::prelude::*;
//!
//! reef_sdk::init_logger();
//! let mut robot = Robot::new(hardware, RobotConfig::default())?;
//! robot.request_macro(MacroRequest::ScoreCoral(CoralLevel::L4))?;
//! loop {
//!     robot.tick();
//! }
//! ```

pub use reef_client as client;
pub use reef_control as control;
pub use reef_driver as driver;
pub use reef_tools as tools;

pub mod logging;
pub mod prelude;

pub use logging::{init_logger, init_logger_with};

// --- 用户以此为界 ---
// 以下是通过 Facade Pattern 提供的公共 API

pub use client::{MacroRequest, Robot};
pub use control::{Plan, PlanRegistry, RoutineSpec};
pub use tools::RobotConfig;

pub use client::RequestError;
pub use control::ControlError;
pub use driver::DriverError;
pub use tools::ConfigError;
