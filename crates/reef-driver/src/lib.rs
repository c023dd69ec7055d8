//! 驱动层模块
//!
//! 本模块定义决策层与外部执行器之间的接缝：
//! - 执行器接口（`Actuator` / `Grabber` / `DriveBase`）：设定目标、读取遥测、停止
//! - 路径跟随服务接口（`PathFollower`）：按名称跟随路径、查询进度
//! - 资源标识（`ResourceSet`）：每个执行器资源同一时刻只属于一个活动动作
//! - 硬件集合（`Hardware`）：运行时持有的全部执行器
//!
//! 闭环控制、前馈、里程计与轨迹生成都在这些接口之外，由电机控制器驱动和路径跟随服务负责。
//!
//! # Mock 模式
//!
//! 启用 `mock` feature 后可使用 [`mock`] 模块中的仿真执行器与仿真路径跟随器，
//! 无需真实硬件即可运行完整的 tick 循环。

pub mod actuator;
mod error;
pub mod hardware;
pub mod path;
pub mod resource;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use actuator::{Actuator, ChassisSpeeds, DriveBase, Grabber, PieceSensors, Setpoint};
pub use error::DriverError;
pub use hardware::Hardware;
pub use path::{PathFollower, PathHandle};
pub use resource::ResourceSet;
