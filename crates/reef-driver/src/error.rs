//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// 路径跟随服务中不存在该路径
    #[error("Unknown path: {0}")]
    UnknownPath(String),
}
