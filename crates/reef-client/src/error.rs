//! 客户端层错误类型

use crate::state::{ControlMode, RequestKind};
use thiserror::Error;

/// 请求被状态机拒绝的原因
///
/// 被拒绝的请求不会改变任何状态。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// 爬升期间只接受爬升请求
    #[error("{request} request rejected: robot is climbing")]
    Climbing { request: RequestKind },

    /// 控制模式不匹配
    #[error("{request} request rejected: control mode is {mode}")]
    WrongControlMode {
        request: RequestKind,
        mode: ControlMode,
    },

    /// 爬升期间不允许切换手动模式
    #[error("Manual override is not allowed while climbing")]
    ManualWhileClimbing,
}
