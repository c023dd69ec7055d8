//! 路径跟随服务接口
//!
//! 路径几何、里程计和轨迹生成都在服务内部；决策层只按名称请求跟随并轮询进度。
//! 进度触发器（在某个进度分数触发附加动作）由客户端层的 follow-path 动作持有。

use crate::error::DriverError;

/// 路径跟随句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathHandle(pub u64);

/// 路径跟随服务
pub trait PathFollower {
    /// 服务中是否存在该路径
    fn has_path(&self, name: &str) -> bool;

    /// 开始跟随指定路径
    ///
    /// # 错误
    ///
    /// - `DriverError::UnknownPath`: 路径不存在
    fn follow(&mut self, name: &str) -> Result<PathHandle, DriverError>;

    /// 进度分数 ∈ [0, 1]
    fn progress(&self, handle: PathHandle) -> f64;

    /// 路径是否已跟随完成
    fn is_finished(&self, handle: PathHandle) -> bool;

    /// 取消跟随（底盘停止）
    fn cancel(&mut self, handle: PathHandle);
}
