//! 执行器接口
//!
//! 决策层只能看到三类操作：设定目标、读取遥测、停止。
//! 闭环控制与前馈完全由电机控制器驱动负责。

/// 执行器设定值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setpoint {
    /// 闭环位置目标（升降：米；摆臂：度；爬升：机构单位）
    Position(f64),
    /// 开环占空比（-1.0..=1.0）
    Speed(f64),
}

/// 单一执行器（升降、摆臂、夹爪滚轮、爬升）
pub trait Actuator {
    /// 设定目标
    fn set_target(&mut self, setpoint: Setpoint);

    /// 当前位置
    fn position(&self) -> f64;

    /// 当前速度
    fn velocity(&self) -> f64;

    /// 当前电流（A）
    fn current(&self) -> f64;

    /// 停止输出（零输出）
    fn stop(&mut self);

    /// 将编码器当前读数设为零点（归零完成时调用）
    ///
    /// 默认实现不做任何事，适用于没有相对编码器的执行器。
    fn zero_position(&mut self) {}
}

/// 夹爪游戏件传感器快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceSensors {
    /// 珊瑚前端检测器
    pub front: bool,
    /// 珊瑚后端检测器
    pub back: bool,
    /// 藻类检测器
    pub algae: bool,
}

/// 夹爪：滚轮执行器 + 游戏件传感器
pub trait Grabber: Actuator {
    fn read_piece_sensors(&self) -> PieceSensors;
}

/// 底盘速度（场地坐标系）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// m/s
    pub vx: f64,
    /// m/s
    pub vy: f64,
    /// rad/s
    pub omega: f64,
}

impl ChassisSpeeds {
    pub const ZERO: Self = ChassisSpeeds {
        vx: 0.0,
        vy: 0.0,
        omega: 0.0,
    };

    /// 平移分量按比例缩放（旋转保持不变）
    pub fn scale_translation(self, scale: f64) -> Self {
        Self {
            vx: self.vx * scale,
            vy: self.vy * scale,
            omega: self.omega,
        }
    }
}

/// 移动底盘（手动驾驶接口；自动阶段由路径跟随服务驱动）
pub trait DriveBase {
    fn drive(&mut self, speeds: ChassisSpeeds);

    /// 锁定轮组（X 形）
    fn lock(&mut self);

    fn stop(&mut self);
}
