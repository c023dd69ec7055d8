//! Mock 硬件
//!
//! 用于测试和 CLI 仿真的模拟执行器与路径跟随器。

mod actuator;
mod path;

pub use actuator::{
    MockActuator, MockActuatorState, MockDriveBase, MockDriveState, MockGrabber, STALL_CURRENT,
};
pub use path::MockPathFollower;

use crate::hardware::Hardware;
use reef_tools::{PathEntry, TickConfig};

/// 一整套模拟硬件
///
/// 所有字段都是共享句柄：`hardware()` 交出去的执行器与这里的字段指向同一份状态。
#[derive(Debug, Clone)]
pub struct MockRig {
    pub lift: MockActuator,
    pub arm: MockActuator,
    pub grabber: MockGrabber,
    pub climb: MockActuator,
    pub base: MockDriveBase,
    pub paths: MockPathFollower,
}

impl MockRig {
    /// 默认机构参数：升降 0–1.45 m、摆臂 -30°–200°（初始竖直 90°）、爬升 0–120
    pub fn new() -> Self {
        Self {
            lift: MockActuator::new(0.0, 1.5, 0.0, 1.45),
            arm: MockActuator::new(90.0, 360.0, -30.0, 200.0),
            grabber: MockGrabber::new(),
            climb: MockActuator::new(0.0, 60.0, 0.0, 120.0),
            base: MockDriveBase::new(),
            paths: MockPathFollower::new(),
        }
    }

    /// 按配置登记路径（时长换算为 tick）
    pub fn with_paths(self, entries: &[PathEntry], tick: &TickConfig) -> Self {
        for entry in entries {
            self.paths.add_path(entry.name.clone(), tick.ticks(entry.duration_s));
        }
        self
    }

    /// 构造交给运行时的硬件集合
    pub fn hardware(&self) -> Hardware {
        Hardware {
            lift: Box::new(self.lift.clone()),
            arm: Box::new(self.arm.clone()),
            grabber: Box::new(self.grabber.clone()),
            climb: Box::new(self.climb.clone()),
            base: Box::new(self.base.clone()),
            paths: Box::new(self.paths.clone()),
        }
    }

    /// 推进全部仿真 `dt` 秒（路径推进一个 tick）
    pub fn simulate(&self, dt: f64) {
        self.lift.simulate(dt);
        self.arm.simulate(dt);
        self.grabber.simulate(dt);
        self.climb.simulate(dt);
        self.paths.advance();
    }
}

impl Default for MockRig {
    fn default() -> Self {
        Self::new()
    }
}
