//! 硬件集合
//!
//! 运行时持有的全部执行器与外部服务。动作通过上下文借用它，
//! 状态机和宏序列器本身从不直接接触硬件。

use crate::actuator::{Actuator, DriveBase, Grabber, PieceSensors};
use crate::path::PathFollower;
use crate::resource::ResourceSet;
use tracing::warn;

/// 硬件集合
pub struct Hardware {
    pub lift: Box<dyn Actuator>,
    pub arm: Box<dyn Actuator>,
    pub grabber: Box<dyn Grabber>,
    pub climb: Box<dyn Actuator>,
    pub base: Box<dyn DriveBase>,
    pub paths: Box<dyn PathFollower>,
}

impl Hardware {
    /// 读取夹爪游戏件传感器
    #[inline]
    pub fn piece_sensors(&self) -> PieceSensors {
        self.grabber.read_piece_sensors()
    }

    /// 停止指定资源的输出
    pub fn stop(&mut self, resources: ResourceSet) {
        if resources.contains(ResourceSet::LIFT) {
            self.lift.stop();
        }
        if resources.contains(ResourceSet::ARM) {
            self.arm.stop();
        }
        if resources.contains(ResourceSet::GRABBER) {
            self.grabber.stop();
        }
        if resources.contains(ResourceSet::CLIMB) {
            self.climb.stop();
        }
        if resources.contains(ResourceSet::BASE) {
            self.base.stop();
        }
    }

    /// 所有执行器零输出（急停）
    pub fn stop_all(&mut self) {
        warn!("Zeroing all actuator outputs");
        self.stop(ResourceSet::all());
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockRig;
    use crate::{ResourceSet, Setpoint};

    #[test]
    fn test_stop_only_touches_requested_resources() {
        let rig = MockRig::new();
        let mut hw = rig.hardware();
        hw.lift.set_target(Setpoint::Speed(0.5));
        hw.grabber.set_target(Setpoint::Speed(0.5));

        hw.stop(ResourceSet::GRABBER);

        assert_eq!(rig.grabber.setpoint(), None);
        assert_eq!(rig.lift.setpoint(), Some(Setpoint::Speed(0.5)));
    }

    #[test]
    fn test_stop_all() {
        let rig = MockRig::new();
        let mut hw = rig.hardware();
        hw.lift.set_target(Setpoint::Position(1.0));
        hw.arm.set_target(Setpoint::Position(45.0));
        hw.climb.set_target(Setpoint::Speed(1.0));

        hw.stop_all();

        assert_eq!(rig.lift.setpoint(), None);
        assert_eq!(rig.arm.setpoint(), None);
        assert_eq!(rig.climb.setpoint(), None);
        assert_eq!(rig.base.stop_count(), 1);
    }
}
