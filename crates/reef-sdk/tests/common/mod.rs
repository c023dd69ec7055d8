//! 集成测试公共工具

#![allow(dead_code)]

use reef_sdk::driver::mock::MockRig;
use reef_sdk::tools::PathEntry;
use reef_sdk::{Robot, RobotConfig};

/// 自动供件延迟（秒）
pub const FEED_DELAY_S: f64 = 0.1;

/// 登记了给定路径的默认配置
pub fn config_with_paths(paths: &[(&str, f64)]) -> RobotConfig {
    let mut config = RobotConfig::default();
    config.auto.paths = paths
        .iter()
        .map(|(name, duration_s)| PathEntry {
            name: name.to_string(),
            duration_s: *duration_s,
        })
        .collect();
    config
}

/// 按配置搭好的模拟硬件与运行时（夹爪开启自动供件）
pub fn setup(config: RobotConfig) -> (MockRig, Robot) {
    let rig = MockRig::new().with_paths(&config.auto.paths, &config.tick);
    rig.grabber.enable_auto_feed(FEED_DELAY_S);
    let robot = Robot::new(rig.hardware(), config).expect("default config is valid");
    (rig, robot)
}

/// 推进固定 tick 数
pub fn run(rig: &MockRig, robot: &mut Robot, ticks: u32) {
    let dt = robot.config().tick.period_secs();
    for _ in 0..ticks {
        rig.simulate(dt);
        robot.tick();
    }
}

/// 推进直到没有活动动作，返回用掉的 tick 数；超过上限时为 `None`
pub fn run_until_idle(rig: &MockRig, robot: &mut Robot, max_ticks: u32) -> Option<u32> {
    let dt = robot.config().tick.period_secs();
    for tick in 0..max_ticks {
        if robot.scheduler().is_empty() {
            return Some(tick);
        }
        rig.simulate(dt);
        robot.tick();
    }
    robot.scheduler().is_empty().then_some(max_ticks)
}
