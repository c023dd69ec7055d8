//! Mock 执行器
//!
//! 一阶仿真：位置模式按最大速率逼近目标，速度模式按占空比积分。
//! 句柄可克隆，克隆体共享同一份状态，测试代码可以在把执行器交给 `Hardware`
//! 之后继续观察和修改它。

use crate::actuator::{Actuator, ChassisSpeeds, DriveBase, Grabber, PieceSensors, Setpoint};
use parking_lot::Mutex;
use std::sync::Arc;

/// 顶住限位时的堵转电流（A）
pub const STALL_CURRENT: f64 = 40.0;
/// 运动时的电流（A）
const MOVING_CURRENT: f64 = 5.0;
/// 空闲电流（A）
const IDLE_CURRENT: f64 = 0.5;
/// 自动供件：超过该占空比才算吸入或吐出
const FEED_DUTY: f64 = 0.3;

/// 模拟执行器状态
#[derive(Debug, Clone)]
pub struct MockActuatorState {
    pub position: f64,
    pub velocity: f64,
    pub current: f64,
    pub setpoint: Option<Setpoint>,
    /// 最大速率（单位 / 秒）
    pub max_rate: f64,
    pub lower_limit: f64,
    pub upper_limit: f64,
    /// 所有下发过的设定值（按顺序）
    pub history: Vec<Setpoint>,
    pub stop_count: u32,
    pub zero_count: u32,
}

/// 模拟执行器
#[derive(Debug, Clone)]
pub struct MockActuator {
    inner: Arc<Mutex<MockActuatorState>>,
}

impl MockActuator {
    /// 创建新的模拟执行器
    pub fn new(position: f64, max_rate: f64, lower_limit: f64, upper_limit: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockActuatorState {
                position,
                velocity: 0.0,
                current: IDLE_CURRENT,
                setpoint: None,
                max_rate,
                lower_limit,
                upper_limit,
                history: Vec::new(),
                stop_count: 0,
                zero_count: 0,
            })),
        }
    }

    /// 状态快照
    pub fn snapshot(&self) -> MockActuatorState {
        self.inner.lock().clone()
    }

    pub fn setpoint(&self) -> Option<Setpoint> {
        self.inner.lock().setpoint
    }

    pub fn history(&self) -> Vec<Setpoint> {
        self.inner.lock().history.clone()
    }

    pub fn clear_history(&self) {
        self.inner.lock().history.clear();
    }

    pub fn set_position(&self, position: f64) {
        self.inner.lock().position = position;
    }

    pub fn stop_count(&self) -> u32 {
        self.inner.lock().stop_count
    }

    pub fn zero_count(&self) -> u32 {
        self.inner.lock().zero_count
    }

    /// 推进仿真 `dt` 秒
    pub fn simulate(&self, dt: f64) {
        let mut s = self.inner.lock();
        let before = s.position;
        let mut pressing_limit = false;

        match s.setpoint {
            Some(Setpoint::Position(target)) => {
                let max_step = s.max_rate * dt;
                let delta = (target - s.position).clamp(-max_step, max_step);
                s.position = (s.position + delta).clamp(s.lower_limit, s.upper_limit);
            },
            Some(Setpoint::Speed(duty)) => {
                let next = s.position + duty * s.max_rate * dt;
                pressing_limit =
                    (duty < 0.0 && next <= s.lower_limit) || (duty > 0.0 && next >= s.upper_limit);
                s.position = next.clamp(s.lower_limit, s.upper_limit);
            },
            None => {},
        }

        s.velocity = if dt > 0.0 {
            (s.position - before) / dt
        } else {
            0.0
        };
        s.current = if pressing_limit {
            STALL_CURRENT
        } else if s.velocity.abs() > f64::EPSILON {
            MOVING_CURRENT
        } else {
            IDLE_CURRENT
        };
    }
}

impl Actuator for MockActuator {
    fn set_target(&mut self, setpoint: Setpoint) {
        let mut s = self.inner.lock();
        s.setpoint = Some(setpoint);
        s.history.push(setpoint);
    }

    fn position(&self) -> f64 {
        self.inner.lock().position
    }

    fn velocity(&self) -> f64 {
        self.inner.lock().velocity
    }

    fn current(&self) -> f64 {
        self.inner.lock().current
    }

    fn stop(&mut self) {
        let mut s = self.inner.lock();
        s.setpoint = None;
        s.velocity = 0.0;
        s.stop_count += 1;
    }

    fn zero_position(&mut self) {
        let mut s = self.inner.lock();
        s.upper_limit -= s.position;
        s.lower_limit -= s.position;
        s.position = 0.0;
        s.zero_count += 1;
    }
}

#[derive(Debug, Default)]
struct Feed {
    /// 吸入多久后游戏件到位（秒）；`None` 表示关闭自动供件
    delay_s: Option<f64>,
    elapsed: f64,
    /// 把上一个游戏件送出时的占空比；滚轮保持该占空比期间不再供件
    spent_duty: Option<f64>,
}

/// 模拟夹爪：滚轮 + 传感器
///
/// 开启自动供件后，传感器随滚轮方向变化：
/// - 空夹爪正转：`delay` 后珊瑚前端到位，继续正转 `delay / 2` 后后端到位（居中）
/// - 空夹爪大幅反转：`delay` 后藻类到位
/// - 持有珊瑚时大幅反转、持有藻类时大幅正转：`delay / 2` 后游戏件离开
#[derive(Debug, Clone)]
pub struct MockGrabber {
    roller: MockActuator,
    sensors: Arc<Mutex<PieceSensors>>,
    feed: Arc<Mutex<Feed>>,
}

impl MockGrabber {
    pub fn new() -> Self {
        Self {
            roller: MockActuator::new(0.0, 1.0, f64::MIN, f64::MAX),
            sensors: Arc::new(Mutex::new(PieceSensors::default())),
            feed: Arc::new(Mutex::new(Feed::default())),
        }
    }

    /// 开启自动供件
    pub fn enable_auto_feed(&self, delay_s: f64) {
        let mut feed = self.feed.lock();
        feed.delay_s = Some(delay_s.max(0.0));
        feed.elapsed = 0.0;
        feed.spent_duty = None;
    }

    pub fn set_sensors(&self, front: bool, back: bool, algae: bool) {
        *self.sensors.lock() = PieceSensors { front, back, algae };
    }

    pub fn setpoint(&self) -> Option<Setpoint> {
        self.roller.setpoint()
    }

    pub fn history(&self) -> Vec<Setpoint> {
        self.roller.history()
    }

    pub fn clear_history(&self) {
        self.roller.clear_history();
    }

    pub fn stop_count(&self) -> u32 {
        self.roller.stop_count()
    }

    /// 当前滚轮占空比（未设定或被停止时为 0）
    pub fn speed(&self) -> f64 {
        match self.roller.setpoint() {
            Some(Setpoint::Speed(duty)) => duty,
            _ => 0.0,
        }
    }

    pub fn simulate(&self, dt: f64) {
        self.roller.simulate(dt);
        self.feed_pieces(dt);
    }

    fn feed_pieces(&self, dt: f64) {
        let mut feed = self.feed.lock();
        let Some(delay) = feed.delay_s else {
            return;
        };
        let duty = self.speed();
        match feed.spent_duty {
            Some(spent) if spent == duty => {
                feed.elapsed = 0.0;
                return;
            },
            Some(_) => feed.spent_duty = None,
            None => {},
        }
        let mut sensors = self.sensors.lock();
        let coral = sensors.front || sensors.back;

        let (wanted, threshold) = if coral && !sensors.back && duty > 0.0 {
            // 前端到位后慢速送入即可居中
            (PieceSensors { front: true, back: true, algae: false }, delay / 2.0)
        } else if coral && duty < -FEED_DUTY || sensors.algae && duty > FEED_DUTY {
            (PieceSensors::default(), delay / 2.0)
        } else if !coral && !sensors.algae && duty > FEED_DUTY {
            (PieceSensors { front: true, back: false, algae: false }, delay)
        } else if !coral && !sensors.algae && duty < -FEED_DUTY {
            (PieceSensors { front: false, back: false, algae: true }, delay)
        } else {
            feed.elapsed = 0.0;
            return;
        };

        feed.elapsed += dt;
        if feed.elapsed >= threshold {
            if wanted == PieceSensors::default() {
                feed.spent_duty = Some(duty);
            }
            *sensors = wanted;
            feed.elapsed = 0.0;
        }
    }
}

impl Default for MockGrabber {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for MockGrabber {
    fn set_target(&mut self, setpoint: Setpoint) {
        self.roller.set_target(setpoint);
    }

    fn position(&self) -> f64 {
        self.roller.position()
    }

    fn velocity(&self) -> f64 {
        self.roller.velocity()
    }

    fn current(&self) -> f64 {
        self.roller.current()
    }

    fn stop(&mut self) {
        self.roller.stop();
    }
}

impl Grabber for MockGrabber {
    fn read_piece_sensors(&self) -> PieceSensors {
        *self.sensors.lock()
    }
}

/// 模拟底盘状态
#[derive(Debug, Clone, Default)]
pub struct MockDriveState {
    pub last: ChassisSpeeds,
    pub locked: bool,
    pub stop_count: u32,
}

/// 模拟底盘
#[derive(Debug, Clone, Default)]
pub struct MockDriveBase {
    inner: Arc<Mutex<MockDriveState>>,
}

impl MockDriveBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MockDriveState {
        self.inner.lock().clone()
    }

    pub fn stop_count(&self) -> u32 {
        self.inner.lock().stop_count
    }
}

impl DriveBase for MockDriveBase {
    fn drive(&mut self, speeds: ChassisSpeeds) {
        let mut s = self.inner.lock();
        s.last = speeds;
        s.locked = false;
    }

    fn lock(&mut self) {
        let mut s = self.inner.lock();
        s.last = ChassisSpeeds::ZERO;
        s.locked = true;
    }

    fn stop(&mut self) {
        let mut s = self.inner.lock();
        s.last = ChassisSpeeds::ZERO;
        s.stop_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_mode_slews_to_target() {
        let mut lift = MockActuator::new(0.0, 1.0, 0.0, 2.0);
        lift.set_target(Setpoint::Position(0.5));

        lift.simulate(0.2);
        assert!((lift.position() - 0.2).abs() < 1e-9);

        for _ in 0..10 {
            lift.simulate(0.2);
        }
        assert!((lift.position() - 0.5).abs() < 1e-9);
        assert_eq!(lift.velocity(), 0.0);
    }

    #[test]
    fn test_speed_mode_stalls_at_limit() {
        let mut lift = MockActuator::new(0.05, 1.0, 0.0, 2.0);
        lift.set_target(Setpoint::Speed(-0.5));

        lift.simulate(0.02);
        assert_eq!(lift.current(), MOVING_CURRENT);

        for _ in 0..10 {
            lift.simulate(0.02);
        }
        assert_eq!(lift.position(), 0.0);
        assert_eq!(lift.current(), STALL_CURRENT);
    }

    #[test]
    fn test_zero_position_shifts_limits() {
        let mut lift = MockActuator::new(0.1, 1.0, 0.1, 2.0);
        lift.zero_position();
        let s = lift.snapshot();
        assert_eq!(s.position, 0.0);
        assert!((s.upper_limit - 1.9).abs() < 1e-9);
        assert_eq!(s.zero_count, 1);
    }

    #[test]
    fn test_auto_feed_cycles_pieces() {
        let mut grabber = MockGrabber::new();
        grabber.enable_auto_feed(0.1);

        grabber.set_target(Setpoint::Speed(0.6));
        for _ in 0..6 {
            grabber.simulate(0.02);
        }
        let sensors = grabber.read_piece_sensors();
        assert!(sensors.front && !sensors.back);

        grabber.set_target(Setpoint::Speed(0.2));
        for _ in 0..3 {
            grabber.simulate(0.02);
        }
        assert!(grabber.read_piece_sensors().back);

        grabber.set_target(Setpoint::Speed(0.05));
        grabber.simulate(0.5);
        assert!(grabber.read_piece_sensors().front);

        grabber.set_target(Setpoint::Speed(-0.5));
        for _ in 0..3 {
            grabber.simulate(0.02);
        }
        assert_eq!(grabber.read_piece_sensors(), PieceSensors::default());

        grabber.set_target(Setpoint::Speed(-0.8));
        for _ in 0..6 {
            grabber.simulate(0.02);
        }
        assert!(grabber.read_piece_sensors().algae);
    }

    #[test]
    fn test_auto_feed_waits_for_new_command_after_eject() {
        let mut grabber = MockGrabber::new();
        grabber.enable_auto_feed(0.1);

        // 珊瑚吐出后滚轮继续反转，不应该被当成藻类吸入
        grabber.set_sensors(true, true, false);
        grabber.set_target(Setpoint::Speed(-0.5));
        for _ in 0..50 {
            grabber.simulate(0.02);
        }
        assert_eq!(grabber.read_piece_sensors(), PieceSensors::default());

        // 藻类射网同理
        grabber.set_sensors(false, false, true);
        grabber.set_target(Setpoint::Speed(1.0));
        for _ in 0..50 {
            grabber.simulate(0.02);
        }
        assert_eq!(grabber.read_piece_sensors(), PieceSensors::default());

        grabber.set_target(Setpoint::Speed(0.6));
        for _ in 0..6 {
            grabber.simulate(0.02);
        }
        assert!(grabber.read_piece_sensors().front);
    }

    #[test]
    fn test_shared_handle() {
        let grabber = MockGrabber::new();
        let boxed: Box<dyn Grabber> = Box::new(grabber.clone());
        grabber.set_sensors(true, false, false);
        assert!(boxed.read_piece_sensors().front);
        assert!(!boxed.read_piece_sensors().back);
    }
}
