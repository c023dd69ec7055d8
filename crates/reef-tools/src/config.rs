//! # 机器人配置
//!
//! 所有可调参数（数据，而非行为）集中在 `RobotConfig` 中，以 TOML 文件保存。
//!
//! ```toml
//! [tick]
//! period_ms = 20
//!
//! [arm]
//! clearance_height = 0.3
//! constrained = { min = -15.0, max = 130.0 }
//! full = { min = -30.0, max = 200.0 }
//! ```
//!
//! 时长参数以秒为单位配置，运行时通过 [`TickConfig::ticks`] 换算为 tick 计数。

use crate::presets::{Pose, PresetTable};
use crate::safety::{AngleRange, ArmConstraint};
use crate::units::{Degrees, Meters};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读写失败
    #[error("Config IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML 解析失败
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 参数校验失败
    #[error("Invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Tick 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickConfig {
    /// 固定周期（毫秒）
    pub period_ms: u64,
}

impl TickConfig {
    /// 将秒数换算为 tick 数（向上取整，至少 1）
    pub fn ticks(&self, seconds: f64) -> u32 {
        let period = self.period_ms.max(1) as f64 / 1000.0;
        ((seconds / period).ceil() as u32).max(1)
    }

    /// 周期（秒）
    pub fn period_secs(&self) -> f64 {
        self.period_ms as f64 / 1000.0
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { period_ms: 20 }
    }
}

/// 升降机构配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftConfig {
    pub min_height: Meters,
    pub max_height: Meters,
    /// 到位判定容差
    pub tolerance: Meters,
    /// 归零时的开环速度（负值向下）
    pub homing_speed: f64,
    /// 归零堵转电流阈值（A）
    pub homing_current_threshold: f64,
    /// 归零超时（秒）
    pub homing_timeout_s: f64,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            min_height: Meters(0.0),
            max_height: Meters(1.45),
            tolerance: Meters(0.02),
            homing_speed: -0.15,
            homing_current_threshold: 30.0,
            homing_timeout_s: 2.0,
        }
    }
}

/// 摆臂配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmConfig {
    /// 竖直安全角度（大幅升降时使用）
    pub safe_angle: Degrees,
    /// 到位判定容差
    pub tolerance: Degrees,
    /// 阈值高度 H*
    pub clearance_height: Meters,
    /// 高度 ≤ H* 时的角度范围
    pub constrained: AngleRange,
    /// 高度 > H* 时的角度范围
    pub full: AngleRange,
    /// 爬升时的摆臂角度
    pub climb_angle: Degrees,
}

impl ArmConfig {
    /// 构造安全约束引擎
    pub fn constraint(&self) -> ArmConstraint {
        ArmConstraint {
            threshold: self.clearance_height,
            constrained: self.constrained,
            full: self.full,
        }
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            safe_angle: Degrees(90.0),
            tolerance: Degrees(2.0),
            clearance_height: Meters(0.3),
            constrained: AngleRange::new(-15.0, 130.0),
            full: AngleRange::new(-30.0, 200.0),
            climb_angle: Degrees(45.0),
        }
    }
}

/// 单一游戏件的夹爪速度（占空比，-1.0..=1.0）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceSpeeds {
    pub intake: f64,
    pub eject: f64,
    pub hold: f64,
}

/// 珊瑚居中策略速度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenteringSpeeds {
    pub fast_intake: f64,
    pub slow_intake: f64,
    pub hold: f64,
    pub slow_reverse: f64,
}

/// 夹爪配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabberConfig {
    pub coral: PieceSpeeds,
    pub algae: PieceSpeeds,
    pub centering: CenteringSpeeds,
    /// 吸入超时（秒），超时视为尽力而为的成功
    pub intake_timeout_s: f64,
    /// 弹出持续时间（秒）
    pub eject_duration_s: f64,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            coral: PieceSpeeds {
                intake: 0.6,
                eject: -0.5,
                hold: 0.05,
            },
            algae: PieceSpeeds {
                intake: -0.8,
                eject: 1.0,
                hold: -0.15,
            },
            centering: CenteringSpeeds {
                fast_intake: 0.6,
                slow_intake: 0.2,
                hold: 0.05,
                slow_reverse: -0.15,
            },
            intake_timeout_s: 3.0,
            eject_duration_s: 0.5,
        }
    }
}

/// 爬升机构配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimbConfig {
    pub extend_limit: f64,
    pub retract_limit: f64,
    pub speed: f64,
    pub tolerance: f64,
    /// 单步超时（秒）
    pub timeout_s: f64,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            extend_limit: 120.0,
            retract_limit: 0.0,
            speed: 0.8,
            tolerance: 2.0,
            timeout_s: 4.0,
        }
    }
}

/// 已知路径条目
///
/// 路径几何由外部路径跟随服务持有，这里只登记名称和（仿真用的）时长。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    pub name: String,
    pub duration_s: f64,
}

/// 自动阶段配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoConfig {
    /// 得分路径上启动吸入宏的进度
    pub intake_trigger_fraction: f64,
    /// 得分路径上启动得分宏的进度
    pub score_trigger_fraction: f64,
    /// 已知路径
    #[serde(default)]
    pub paths: Vec<PathEntry>,
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            intake_trigger_fraction: 0.1,
            score_trigger_fraction: 0.75,
            paths: Vec::new(),
        }
    }
}

/// 机器人配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub lift: LiftConfig,
    #[serde(default)]
    pub arm: ArmConfig,
    #[serde(default)]
    pub grabber: GrabberConfig,
    #[serde(default)]
    pub climb: ClimbConfig,
    #[serde(default)]
    pub presets: PresetTable,
    #[serde(default)]
    pub auto: AutoConfig,
}

impl RobotConfig {
    /// 从 TOML 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RobotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存配置到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验参数一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick.period_ms == 0 {
            return Err(invalid("tick.period_ms", "must be positive"));
        }

        let lift = &self.lift;
        if lift.min_height.value().is_nan() || lift.min_height >= lift.max_height {
            return Err(invalid(
                "lift",
                format!("min_height {} must be below max_height {}", lift.min_height, lift.max_height),
            ));
        }
        if lift.tolerance <= Meters::ZERO {
            return Err(invalid("lift.tolerance", "must be positive"));
        }

        self.arm.constraint().validate()?;
        if self.arm.tolerance <= Degrees::ZERO {
            return Err(invalid("arm.tolerance", "must be positive"));
        }

        for (name, pose) in self.presets.iter_configured() {
            check_pose(name, pose, lift)?;
        }

        let auto = &self.auto;
        let in_unit = |f: f64| (0.0..=1.0).contains(&f);
        if !in_unit(auto.intake_trigger_fraction) || !in_unit(auto.score_trigger_fraction) {
            return Err(invalid("auto", "trigger fractions must lie in [0, 1]"));
        }
        if auto.intake_trigger_fraction >= auto.score_trigger_fraction {
            return Err(invalid(
                "auto",
                "intake_trigger_fraction must precede score_trigger_fraction",
            ));
        }
        if let Some(entry) = auto.paths.iter().find(|p| p.duration_s.is_nan() || p.duration_s <= 0.0) {
            return Err(invalid(
                "auto.paths",
                format!("path `{}` needs a positive duration", entry.name),
            ));
        }

        Ok(())
    }
}

fn check_pose(name: &'static str, pose: Pose, lift: &LiftConfig) -> Result<(), ConfigError> {
    if pose.height < lift.min_height || pose.height > lift.max_height {
        return Err(ConfigError::Invalid {
            field: "presets",
            reason: format!("`{}` height {} outside lift travel", name, pose.height),
        });
    }
    Ok(())
}
