//! 命令定义和实现

pub mod compile;
pub mod config;
pub mod run;

pub use compile::CompileCommand;
pub use config::ConfigCommand;
pub use run::RunCommand;

use anyhow::{Context, Result};
use reef_sdk::RobotConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// 用户配置目录下的默认配置文件
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reef").join("robot.toml"))
}

/// 加载机器人配置
///
/// 显式指定的文件必须存在；未指定时读取默认位置，不存在则使用内置默认值。
pub fn load_config(explicit: Option<&Path>) -> Result<RobotConfig> {
    if let Some(path) = explicit {
        return RobotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Using config {}", path.display());
            RobotConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        },
        _ => Ok(RobotConfig::default()),
    }
}
