//! 配置管理命令

use anyhow::{Context, Result};
use clap::Subcommand;
use reef_sdk::RobotConfig;
use std::path::PathBuf;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 输出当前生效的配置（TOML）
    Dump {
        /// 写入文件而不是标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 校验配置文件
    Check {
        /// 配置文件路径
        file: PathBuf,
    },

    /// 显示默认配置文件位置
    Path,
}

impl ConfigCommand {
    pub fn execute(self, config: &RobotConfig) -> Result<()> {
        match self {
            ConfigCommand::Dump { output } => Self::dump(config, output),
            ConfigCommand::Check { file } => Self::check(file),
            ConfigCommand::Path => Self::path(),
        }
    }

    fn dump(config: &RobotConfig, output: Option<PathBuf>) -> Result<()> {
        match output {
            Some(path) => {
                config
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("✅ Config written to {}", path.display());
            },
            None => print!("{}", config.to_toml_string()?),
        }
        Ok(())
    }

    fn check(file: PathBuf) -> Result<()> {
        let config = RobotConfig::load(&file)
            .with_context(|| format!("Invalid config {}", file.display()))?;
        println!("✅ {} is valid", file.display());
        println!("  tick: {} ms", config.tick.period_ms);
        println!("  known paths: {}", config.auto.paths.len());
        Ok(())
    }

    fn path() -> Result<()> {
        match super::default_config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("(no config directory on this platform)"),
        }
        Ok(())
    }
}
