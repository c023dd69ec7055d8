//! # Reef CLI
//!
//! 机器人上层结构的命令行工具。
//!
//! ```bash
//! # 导出默认配置 / 校验配置文件
//! reef-cli config dump > robot.toml
//! reef-cli config check robot.toml
//!
//! # 编译自动阶段例程，查看路径与被丢弃的任务
//! reef-cli --config robot.toml compile autos/two_coral.json
//!
//! # 在仿真硬件上以 50 Hz 运行例程（Ctrl+C 急停）
//! reef-cli --config robot.toml run autos/two_coral.json --hz 50
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{CompileCommand, ConfigCommand, RunCommand};

/// Reef CLI - 上层结构命令行工具
#[derive(Parser, Debug)]
#[command(name = "reef-cli")]
#[command(about = "Command-line interface for the reef robot superstructure", long_about = None)]
#[command(version)]
struct Cli {
    /// 机器人配置文件（默认读取用户配置目录下的 reef/robot.toml，不存在时使用内置默认值）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 编译自动阶段例程
    Compile {
        #[command(flatten)]
        args: CompileCommand,
    },

    /// 在仿真硬件上运行例程
    Run {
        #[command(flatten)]
        args: RunCommand,
    },
}

fn main() -> Result<()> {
    reef_sdk::init_logger_with("reef_cli=info,info");

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&config),
        Commands::Compile { args } => args.execute(&config),
        Commands::Run { args } => args.execute(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::parse_from([
            "reef-cli",
            "run",
            "autos/two_coral.json",
            "--hz",
            "100",
            "--may-place-after",
            "250",
            "--config",
            "robot.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("robot.toml")));
        match cli.command {
            Commands::Run { args } => {
                assert_eq!(args.routine, PathBuf::from("autos/two_coral.json"));
                assert_eq!(args.hz, Some(100));
                assert_eq!(args.may_place_after, 250);
                assert_eq!(args.max_ticks, 15_000);
                assert!(!args.fast);
            },
            other => panic!("unexpected command {other:?}"),
        }
    }
}
