//! compile 命令
//!
//! 编译例程并输出各段路径和被丢弃的任务

use anyhow::{Context, Result};
use clap::Args;
use reef_sdk::RobotConfig;
use reef_sdk::control::{PathLibrary, Plan, RoutineSpec};
use std::path::{Path, PathBuf};

/// 编译命令参数
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// 例程文件（JSON）
    pub routine: PathBuf,

    /// 以 JSON 输出计划摘要
    #[arg(long)]
    pub json: bool,
}

impl CompileCommand {
    pub fn execute(&self, config: &RobotConfig) -> Result<()> {
        let plan = compile_routine(&self.routine, config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan.summary())?);
            return Ok(());
        }

        println!("📋 Plan: {}", plan.name());
        println!("  start: {:?}, human player: {}", plan.start(), plan.human_player().name());
        for leg in plan.legs() {
            println!("  [{}] {} via {}", leg.index, leg.task, leg.paths.join(" → "));
        }
        if !plan.dropped().is_empty() {
            println!();
            println!("⚠️  Dropped tasks:");
            for dropped in plan.dropped() {
                println!("  [{}] {}: {}", dropped.index, dropped.task, dropped.reason);
            }
        }
        if plan.is_empty() {
            println!("  (empty plan)");
        }
        Ok(())
    }
}

/// 加载并编译例程（路径库取自配置中登记的路径）
pub fn compile_routine(path: &Path, config: &RobotConfig) -> Result<Plan> {
    let routine = RoutineSpec::load(path)
        .with_context(|| format!("Failed to load routine {}", path.display()))?;
    let mut library = PathLibrary::from_entries(&config.auto.paths);
    Ok(routine.compile(config, &mut library))
}
