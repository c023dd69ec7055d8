//! run 命令
//!
//! 在仿真硬件上以固定周期运行例程。Ctrl+C 触发急停。

use anyhow::{Context, Result, bail};
use clap::Args;
use reef_sdk::client::CompletionReport;
use reef_sdk::driver::mock::MockRig;
use reef_sdk::{Robot, RobotConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::compile::compile_routine;

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 例程文件（JSON）
    pub routine: PathBuf,

    /// tick 频率（Hz），覆盖配置中的周期
    #[arg(long)]
    pub hz: Option<u32>,

    /// 最多运行的 tick 数
    #[arg(long, default_value_t = 15_000)]
    pub max_ticks: u64,

    /// 第几个 tick 起允许放置（默认立即允许）
    #[arg(long, default_value_t = 0)]
    pub may_place_after: u64,

    /// 仿真供件延迟（秒）
    #[arg(long, default_value_t = 0.2)]
    pub feed_delay: f64,

    /// 不按真实时间节拍，尽快跑完
    #[arg(long)]
    pub fast: bool,
}

impl RunCommand {
    pub fn execute(&self, mut config: RobotConfig) -> Result<()> {
        if let Some(hz) = self.hz {
            if hz == 0 {
                bail!("--hz must be positive");
            }
            config.tick.period_ms = (1000 / u64::from(hz)).max(1);
        }
        let period = Duration::from_millis(config.tick.period_ms);
        let dt = config.tick.period_secs();

        let plan = compile_routine(&self.routine, &config)?;
        for dropped in plan.dropped() {
            println!("⚠️  Dropped [{}] {}: {}", dropped.index, dropped.task, dropped.reason);
        }

        let rig = MockRig::new().with_paths(&config.auto.paths, &config.tick);
        rig.grabber.enable_auto_feed(self.feed_delay);
        let mut robot = Robot::new(rig.hardware(), config).context("Invalid config")?;

        let estop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&estop);
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Emergency stop...");
            flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to set signal handler")?;

        println!("🚀 Running {} ({} legs, {:?} per tick)", plan.name(), plan.legs().len(), period);
        let id = robot.run_autonomous(plan.to_action())?;
        robot.set_may_place(self.may_place_after == 0);

        let started = Instant::now();
        let mut next_tick = Instant::now();
        let mut ticks = 0;
        while robot.is_active(id) && ticks < self.max_ticks {
            if estop.load(Ordering::SeqCst) {
                robot.emergency_stop();
                break;
            }
            if ticks == self.may_place_after {
                robot.set_may_place(true);
            }

            rig.simulate(dt);
            if let Some(snapshot) = robot.tick() {
                info!("tick {}: {:?}", ticks, snapshot);
            }
            ticks += 1;

            if !self.fast {
                next_tick += period;
                let now = Instant::now();
                if next_tick > now {
                    spin_sleep::sleep(next_tick - now);
                } else {
                    warn!("Tick overrun by {:?}", now - next_tick);
                    next_tick = now;
                }
            }
        }

        if robot.is_active(id) {
            warn!("Tick limit reached, cancelling {}", plan.name());
            robot.cancel(id);
        }

        println!();
        println!("📊 Result after {} ticks ({:.2} s wall clock):", ticks, started.elapsed().as_secs_f64());
        print_reports(&robot.take_completions());
        println!("  paths followed: {}", rig.paths.followed().join(", "));
        let snapshot = robot.snapshot();
        println!(
            "  state: {:?}, control: {}, holding: {}",
            snapshot.robot_state, snapshot.control_mode, snapshot.game_piece_held
        );
        Ok(())
    }
}

fn print_reports(reports: &[CompletionReport]) {
    for report in reports {
        let marker = if report.is_abnormal() { "⚠️ " } else { "✅" };
        println!(
            "  {} {} {} ({}): {:?}",
            marker, report.name, report.id, report.kind, report.outcome
        );
    }
}
