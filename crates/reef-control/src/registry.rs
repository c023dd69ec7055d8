//! 命名计划注册表
//!
//! 比赛控制前端按名称选择自动阶段计划。注册表在赛前编译好全部例程，
//! 运行时只需按名称取出根动作交给 [`reef_client::Robot::run_autonomous`]。

use crate::error::ControlError;
use crate::path_library::PathLibrary;
use crate::plan::Plan;
use crate::routine::RoutineSpec;
use reef_client::Action;
use reef_tools::RobotConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// 名称到计划的映射
#[derive(Debug, Clone, Default)]
pub struct PlanRegistry {
    plans: BTreeMap<String, Plan>,
}

impl PlanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册计划（同名计划被替换并返回）
    pub fn register(&mut self, plan: Plan) -> Option<Plan> {
        let name = plan.name().to_string();
        let previous = self.plans.insert(name.clone(), plan);
        if previous.is_some() {
            warn!("Plan {} replaced", name);
        } else {
            info!("Plan {} registered", name);
        }
        previous
    }

    /// 编译并注册例程
    pub fn register_routine(
        &mut self,
        routine: &RoutineSpec,
        config: &RobotConfig,
        library: &mut PathLibrary,
    ) -> &Plan {
        let plan = routine.compile(config, library);
        let name = plan.name().to_string();
        self.register(plan);
        &self.plans[&name]
    }

    /// 加载目录下全部 `*.json` 例程，返回注册数量
    pub fn load_dir<P: AsRef<Path>>(
        &mut self,
        dir: P,
        config: &RobotConfig,
        library: &mut PathLibrary,
    ) -> Result<usize, ControlError> {
        let dir = dir.as_ref();
        let io_error = |source| ControlError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        for path in &files {
            let routine = RoutineSpec::load(path)?;
            self.register_routine(&routine, config, library);
        }
        Ok(files.len())
    }

    pub fn get(&self, name: &str) -> Option<&Plan> {
        self.plans.get(name)
    }

    /// 取出计划的根动作
    pub fn action(&self, name: &str) -> Result<Action, ControlError> {
        self.plans
            .get(name)
            .map(Plan::to_action)
            .ok_or_else(|| ControlError::UnknownPlan(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<Plan> {
        self.plans.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plans.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.plans.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
