//! Mock 路径跟随器
//!
//! 每条路径登记一个以 tick 计的时长；`advance()` 推进当前路径一个 tick。
//! 同一时刻只有一条路径在跑：新的 `follow()` 会替换旧的。

use crate::error::DriverError;
use crate::path::{PathFollower, PathHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Run {
    name: String,
    elapsed: u32,
    total: u32,
    cancelled: bool,
}

#[derive(Debug, Default)]
struct State {
    durations: HashMap<String, u32>,
    runs: HashMap<u64, Run>,
    active: Option<u64>,
    next_id: u64,
    followed: Vec<String>,
    cancelled: Vec<String>,
}

/// 模拟路径跟随器
#[derive(Debug, Clone, Default)]
pub struct MockPathFollower {
    inner: Arc<Mutex<State>>,
}

impl MockPathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条路径（时长至少 1 tick）
    pub fn add_path(&self, name: impl Into<String>, ticks: u32) {
        self.inner.lock().durations.insert(name.into(), ticks.max(1));
    }

    pub fn with_path(self, name: impl Into<String>, ticks: u32) -> Self {
        self.add_path(name, ticks);
        self
    }

    /// 推进当前路径一个 tick
    pub fn advance(&self) {
        let mut s = self.inner.lock();
        if let Some(id) = s.active {
            if let Some(run) = s.runs.get_mut(&id) {
                if !run.cancelled && run.elapsed < run.total {
                    run.elapsed += 1;
                }
            }
        }
    }

    /// 按顺序记录的已开始路径
    pub fn followed(&self) -> Vec<String> {
        self.inner.lock().followed.clone()
    }

    /// 按顺序记录的被取消路径
    pub fn cancelled(&self) -> Vec<String> {
        self.inner.lock().cancelled.clone()
    }

    /// 当前正在跟随的路径名称
    pub fn active_path(&self) -> Option<String> {
        let s = self.inner.lock();
        s.active
            .and_then(|id| s.runs.get(&id))
            .filter(|run| !run.cancelled && run.elapsed < run.total)
            .map(|run| run.name.clone())
    }
}

impl PathFollower for MockPathFollower {
    fn has_path(&self, name: &str) -> bool {
        self.inner.lock().durations.contains_key(name)
    }

    fn follow(&mut self, name: &str) -> Result<PathHandle, DriverError> {
        let mut s = self.inner.lock();
        let total = *s
            .durations
            .get(name)
            .ok_or_else(|| DriverError::UnknownPath(name.to_string()))?;

        let id = s.next_id;
        s.next_id += 1;
        s.runs.insert(
            id,
            Run {
                name: name.to_string(),
                elapsed: 0,
                total,
                cancelled: false,
            },
        );
        s.active = Some(id);
        s.followed.push(name.to_string());
        Ok(PathHandle(id))
    }

    fn progress(&self, handle: PathHandle) -> f64 {
        self.inner
            .lock()
            .runs
            .get(&handle.0)
            .map(|run| run.elapsed as f64 / run.total as f64)
            .unwrap_or(0.0)
    }

    fn is_finished(&self, handle: PathHandle) -> bool {
        self.inner
            .lock()
            .runs
            .get(&handle.0)
            .is_some_and(|run| !run.cancelled && run.elapsed >= run.total)
    }

    fn cancel(&mut self, handle: PathHandle) {
        let mut s = self.inner.lock();
        if let Some(run) = s.runs.get_mut(&handle.0) {
            if !run.cancelled && run.elapsed < run.total {
                run.cancelled = true;
                let name = run.name.clone();
                s.cancelled.push(name);
            }
        }
    }
}
