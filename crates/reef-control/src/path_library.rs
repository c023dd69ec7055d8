//! 路径库
//!
//! 记录已知的命名路径及其进度触发器。路径名称由起点和终点名称以 `-` 拼接
//! （见 [`reef_tools::path_name`]）。路径不存在是合法的、非致命的情况：
//! 编译器据此丢弃对应任务。
//!
//! 触发器挂在路径上而不是任务上：同一条得分路径被多个例程复用时，
//! 第一次编译挂上的触发器会被后续编译直接沿用。

use reef_client::ProgressTrigger;
use reef_driver::PathFollower;
use reef_tools::{
    AlgaePosition, AlgaeScoreTarget, CoralPosition, FieldPosition, HumanPlayerPosition, PathEntry,
    StartPosition, path_name,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 命名路径库
#[derive(Debug, Clone, Default)]
pub struct PathLibrary {
    paths: BTreeMap<String, Vec<ProgressTrigger>>,
}

impl PathLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由配置中登记的路径构建
    pub fn from_entries(entries: &[PathEntry]) -> Self {
        let mut library = Self::new();
        for entry in entries {
            if !library.insert(entry.name.clone()) {
                warn!("Path {} registered twice", entry.name);
            }
        }
        library
    }

    /// 向路径跟随服务探测所有场地位置两两组合的路径
    pub fn discover(follower: &dyn PathFollower) -> Self {
        let mut library = Self::new();
        for from in all_positions() {
            for to in all_positions() {
                if from == to {
                    continue;
                }
                let name = path_name(from, to);
                if follower.has_path(&name) {
                    library.insert(name);
                }
            }
        }
        debug!("Discovered {} paths", library.len());
        library
    }

    /// 登记路径，返回是否为新路径
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.paths.contains_key(&name) {
            return false;
        }
        self.paths.insert(name, Vec::new());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// 路径上的触发器；路径不存在时为 `None`
    pub fn triggers(&self, name: &str) -> Option<&[ProgressTrigger]> {
        self.paths.get(name).map(Vec::as_slice)
    }

    /// 路径是否已挂有触发器
    pub fn has_triggers(&self, name: &str) -> bool {
        self.paths.get(name).is_some_and(|t| !t.is_empty())
    }

    /// 向路径追加触发器，路径不存在时返回 `false`
    pub fn attach_triggers(
        &mut self,
        name: &str,
        triggers: impl IntoIterator<Item = ProgressTrigger>,
    ) -> bool {
        let Some(existing) = self.paths.get_mut(name) else {
            return false;
        };
        for trigger in triggers {
            debug!(
                "{}: attached trigger '{}' at {:.2}",
                name,
                trigger.name(),
                trigger.fraction()
            );
            existing.push(trigger);
        }
        true
    }

    /// 清除路径上的全部触发器
    pub fn clear_triggers(&mut self, name: &str) {
        if let Some(triggers) = self.paths.get_mut(name) {
            triggers.clear();
        }
    }

    /// 按名称排序的全部路径
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.paths.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn all_positions() -> impl Iterator<Item = FieldPosition> {
    StartPosition::ALL
        .into_iter()
        .map(FieldPosition::from)
        .chain(HumanPlayerPosition::ALL.into_iter().map(FieldPosition::from))
        .chain(CoralPosition::ALL.into_iter().map(FieldPosition::from))
        .chain(AlgaePosition::ALL.into_iter().map(FieldPosition::from))
        .chain(AlgaeScoreTarget::ALL.into_iter().map(FieldPosition::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reef_client::{Action, WaitTicks};
    use reef_driver::mock::MockPathFollower;

    #[test]
    fn test_from_entries_and_lookup() {
        let library = PathLibrary::from_entries(&[
            PathEntry {
                name: "S1-HP2".to_string(),
                duration_s: 2.0,
            },
            PathEntry {
                name: "HP2-A".to_string(),
                duration_s: 3.0,
            },
            PathEntry {
                name: "S1-HP2".to_string(),
                duration_s: 2.5,
            },
        ]);
        assert_eq!(library.len(), 2);
        assert!(library.contains("HP2-A"));
        assert!(!library.contains("A-HP2"));
        assert_eq!(library.triggers("S1-HP2").map(<[_]>::len), Some(0));
        assert!(library.triggers("S3-HP1").is_none());
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["HP2-A", "S1-HP2"]);
    }

    #[test]
    fn test_attach_triggers_requires_known_path() {
        let mut library = PathLibrary::new();
        library.insert("HP1-C");
        let trigger = ProgressTrigger::new("wait", 0.5, Action::from(WaitTicks::new(3)));

        assert!(!library.attach_triggers("HP1-D", [trigger.clone()]));
        assert!(library.attach_triggers("HP1-C", [trigger]));
        assert!(library.has_triggers("HP1-C"));
        assert!(!library.has_triggers("HP1-D"));

        library.clear_triggers("HP1-C");
        assert!(!library.has_triggers("HP1-C"));
    }

    #[test]
    fn test_discover_probes_field_position_pairs() {
        let follower = MockPathFollower::new()
            .with_path("S2-HP1", 10)
            .with_path("HP1-K", 10)
            .with_path("GH-Net", 10)
            .with_path("not-a-field-path", 10);
        let library = PathLibrary::discover(&follower);
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["GH-Net", "HP1-K", "S2-HP1"]);
    }
}
