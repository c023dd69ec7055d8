//! 自动阶段例程文件
//!
//! 例程是一份 JSON：名称、起点、人类玩家站和有序任务列表。
//!
//! ```json
//! {
//!   "name": "two_coral",
//!   "start": "S1",
//!   "human_player": "HP2",
//!   "tasks": [
//!     { "type": "ScoreCoral", "position": "A", "level": "L4" },
//!     { "type": "ScoreAlgae", "position": "GH", "level": "L2", "target": "Net" }
//!   ]
//! }
//! ```

use crate::compiler::TaskCompiler;
use crate::error::ControlError;
use crate::path_library::PathLibrary;
use crate::plan::Plan;
use reef_tools::{AutoTask, HumanPlayerPosition, RobotConfig, StartPosition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 例程描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineSpec {
    pub name: String,
    pub start: StartPosition,
    pub human_player: HumanPlayerPosition,
    #[serde(default)]
    pub tasks: Vec<AutoTask>,
}

impl RoutineSpec {
    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ControlError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ControlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ControlError::Json {
            origin: path.display().to_string(),
            source,
        })
    }

    /// 从 JSON 字符串解析
    pub fn from_json_str(content: &str) -> Result<Self, ControlError> {
        serde_json::from_str(content).map_err(|source| ControlError::Json {
            origin: "<string>".to_string(),
            source,
        })
    }

    pub fn to_json_string(&self) -> Result<String, ControlError> {
        serde_json::to_string_pretty(self).map_err(|source| ControlError::Json {
            origin: self.name.clone(),
            source,
        })
    }

    /// 编译为计划
    pub fn compile(&self, config: &RobotConfig, library: &mut PathLibrary) -> Plan {
        TaskCompiler::new(config, library).compile(
            &self.name,
            self.start,
            self.human_player,
            &self.tasks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reef_tools::{AlgaeLevel, AlgaePosition, AlgaeScoreTarget, CoralLevel, CoralPosition};
    use std::io::Write;

    const TWO_PIECE: &str = r#"{
        "name": "two_piece",
        "start": "S1",
        "human_player": "HP2",
        "tasks": [
            { "type": "ScoreCoral", "position": "A", "level": "L4" },
            { "type": "ScoreCoral", "level": "L2" },
            { "type": "ScoreAlgae", "position": "GH", "level": "L2", "target": "Net" }
        ]
    }"#;

    #[test]
    fn test_parse_routine() {
        let routine = RoutineSpec::from_json_str(TWO_PIECE).unwrap();
        assert_eq!(routine.name, "two_piece");
        assert_eq!(routine.start, StartPosition::S1);
        assert_eq!(routine.human_player, HumanPlayerPosition::Hp2);
        assert_eq!(
            routine.tasks,
            vec![
                AutoTask::ScoreCoral {
                    position: Some(CoralPosition::A),
                    level: CoralLevel::L4,
                },
                AutoTask::ScoreCoral {
                    position: None,
                    level: CoralLevel::L2,
                },
                AutoTask::ScoreAlgae {
                    position: Some(AlgaePosition::Gh),
                    level: AlgaeLevel::L2,
                    target: AlgaeScoreTarget::Net,
                },
            ]
        );
    }

    #[test]
    fn test_round_trip_through_file() {
        let routine = RoutineSpec::from_json_str(TWO_PIECE).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(routine.to_json_string().unwrap().as_bytes()).unwrap();

        let loaded = RoutineSpec::load(file.path()).unwrap();
        assert_eq!(loaded, routine);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            RoutineSpec::load(&missing),
            Err(ControlError::Io { .. })
        ));

        let err = RoutineSpec::from_json_str(r#"{ "name": "bad", "start": "S9" }"#).unwrap_err();
        assert!(matches!(err, ControlError::Json { .. }));
    }

    #[test]
    fn test_compile_routine() {
        let routine = RoutineSpec::from_json_str(TWO_PIECE).unwrap();
        let mut library = PathLibrary::new();
        for name in ["S1-HP2", "HP2-A", "A-GH", "GH-Net"] {
            library.insert(name);
        }
        let plan = routine.compile(&RobotConfig::default(), &mut library);
        assert_eq!(plan.name(), "two_piece");
        assert_eq!(plan.legs().len(), 2);
        assert_eq!(plan.dropped().len(), 1);
        assert_eq!(plan.path_names(), vec!["S1-HP2", "HP2-A", "A-GH", "GH-Net"]);
    }
}
