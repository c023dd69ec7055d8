//! 状态快照
//!
//! 每个 tick 末尾由运行时生成；与上一次发布的快照不同时记录日志，
//! 外部（仪表盘、CLI）通过 `serde` 序列化读取。

use super::machine::{ClimbStatus, ControlMode, DriveMode, ManipulatorPhase, RobotState};
use crate::classifier::{CoralDetectionState, GrabType};
use serde::{Deserialize, Serialize};

/// 上层结构状态快照（只读）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperstructureSnapshot {
    pub robot_state: RobotState,
    pub control_mode: ControlMode,
    pub drive_mode: DriveMode,
    pub game_piece_held: bool,
    pub held_piece: GrabType,
    pub coral_detection: CoralDetectionState,
    pub target_grab_type: GrabType,
    pub phase: ManipulatorPhase,
    pub climb_status: ClimbStatus,
}
