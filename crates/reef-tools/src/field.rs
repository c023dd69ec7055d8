//! 场地位置
//!
//! 五组互不相交的位置枚举，每个位置都有一个稳定的名称，用作路径查找键。
//! 路径名称由起点和终点名称以 `-` 拼接而成（如 `S1-HP2`、`HP2-A`）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 起始位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartPosition {
    S1,
    S2,
    S3,
}

impl StartPosition {
    pub const ALL: [StartPosition; 3] = [Self::S1, Self::S2, Self::S3];

    pub fn name(self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
        }
    }
}

/// 人类玩家站（珊瑚供给站）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HumanPlayerPosition {
    #[serde(rename = "HP1")]
    Hp1,
    #[serde(rename = "HP2")]
    Hp2,
}

impl HumanPlayerPosition {
    pub const ALL: [HumanPlayerPosition; 2] = [Self::Hp1, Self::Hp2];

    pub fn name(self) -> &'static str {
        match self {
            Self::Hp1 => "HP1",
            Self::Hp2 => "HP2",
        }
    }
}

/// 珊瑚得分分支（礁石六个面，每面左右两根）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoralPosition {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
}

impl CoralPosition {
    pub const ALL: [CoralPosition; 12] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
            Self::I => "I",
            Self::J => "J",
            Self::K => "K",
            Self::L => "L",
        }
    }
}

/// 藻类位置（礁石的六个面）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgaePosition {
    #[serde(rename = "AB")]
    Ab,
    #[serde(rename = "CD")]
    Cd,
    #[serde(rename = "EF")]
    Ef,
    #[serde(rename = "GH")]
    Gh,
    #[serde(rename = "IJ")]
    Ij,
    #[serde(rename = "KL")]
    Kl,
}

impl AlgaePosition {
    pub const ALL: [AlgaePosition; 6] = [Self::Ab, Self::Cd, Self::Ef, Self::Gh, Self::Ij, Self::Kl];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ab => "AB",
            Self::Cd => "CD",
            Self::Ef => "EF",
            Self::Gh => "GH",
            Self::Ij => "IJ",
            Self::Kl => "KL",
        }
    }
}

/// 藻类得分目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgaeScoreTarget {
    Processor,
    Net,
}

impl AlgaeScoreTarget {
    pub const ALL: [AlgaeScoreTarget; 2] = [Self::Processor, Self::Net];

    pub fn name(self) -> &'static str {
        match self {
            Self::Processor => "Processor",
            Self::Net => "Net",
        }
    }
}

/// 任意场地位置
///
/// 自动阶段编译器用它记录"上一个位置"，以便拼接下一段路径的名称。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPosition {
    Start(StartPosition),
    HumanPlayer(HumanPlayerPosition),
    Coral(CoralPosition),
    Algae(AlgaePosition),
    AlgaeScore(AlgaeScoreTarget),
}

impl FieldPosition {
    /// 稳定名称（路径查找键）
    pub fn name(self) -> &'static str {
        match self {
            Self::Start(p) => p.name(),
            Self::HumanPlayer(p) => p.name(),
            Self::Coral(p) => p.name(),
            Self::Algae(p) => p.name(),
            Self::AlgaeScore(p) => p.name(),
        }
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<StartPosition> for FieldPosition {
    fn from(p: StartPosition) -> Self {
        Self::Start(p)
    }
}

impl From<HumanPlayerPosition> for FieldPosition {
    fn from(p: HumanPlayerPosition) -> Self {
        Self::HumanPlayer(p)
    }
}

impl From<CoralPosition> for FieldPosition {
    fn from(p: CoralPosition) -> Self {
        Self::Coral(p)
    }
}

impl From<AlgaePosition> for FieldPosition {
    fn from(p: AlgaePosition) -> Self {
        Self::Algae(p)
    }
}

impl From<AlgaeScoreTarget> for FieldPosition {
    fn from(p: AlgaeScoreTarget) -> Self {
        Self::AlgaeScore(p)
    }
}

/// 拼接路径名称：`<from>-<to>`
pub fn path_name(from: impl Into<FieldPosition>, to: impl Into<FieldPosition>) -> String {
    format!("{}-{}", from.into().name(), to.into().name())
}
