//! 控制层错误类型定义

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    /// 例程文件读取失败
    #[error("Failed to read routine {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 例程 JSON 解析或序列化失败
    #[error("Invalid routine {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// 注册表中不存在该计划
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_error_display() {
        let err = ControlError::UnknownPlan("two_piece".to_string());
        assert_eq!(format!("{}", err), "Unknown plan: two_piece");

        let err = ControlError::Io {
            path: PathBuf::from("autos/missing.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("autos/missing.json") && msg.contains("no such file"));
    }
}
