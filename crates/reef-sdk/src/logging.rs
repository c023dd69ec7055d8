//! 日志初始化
//!
//! 库 crate 只通过 `tracing` 宏记录日志，由可执行程序或测试在入口处安装订阅器。
//! 日志写到 stderr，stdout 留给命令输出（例如 JSON）。
//!
//! `tracing-subscriber` 关闭了默认的 `tracing-log` 特性，`log` 记录由这里显式桥接。

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 默认过滤指令
pub const DEFAULT_FILTER: &str = "info";

/// 安装全局日志订阅器
///
/// `RUST_LOG` 优先，未设置时使用 [`DEFAULT_FILTER`]。`log` crate 的记录被桥接到 `tracing`。
/// 重复调用是无操作。
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

/// 以指定的默认过滤指令安装订阅器（`RUST_LOG` 仍然优先）
pub fn init_logger_with(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        if installed.is_ok() {
            bridge_log();
        }
    });
}

/// 测试用订阅器：输出交给测试框架捕获
pub fn init_test_logger() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
        if installed.is_ok() {
            bridge_log();
        }
    });
}

/// 把 `log` crate 的记录转发到 `tracing`
fn bridge_log() {
    match tracing_log::LogTracer::init() {
        Ok(()) => log::debug!("log records bridged to tracing"),
        Err(e) => tracing::warn!("log bridge not installed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_noop() {
        init_test_logger();
        init_test_logger();
        init_logger();
        log::info!("log record after init");
        tracing::info!("tracing event after init");
    }
}
