//! 日志初始化
//!
//! 基于 tracing-subscriber，过滤规则读取 `RUST_LOG`

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "timed_quiz=info";
const VERBOSE_FILTER: &str = "timed_quiz=debug";

/// 初始化全局日志（程序入口调用一次），`verbose` 为 true 时默认级别为 debug
pub fn init_with(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .try_init();
}

/// 测试中使用：重复调用不会报错
pub fn try_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(true))
        .with_test_writer()
        .try_init();
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
