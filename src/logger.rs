use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 优先使用 RUST_LOG 环境变量，否则按 `-v` 的次数决定级别:
/// - 0: info
/// - 1: debug
/// - 2+: trace
///
/// 示例:
/// - reqsuite collection.yaml -vv
/// - RUST_LOG=reqsuite::expander=debug reqsuite collection.yaml
pub fn init_logger(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
