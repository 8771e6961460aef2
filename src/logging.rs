use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化日志，级别由 RUST_LOG 控制，默认 info
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
