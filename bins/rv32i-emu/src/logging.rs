//! Process-wide `tracing` initialization.

/// Initialize the subscriber once at process start. `force_trace`
/// overrides `RUST_LOG` with the `trace` filter; otherwise the
/// `info`-default `EnvFilter` convention applies.
pub fn init_logger(force_trace: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if force_trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt::fmt().with_env_filter(filter).with_target(false).init();
}
