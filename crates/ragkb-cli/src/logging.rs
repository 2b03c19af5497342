//! Log subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when `RUST_LOG` is not set
pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}

/// Install a stderr subscriber filtered by `RUST_LOG`, or by `--verbose` when unset
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();

    if initialized.is_ok() {
        tracing::debug!(verbose, "Logging initialized");
    }
}
