//! Tracing initialization and configuration.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Initializes the tracing subscriber for structured logging.
///
/// The log level can be configured via the `RUST_LOG` environment variable.
/// If not set, defaults to `info`, or `debug` when `verbose` is set.
///
/// ```bash
/// RUST_LOG=debug formscan form.pdf
/// RUST_LOG=formscan_pipeline=trace,formscan_azure=debug formscan form.pdf
/// ```
pub(super) fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let env_filter = create_env_filter(verbose)?;
    let fmt_layer = create_fmt_layer();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}

/// Creates an environment filter for tracing.
fn create_env_filter(verbose: bool) -> anyhow::Result<EnvFilter> {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))
}

/// Creates a formatted tracing layer writing to stderr.
fn create_fmt_layer() -> impl Layer<Registry> {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
}
