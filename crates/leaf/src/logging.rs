//! Tracing subscriber setup for hosts that embed the tracker.

/// Environment variable read for the log filter (e.g. `LEAF_LOG=leaf_timer=debug`).
pub const LOG_ENV: &str = "LEAF_LOG";

/// Install a global `fmt` subscriber.
///
/// `LEAF_LOG` takes precedence; otherwise the level is `debug` when `verbose`
/// and `warn` when not.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
