//! Tracing initialization.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Filter variable checked before `RUST_LOG`.
const LOG_ENV: &str = "HARNESS_LOG";

/// Install a stderr subscriber. Reports go to stdout, so logs never mix
/// into them.
pub fn init() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
}
