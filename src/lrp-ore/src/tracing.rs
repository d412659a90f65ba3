//! Logging bootstrap, in the shape of `mz_ore::tracing::configure`.
//!
//! The bridge's configuration document carries a single `log_level` knob
//! (`debug | info | error | fatal`, per the specification); this module maps
//! that onto a `tracing_subscriber::EnvFilter` and installs a global
//! subscriber once per process.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// The four log levels the bridge's configuration document recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Error,
    /// Only fatal errors are logged; mapped onto `tracing`'s `ERROR` level,
    /// as `tracing` has no lower severity than `ERROR`.
    Fatal,
}

impl LogLevel {
    fn as_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

/// Installs a process-global `tracing` subscriber that writes structured
/// JSON logs to stderr, filtered at `level` by default but still
/// overridable via the standard `RUST_LOG` environment variable.
///
/// Must be called at most once per process; call from each binary's `main`
/// before any other component is constructed.
pub fn configure(service_name: &str, level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::from_str(level.as_filter_directive()).unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_target(true)
        .init();

    tracing::info!(service = service_name, "logging configured");
}
