use std::time::Duration;

use crate::logging::LogFormat;

/// Port the server binds on the loopback interface unless configured.
pub const DEFAULT_PORT: u16 = 6000;

/// Host clients connect to unless configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Interval between executor pumps on the designated context.
pub const DEFAULT_TICK_MS: u64 = 16;

/// Connect and per-request deadline applied by clients.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Largest request line the server accepts, newline included.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Default log filter expression.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default log output format.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default client deadline as a [`Duration`].
pub fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}
