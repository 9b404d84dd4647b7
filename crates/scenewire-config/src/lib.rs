//! Shared configuration for the scenewire server and its clients.
//!
//! Both sides agree on the wire endpoint through this crate: the server binds
//! a loopback port, clients connect to a host and port with a deadline. Values
//! come from command-line flags first, then `SCENEWIRE_*` environment
//! variables, then the defaults in [`defaults`].

mod defaults;
mod endpoint;
mod logging;

use std::ffi::OsString;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_PORT, DEFAULT_TICK_MS,
    DEFAULT_TIMEOUT_MS, default_log_filter, default_log_format, default_timeout,
};
pub use endpoint::{Endpoint, EndpointError};
pub use logging::{LogFormat, LogFormatParseError};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Flags or environment values failed to parse.
    #[error(transparent)]
    Cli(#[from] clap::Error),
    /// The resolved endpoint is unusable.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] EndpointError),
}

/// Server-side settings.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, PartialEq, Eq)]
#[command(name = "scenewired", about = "Serves a live scene model over loopback TCP")]
pub struct ServerConfig {
    /// Loopback TCP port to listen on (0 picks an ephemeral port).
    #[arg(long, env = "SCENEWIRE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Tracing filter expression, for example `info,scenewired::dispatch=debug`.
    #[arg(long, env = "SCENEWIRE_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Log output format.
    #[arg(long, env = "SCENEWIRE_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
    /// Milliseconds between executor pumps on the designated context.
    #[arg(
        long = "tick-ms",
        env = "SCENEWIRE_TICK_MS",
        default_value_t = DEFAULT_TICK_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_interval_ms: u64,
    /// Largest accepted request line in bytes.
    #[arg(long, env = "SCENEWIRE_MAX_REQUEST_BYTES", default_value_t = DEFAULT_MAX_REQUEST_BYTES)]
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            tick_interval_ms: DEFAULT_TICK_MS,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the program name, as with `argv`.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Endpoint the listener binds; always on the IPv4 loopback interface.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::loopback(self.port)
    }

    /// Configured tracing filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Interval between executor pumps.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Client-side settings.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, PartialEq, Eq)]
#[command(name = "scenewire", about = "Talks to a scenewire server")]
pub struct ClientConfig {
    /// Server host.
    #[arg(long, env = "SCENEWIRE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Server port.
    #[arg(long, env = "SCENEWIRE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Connect and per-request deadline in milliseconds.
    #[arg(
        long = "timeout",
        env = "SCENEWIRE_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_ms: u64,
    /// Full `tcp://host:port` endpoint; replaces `--host` and `--port`.
    #[arg(long, env = "SCENEWIRE_ENDPOINT")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            endpoint: None,
        }
    }
}

impl ClientConfig {
    /// Builds a client configuration for a specific endpoint.
    #[must_use]
    pub fn for_endpoint(endpoint: &Endpoint, timeout: Duration) -> Self {
        Self {
            host: endpoint.host().to_owned(),
            port: endpoint.port(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            endpoint: None,
        }
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// An `--endpoint` value is parsed and must name a loopback host; it
    /// then replaces `host` and `port`.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut config = Self::try_parse_from(args)?;
        if let Some(text) = config.endpoint.as_deref() {
            let endpoint = text.parse::<Endpoint>()?.require_loopback()?;
            config.host = endpoint.host().to_owned();
            config.port = endpoint.port();
        }
        Ok(config)
    }

    /// Endpoint to connect to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Connect and per-request deadline, never shorter than a millisecond.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn server_defaults_match_protocol() {
        let config = ServerConfig::default();
        assert_eq!(config.endpoint(), Endpoint::loopback(6000));
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn client_defaults_match_protocol() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint().to_string(), "tcp://127.0.0.1:6000");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn server_flags_override_defaults() {
        let config = ServerConfig::load_from_iter([
            "scenewired",
            "--port",
            "6100",
            "--log-format",
            "compact",
            "--tick-ms",
            "5",
        ])
        .expect("flags should parse");
        assert_eq!(config.port, 6100);
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.tick_interval(), Duration::from_millis(5));
    }

    #[test]
    fn zero_tick_is_rejected() {
        let result = ServerConfig::load_from_iter(["scenewired", "--tick-ms", "0"]);
        assert!(matches!(result, Err(ConfigError::Cli(_))));
    }

    #[test]
    fn client_flags_override_defaults() {
        let config = ClientConfig::load_from_iter([
            "scenewire",
            "--host",
            "localhost",
            "--port",
            "7000",
            "--timeout",
            "250",
        ])
        .expect("flags should parse");
        assert_eq!(config.endpoint(), Endpoint::new("localhost", 7000));
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn client_endpoint_replaces_host_and_port() {
        let config = ClientConfig::load_from_iter([
            "scenewire",
            "--port",
            "7000",
            "--endpoint",
            "tcp://[::1]:6100",
        ])
        .expect("endpoint should parse");
        assert_eq!(config.endpoint(), Endpoint::new("::1", 6100));
    }

    #[rstest]
    #[case("tcp://192.168.1.4:6000", "invalid endpoint: host '192.168.1.4' is not a loopback address")]
    #[case("http://127.0.0.1:6000", "invalid endpoint: unsupported endpoint scheme 'http'")]
    #[case("tcp://127.0.0.1", "invalid endpoint: missing port in 'tcp://127.0.0.1'")]
    fn unusable_client_endpoints_are_rejected(#[case] endpoint: &str, #[case] message: &str) {
        let error = ClientConfig::load_from_iter(["scenewire", "--endpoint", endpoint])
            .expect_err("endpoint should be refused");
        assert!(matches!(error, ConfigError::Endpoint(_)));
        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn zero_client_timeout_is_rejected() {
        let result = ClientConfig::load_from_iter(["scenewire", "--timeout", "0"]);
        assert!(matches!(result, Err(ConfigError::Cli(_))));
    }

    #[test]
    fn built_configs_never_yield_a_zero_timeout() {
        let config = ClientConfig::for_endpoint(&Endpoint::loopback(1), Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_millis(1));
    }

    #[test]
    fn client_config_round_trips_endpoint() {
        let endpoint = Endpoint::loopback(4242);
        let config = ClientConfig::for_endpoint(&endpoint, Duration::from_millis(900));
        assert_eq!(config.endpoint(), endpoint);
        assert_eq!(config.timeout_ms, 900);
    }
}
