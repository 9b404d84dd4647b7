//! Process entry: bootstrap, pump the executor, and shut down in order.
//!
//! The calling thread becomes the designated context. It owns the model
//! store and pumps the work queue once per configured tick until the stop
//! flag is raised, then stops the server and fails whatever is still queued.

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use scenewire_config::ServerConfig;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use thiserror::Error;
use tracing::info;

use crate::executor::{MainContext, run_until};
use crate::model::{ModelStore, StoreError, memory::MemoryStore};
use crate::server::{Server, ServerError};
use crate::telemetry::{self, TelemetryError};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Failures that prevent the server process from running.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The reference store could not be seeded.
    #[error("failed to prepare the model store: {0}")]
    Store(#[from] StoreError),
    /// The server failed to start or stop.
    #[error(transparent)]
    Server(#[from] ServerError),
    /// Termination signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signal {
        /// Underlying registration error.
        #[source]
        source: io::Error,
    },
}

/// Runs the server with the sample project until a termination signal
/// arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails or the listener cannot be
/// released cleanly.
pub fn run_server(config: &ServerConfig) -> Result<(), LaunchError> {
    telemetry::initialise(config)?;
    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGINT, SIGQUIT, SIGHUP] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .map_err(|source| LaunchError::Signal { source })?;
    }
    run_with(config, MemoryStore::sample_project()?, &stop)
}

/// Serves `store` on the calling thread until `stop` is set.
///
/// # Errors
///
/// Returns [`LaunchError::Server`] when the listener cannot be bound or
/// its accept thread panicked.
pub fn run_with(
    config: &ServerConfig,
    store: impl ModelStore + 'static,
    stop: &AtomicBool,
) -> Result<(), LaunchError> {
    let mut context = MainContext::new(store);
    let server = Server::from_config(config, context.queue());
    let local_addr = server.start()?;
    info!(
        target: PROCESS_TARGET,
        %local_addr,
        tick_ms = config.tick_interval_ms,
        "pumping work queue on the main thread"
    );

    run_until(&mut context, config.tick_interval(), stop);

    info!(target: PROCESS_TARGET, "shutdown requested");
    let stopped = server.stop();
    let dropped = context.shutdown();
    info!(target: PROCESS_TARGET, dropped, "shutdown complete");
    stopped.map_err(LaunchError::from)
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::transport::ListenerError;

    fn config(port: u16) -> ServerConfig {
        ServerConfig {
            port,
            tick_interval_ms: 1,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn returns_once_stop_is_raised() {
        let stop = AtomicBool::new(true);
        run_with(&config(0), MemoryStore::new(), &stop).expect("clean shutdown");
    }

    #[test]
    fn reports_an_occupied_port() {
        let occupied = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = occupied.local_addr().expect("addr").port();
        let stop = AtomicBool::new(true);

        let error = run_with(&config(port), MemoryStore::new(), &stop).expect_err("port in use");
        assert!(matches!(
            error,
            LaunchError::Server(ServerError::Listener(ListenerError::BindTcp { .. }))
        ));
    }
}
