//! Server lifecycle: bind, accept, and tear down.
//!
//! A [`Server`] owns the listener and the table of live connections. Both
//! [`Server::start`] and [`Server::stop`] are idempotent, so hosts can call
//! them from reload hooks without tracking state themselves.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scenewire_config::{Endpoint, EndpointError, ServerConfig};
use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::CommandRouter;
use crate::executor::WorkQueue;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::{
    CommandListener, ConnectionTable, LineConnectionHandler, ListenerError, ListenerHandle,
};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors raised while starting or stopping the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured endpoint is not on loopback.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] EndpointError),
    /// The listener could not be bound or joined.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

struct Running {
    local_addr: SocketAddr,
    handle: ListenerHandle,
}

/// Loopback command server sharing one router across connections.
pub struct Server {
    endpoint: Endpoint,
    max_request_bytes: usize,
    router: CommandRouter,
    health: Arc<dyn HealthReporter>,
    table: Arc<ConnectionTable>,
    running: Mutex<Option<Running>>,
}

impl Server {
    /// Builds a stopped server that will listen on `endpoint`.
    #[must_use]
    pub fn new(endpoint: Endpoint, max_request_bytes: usize, queue: WorkQueue) -> Self {
        Self {
            endpoint,
            max_request_bytes,
            router: CommandRouter::new(queue),
            health: Arc::new(StructuredHealthReporter::new()),
            table: Arc::new(ConnectionTable::default()),
            running: Mutex::new(None),
        }
    }

    /// Builds a stopped server from process configuration.
    #[must_use]
    pub fn from_config(config: &ServerConfig, queue: WorkQueue) -> Self {
        Self::new(config.endpoint(), config.max_request_bytes, queue)
    }

    /// Replaces the lifecycle observer.
    #[must_use]
    pub fn with_health_reporter(mut self, health: Arc<dyn HealthReporter>) -> Self {
        self.health = health;
        self
    }

    fn state(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds the listener and starts accepting connections.
    ///
    /// Returns the bound address. Calling `start` on a running server
    /// returns the existing address without rebinding.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the endpoint is not loopback or the
    /// listener cannot be bound.
    pub fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut state = self.state();
        if let Some(running) = state.as_ref() {
            debug!(target: SERVER_TARGET, local_addr = %running.local_addr, "already running");
            return Ok(running.local_addr);
        }

        self.health.server_starting(&self.endpoint);
        let running = self.bind().inspect_err(|error| self.health.server_failed(error))?;
        let local_addr = running.local_addr;
        *state = Some(running);
        self.health.server_started(local_addr);
        Ok(local_addr)
    }

    fn bind(&self) -> Result<Running, ServerError> {
        let endpoint = self.endpoint.clone().require_loopback()?;
        let listener = CommandListener::bind(&endpoint)?;
        let local_addr = listener.local_addr();
        self.table.reopen();
        let handler = LineConnectionHandler::new(
            self.router.clone(),
            Arc::clone(&self.table),
            Arc::clone(&self.health),
            self.max_request_bytes,
        );
        let handle = listener.start(Arc::new(handler))?;
        Ok(Running { local_addr, handle })
    }

    /// Stops accepting, closes every live connection, and releases the port.
    ///
    /// Stopping a server that is not running does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Listener`] when the accept thread panicked.
    /// Connections are closed regardless.
    pub fn stop(&self) -> Result<(), ServerError> {
        let Some(running) = self.state().take() else {
            return Ok(());
        };
        self.health.server_stopping(self.table.len());
        running.handle.shutdown();
        let joined = running.handle.join();
        let closed = self.table.close_all();
        debug!(target: SERVER_TARGET, closed, "closed live connections");
        self.health.server_stopped();
        joined.map_err(ServerError::from)
    }

    /// Address the listener is bound to, while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state().as_ref().map(|running| running.local_addr)
    }

    /// Returns true between a successful start and the next stop.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state().is_some()
    }

    /// Number of connections currently being served.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.table.len()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(target: SERVER_TARGET, %error, "server stopped uncleanly");
        }
    }
}

#[cfg(test)]
mod tests;
