//! Structured health reporting for server lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use scenewire_config::Endpoint;

use crate::server::ServerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the listener binds.
    fn server_starting(&self, endpoint: &Endpoint);

    /// Invoked once the listener accepts connections.
    fn server_started(&self, local_addr: SocketAddr);

    /// Invoked when the server fails to start.
    fn server_failed(&self, error: &ServerError);

    /// Invoked before the listener and live connections are torn down.
    fn server_stopping(&self, connections: usize);

    /// Invoked after every connection has been closed.
    fn server_stopped(&self);

    /// Invoked after a connection has been registered.
    fn connection_opened(&self, connection: u64, peer: SocketAddr);

    /// Invoked after a connection's loop has ended.
    fn connection_closed(&self, connection: u64);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn server_starting(&self, endpoint: &Endpoint) {
        (**self).server_starting(endpoint);
    }

    fn server_started(&self, local_addr: SocketAddr) {
        (**self).server_started(local_addr);
    }

    fn server_failed(&self, error: &ServerError) {
        (**self).server_failed(error);
    }

    fn server_stopping(&self, connections: usize) {
        (**self).server_stopping(connections);
    }

    fn server_stopped(&self) {
        (**self).server_stopped();
    }

    fn connection_opened(&self, connection: u64, peer: SocketAddr) {
        (**self).connection_opened(connection, peer);
    }

    fn connection_closed(&self, connection: u64) {
        (**self).connection_closed(connection);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn server_starting(&self, endpoint: &Endpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_starting",
            endpoint = %endpoint,
            "starting command server"
        );
    }

    fn server_started(&self, local_addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_started",
            local_addr = %local_addr,
            "command server listening"
        );
    }

    fn server_failed(&self, error: &ServerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "server_failed",
            error = %error,
            "command server failed to start"
        );
    }

    fn server_stopping(&self, connections: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_stopping",
            connections,
            "stopping command server"
        );
    }

    fn server_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_stopped",
            "command server stopped"
        );
    }

    fn connection_opened(&self, connection: u64, peer: SocketAddr) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "connection_opened",
            connection,
            peer = %peer,
            "client connected"
        );
    }

    fn connection_closed(&self, connection: u64) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "connection_closed",
            connection,
            "client disconnected"
        );
    }
}
