//! Error type for client calls.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures observed while talking to a scenewire server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint host could not be resolved.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        /// Endpoint being resolved.
        endpoint: String,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The TCP connection could not be established.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint being connected to.
        endpoint: String,
        /// Connect failure.
        #[source]
        source: io::Error,
    },
    /// Connecting or waiting for a response took longer than the deadline.
    #[error("timed out after {} ms", .timeout.as_millis())]
    Timeout {
        /// Deadline that elapsed.
        timeout: Duration,
    },
    /// Writing the request failed.
    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),
    /// Reading the response failed.
    #[error("failed to read response: {0}")]
    Receive(#[source] io::Error),
    /// The request could not be encoded or the response was not valid JSON.
    #[error("invalid message: {0}")]
    Decode(#[from] serde_json::Error),
    /// The server closed the connection before answering.
    #[error("server closed the connection")]
    Closed,
    /// The response answered a different request.
    #[error("response id '{actual}' does not match request id '{expected}'")]
    IdMismatch {
        /// Id that was sent.
        expected: String,
        /// Id that came back.
        actual: String,
    },
    /// The server ran the request and reported a failure.
    #[error("{command} failed: {message}")]
    Command {
        /// Command name that failed.
        command: String,
        /// Error text from the response.
        message: String,
    },
}

impl ClientError {
    pub(crate) fn from_io(
        error: io::Error,
        timeout: Duration,
        wrap: impl FnOnce(io::Error) -> Self,
    ) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout { timeout },
            _ => wrap(error),
        }
    }
}
