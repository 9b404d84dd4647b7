//! Blocking client for the scenewire line protocol.
//!
//! A [`Client`] holds one TCP connection and sends one request at a time,
//! matching each response to its request by id. The configured timeout
//! bounds both the connect and every request/response exchange.
//!
//! ```no_run
//! use scenewire_client::Client;
//! use scenewire_config::ClientConfig;
//! use scenewire_protocol::Value;
//!
//! # fn main() -> Result<(), scenewire_client::ClientError> {
//! let mut client = Client::connect(&ClientConfig::default())?;
//! let prefab = client.call("get_prefab", [("path", Value::from("Prefabs/Player"))])?;
//! println!("{prefab}");
//! # Ok(())
//! # }
//! ```

mod errors;

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use scenewire_config::{ClientConfig, Endpoint};
use scenewire_protocol::{Request, Response, Value};

pub use errors::ClientError;

/// Connection to a scenewire server.
#[derive(Debug)]
pub struct Client {
    endpoint: Endpoint,
    timeout: Duration,
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    next_id: u64,
}

impl Client {
    /// Connects to the configured endpoint within the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Resolve`], [`ClientError::Connect`], or
    /// [`ClientError::Timeout`] when no connection could be made.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = config.endpoint();
        let timeout = config.timeout();
        let address = resolve(&endpoint)?;
        let stream = TcpStream::connect_timeout(&address, timeout).map_err(|source| {
            ClientError::from_io(source, timeout, |source| ClientError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })
        })?;
        Self::from_stream(endpoint, timeout, stream)
    }

    fn from_stream(
        endpoint: Endpoint,
        timeout: Duration,
        stream: TcpStream,
    ) -> Result<Self, ClientError> {
        let configure = |stream: &TcpStream| -> io::Result<TcpStream> {
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
            stream.set_nodelay(true)?;
            stream.try_clone()
        };
        let reader = configure(&stream).map_err(|source| ClientError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self {
            endpoint,
            timeout,
            writer: stream,
            reader: BufReader::new(reader),
            next_id: 1,
        })
    }

    /// Endpoint this client is connected to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Runs `command` and returns its `data` payload.
    ///
    /// A response with `success: false` becomes [`ClientError::Command`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures, mismatched ids, or a
    /// failed command.
    pub fn call<I, K>(
        &mut self,
        command: &str,
        params: I,
    ) -> Result<serde_json::Value, ClientError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let response = self.request(command, params)?;
        if response.success {
            return Ok(response.data.unwrap_or(serde_json::Value::Null));
        }
        Err(ClientError::Command {
            command: command.to_owned(),
            message: response.error.unwrap_or_default(),
        })
    }

    /// Runs `command` with a generated id and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures or mismatched ids.
    pub fn request<I, K>(&mut self, command: &str, params: I) -> Result<Response, ClientError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let id = self.next_id.to_string();
        self.next_id = self.next_id.wrapping_add(1);
        let request = params
            .into_iter()
            .fold(Request::new(id, command), |request, (key, value)| {
                request.with_param(key, value)
            });
        self.send(&request)
    }

    /// Sends `request` and waits for the response carrying its id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::IdMismatch`] when the server answers a
    /// different id, or any transport error.
    pub fn send(&mut self, request: &Request) -> Result<Response, ClientError> {
        self.write_line(&request.to_line()?)?;
        let response = self.read_response()?;
        if response.id != request.id {
            return Err(ClientError::IdMismatch {
                expected: request.id.clone(),
                actual: response.id,
            });
        }
        Ok(response)
    }

    /// Writes raw text to the socket, appending a newline when missing.
    ///
    /// Useful for sending lines the [`Request`] type cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Send`] or [`ClientError::Timeout`].
    pub fn write_line(&mut self, line: &str) -> Result<(), ClientError> {
        let mut framed = line.to_owned();
        if !framed.ends_with('\n') {
            framed.push('\n');
        }
        self.writer
            .write_all(framed.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|error| ClientError::from_io(error, self.timeout, ClientError::Send))
    }

    /// Reads the next response line.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] at end of stream,
    /// [`ClientError::Timeout`] when nothing arrives in time, or
    /// [`ClientError::Decode`] for a line that is not a response.
    pub fn read_response(&mut self) -> Result<Response, ClientError> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|error| ClientError::from_io(error, self.timeout, ClientError::Receive))?;
        if read == 0 {
            return Err(ClientError::Closed);
        }
        Ok(Response::parse(&line)?)
    }
}

fn resolve(endpoint: &Endpoint) -> Result<SocketAddr, ClientError> {
    let resolve_error = |source| ClientError::Resolve {
        endpoint: endpoint.to_string(),
        source,
    };
    (endpoint.host(), endpoint.port())
        .to_socket_addrs()
        .map_err(resolve_error)?
        .next()
        .ok_or_else(|| {
            resolve_error(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no resolved addresses",
            ))
        })
}
