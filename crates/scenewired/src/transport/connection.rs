//! Per-connection read/respond loop.
//!
//! Each connection reads `\n`-terminated lines, answers each with exactly
//! one response line, and handles the next line only after the previous
//! response was written. Blank lines are skipped. End of stream or an I/O
//! error ends the loop; a line over the size limit is answered with a
//! protocol error and then the connection is closed.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};

use scenewire_protocol::Response;
use tracing::{debug, warn};

use super::table::ConnectionTable;
use super::{ConnectionHandler, TRANSPORT_TARGET};
use crate::dispatch::{CommandError, CommandRouter};
use crate::health::HealthReporter;

/// One decoded frame from the byte stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    /// A line without its terminator.
    Line(Vec<u8>),
    /// The line exceeded the size limit.
    TooLong,
    /// The peer closed the stream.
    Closed,
}

/// Serves request lines through a shared router.
pub(crate) struct LineConnectionHandler {
    router: CommandRouter,
    table: Arc<ConnectionTable>,
    health: Arc<dyn HealthReporter>,
    max_request_bytes: usize,
}

impl LineConnectionHandler {
    pub(crate) fn new(
        router: CommandRouter,
        table: Arc<ConnectionTable>,
        health: Arc<dyn HealthReporter>,
        max_request_bytes: usize,
    ) -> Self {
        Self {
            router,
            table,
            health,
            max_request_bytes,
        }
    }

    fn serve(&self, connection: u64, stream: TcpStream) -> io::Result<()> {
        let writer = Mutex::new(stream.try_clone()?);
        let mut reader = BufReader::new(stream);
        loop {
            match read_frame(&mut reader, self.max_request_bytes)? {
                Frame::Closed => return Ok(()),
                Frame::TooLong => {
                    let error = CommandError::Protocol {
                        message: format!(
                            "request exceeds the {} byte limit",
                            self.max_request_bytes
                        ),
                    };
                    warn!(target: TRANSPORT_TARGET, connection, %error, "closing connection");
                    return send(&writer, &Response::failure("", error.to_string()));
                }
                Frame::Line(bytes) => {
                    let response = match String::from_utf8(bytes) {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => self.router.respond_line(&line),
                        Err(_) => {
                            let error = CommandError::Protocol {
                                message: "request is not valid UTF-8".to_owned(),
                            };
                            Response::failure("", error.to_string())
                        }
                    };
                    send(&writer, &response)?;
                }
            }
        }
    }
}

impl ConnectionHandler for LineConnectionHandler {
    fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        let registered = stream
            .try_clone()
            .ok()
            .and_then(|socket| ConnectionTable::register(&self.table, socket));
        let Some(registration) = registered else {
            debug!(target: TRANSPORT_TARGET, peer = %peer, "refusing connection while stopping");
            return;
        };
        let connection = registration.id();
        self.health.connection_opened(connection, peer);

        if let Err(error) = self.serve(connection, stream) {
            debug!(
                target: TRANSPORT_TARGET,
                connection,
                error = %error,
                "connection ended with an I/O error"
            );
        }

        drop(registration);
        self.health.connection_closed(connection);
    }
}

/// Reads one frame of at most `limit` bytes, terminator included.
pub(crate) fn read_frame<R: BufRead>(reader: &mut R, limit: usize) -> io::Result<Frame> {
    let mut line = Vec::new();
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if available.is_empty() {
            return Ok(if line.is_empty() {
                Frame::Closed
            } else {
                Frame::Line(line)
            });
        }

        let newline = available.iter().position(|byte| *byte == b'\n');
        let take = newline.map_or(available.len(), |position| position.saturating_add(1));
        line.extend_from_slice(available.get(..take).unwrap_or_default());
        reader.consume(take);

        if enforce_limit(line.len(), limit).is_err() {
            return Ok(Frame::TooLong);
        }
        if newline.is_some() {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            return Ok(Frame::Line(line));
        }
    }
}

fn enforce_limit(length: usize, limit: usize) -> Result<(), usize> {
    if length > limit { Err(length) } else { Ok(()) }
}

fn send(writer: &Mutex<TcpStream>, response: &Response) -> io::Result<()> {
    let line = response.to_line().map_err(io::Error::other)?;
    let mut stream = writer.lock().unwrap_or_else(PoisonError::into_inner);
    stream.write_all(line.as_bytes())?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    fn frames(input: &str, limit: usize) -> Vec<Frame> {
        let mut reader = BufReader::with_capacity(4, Cursor::new(input.as_bytes().to_vec()));
        let mut frames = Vec::new();
        loop {
            let frame = read_frame(&mut reader, limit).expect("read");
            let done = matches!(frame, Frame::Closed | Frame::TooLong);
            frames.push(frame);
            if done {
                return frames;
            }
        }
    }

    fn line(text: &str) -> Frame {
        Frame::Line(text.as_bytes().to_vec())
    }

    #[test]
    fn splits_lines_across_small_buffers() {
        assert_eq!(
            frames("{\"id\":\"1\"}\nsecond\r\n", 64),
            [line("{\"id\":\"1\"}"), line("second"), Frame::Closed]
        );
    }

    #[test]
    fn keeps_a_trailing_partial_line() {
        assert_eq!(frames("tail", 64), [line("tail"), Frame::Closed]);
    }

    #[rstest]
    #[case("abcdefgh\n", 8)]
    #[case("abcdefghij", 8)]
    fn refuses_oversized_lines(#[case] input: &str, #[case] limit: usize) {
        assert_eq!(frames(input, limit), [Frame::TooLong]);
    }

    #[test]
    fn accepts_a_line_exactly_at_the_limit() {
        assert_eq!(frames("abcdefg\n", 8), [line("abcdefg"), Frame::Closed]);
    }

    #[test]
    fn blank_lines_are_frames_too() {
        assert_eq!(frames("\n\n", 8), [line(""), line(""), Frame::Closed]);
    }
}
