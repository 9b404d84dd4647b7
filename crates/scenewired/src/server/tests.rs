//! Lifecycle tests against a real loopback socket.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use rstest::{fixture, rstest};
use scenewire_protocol::Response;

use super::*;
use crate::model::memory::MemoryStore;
use crate::tests::support::{HealthEvent, Pump, RecordingHealthReporter, eventually};

#[fixture]
fn pump() -> Pump {
    Pump::start(MemoryStore::new())
}

fn recorded(
    pump: &Pump,
    endpoint: Endpoint,
    limit: usize,
) -> (Server, Arc<RecordingHealthReporter>) {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let server =
        Server::new(endpoint, limit, pump.queue()).with_health_reporter(reporter.clone());
    (server, reporter)
}

struct Peer {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Peer {
    fn connect(addr: SocketAddr) -> Self {
        let writer = TcpStream::connect(addr).expect("connect");
        let reader = BufReader::new(writer.try_clone().expect("clone stream"));
        Self { writer, reader }
    }

    fn send(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).expect("write request");
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).expect("read response");
        line
    }

    fn response(&mut self) -> Response {
        Response::parse(&self.read_line()).expect("response line")
    }
}

#[rstest]
fn start_is_idempotent(pump: Pump) {
    let (server, reporter) = recorded(&pump, Endpoint::loopback(0), 1024);
    let first = server.start().expect("start");
    let second = server.start().expect("start again");

    assert_eq!(first, second);
    assert_ne!(first.port(), 0);
    assert_eq!(server.local_addr(), Some(first));
    assert_eq!(
        reporter.events(),
        [
            HealthEvent::Starting("tcp://127.0.0.1:0".to_owned()),
            HealthEvent::Started,
        ]
    );
}

#[rstest]
fn stop_closes_live_connections_and_the_port(pump: Pump) {
    let (server, reporter) = recorded(&pump, Endpoint::loopback(0), 1024);
    let addr = server.start().expect("start");
    let mut peer = Peer::connect(addr);
    peer.send(b"{\"id\":\"p\",\"command\":\"ping\"}\n");
    assert!(peer.response().success);
    assert!(eventually(|| server.connection_count() == 1));

    server.stop().expect("stop");

    assert_eq!(peer.read_line(), "", "peer observes end of stream");
    assert!(!server.is_running());
    assert!(TcpStream::connect(addr).is_err(), "port released");
    assert!(eventually(|| reporter.events().contains(&HealthEvent::Closed(1))));
    let events = reporter.events();
    assert!(events.contains(&HealthEvent::Opened(1)));
    assert!(events.contains(&HealthEvent::Stopping(1)));
    assert!(events.contains(&HealthEvent::Stopped));
}

#[rstest]
fn stop_without_start_is_a_no_op(pump: Pump) {
    let (server, reporter) = recorded(&pump, Endpoint::loopback(0), 1024);
    server.stop().expect("stop");
    server.stop().expect("stop again");
    assert!(reporter.events().is_empty());
}

#[rstest]
fn restarts_after_stop(pump: Pump) {
    let (server, _reporter) = recorded(&pump, Endpoint::loopback(0), 1024);
    server.start().expect("start");
    server.stop().expect("stop");
    let addr = server.start().expect("restart");

    let mut peer = Peer::connect(addr);
    peer.send(b"{\"id\":\"again\",\"command\":\"ping\"}\n");
    let response = peer.response();
    assert!(response.success);
    assert_eq!(response.id, "again");
}

#[rstest]
fn refuses_non_loopback_endpoints(pump: Pump) {
    let (server, reporter) = recorded(&pump, Endpoint::new("192.0.2.10", 0), 1024);
    let error = server.start().expect_err("public host");

    assert!(matches!(error, ServerError::Endpoint(_)));
    assert!(!server.is_running());
    assert_eq!(
        reporter.events(),
        [
            HealthEvent::Starting("tcp://192.0.2.10:0".to_owned()),
            HealthEvent::Failed(
                "invalid endpoint: host '192.0.2.10' is not a loopback address".to_owned()
            ),
        ]
    );
}

#[rstest]
fn oversized_requests_close_the_connection(pump: Pump) {
    let (server, _reporter) = recorded(&pump, Endpoint::loopback(0), 16);
    let addr = server.start().expect("start");
    let mut peer = Peer::connect(addr);
    peer.send(b"{\"id\":\"big\",\"command\":\"ping\",\"params\":{}}\n");

    let response = peer.response();
    assert!(!response.success);
    assert_eq!(response.id, "");
    assert_eq!(
        response.error.as_deref(),
        Some("protocol error: request exceeds the 16 byte limit")
    );
    assert_eq!(peer.read_line(), "");
}

#[rstest]
fn invalid_utf8_keeps_the_connection(pump: Pump) {
    let (server, _reporter) = recorded(&pump, Endpoint::loopback(0), 1024);
    let addr = server.start().expect("start");
    let mut peer = Peer::connect(addr);
    peer.send(b"\xff\xfe\n\n{\"id\":\"after\",\"command\":\"ping\"}\n");

    let rejected = peer.response();
    assert_eq!(rejected.id, "");
    assert_eq!(
        rejected.error.as_deref(),
        Some("protocol error: request is not valid UTF-8")
    );
    let accepted = peer.response();
    assert_eq!(accepted.id, "after");
    assert!(accepted.success);
}
