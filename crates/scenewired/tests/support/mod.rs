//! Real server on an ephemeral loopback port, pumped by a background thread
//! that stands in for the host tick.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use scenewire_client::Client;
use scenewire_config::{ClientConfig, DEFAULT_MAX_REQUEST_BYTES, Endpoint};
use scenewire_protocol::Value;
use scenewired::model::memory::{MemoryStore, StoreStats};
use scenewired::{MainContext, Server, WorkQueue, run_until};

pub const PLAYER: &str = "Prefabs/Player";

pub struct TestServer {
    server: Server,
    addr: SocketAddr,
    stats: StoreStats,
    queue: WorkQueue,
    stop: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start() -> Self {
        let store = MemoryStore::sample_project().expect("sample project");
        Self::start_with(store, DEFAULT_MAX_REQUEST_BYTES)
    }

    pub fn start_with(store: MemoryStore, max_request_bytes: usize) -> Self {
        let stats = store.stats();
        let mut context = MainContext::new(store);
        let queue = context.queue();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let pump =
            thread::spawn(move || run_until(&mut context, Duration::from_millis(1), &flag));

        let server = Server::new(Endpoint::loopback(0), max_request_bytes, queue.clone());
        let addr = server.start().expect("start server");
        Self {
            server,
            addr,
            stats,
            queue,
            stop,
            pump: Some(pump),
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_endpoint(&Endpoint::loopback(self.addr.port()), Duration::from_secs(5))
    }

    pub fn client(&self) -> Client {
        Client::connect(&self.config()).expect("connect client")
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Units of work submitted to the executor so far.
    pub fn submitted(&self) -> u64 {
        self.queue.submitted()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Err(error) = self.server.stop() {
            eprintln!("server stopped uncleanly: {error}");
        }
        self.stop.store(true, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            pump.join().expect("pump thread");
        }
    }
}

pub fn text(value: &str) -> Value {
    Value::from(value)
}
