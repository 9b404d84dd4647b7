//! Shared doubles and harnesses for unit tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use scenewire_config::Endpoint;

use crate::executor::{MainContext, WorkQueue, run_until};
use crate::health::HealthReporter;
use crate::model::memory::MemoryStore;
use crate::server::ServerError;

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    Starting(String),
    Started,
    Failed(String),
    Stopping(usize),
    Stopped,
    Opened(u64),
    Closed(u64),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("health reporter mutex poisoned").clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn server_starting(&self, endpoint: &Endpoint) {
        self.record(HealthEvent::Starting(endpoint.to_string()));
    }

    fn server_started(&self, _local_addr: SocketAddr) {
        self.record(HealthEvent::Started);
    }

    fn server_failed(&self, error: &ServerError) {
        self.record(HealthEvent::Failed(error.to_string()));
    }

    fn server_stopping(&self, connections: usize) {
        self.record(HealthEvent::Stopping(connections));
    }

    fn server_stopped(&self) {
        self.record(HealthEvent::Stopped);
    }

    fn connection_opened(&self, connection: u64, _peer: SocketAddr) {
        self.record(HealthEvent::Opened(connection));
    }

    fn connection_closed(&self, connection: u64) {
        self.record(HealthEvent::Closed(connection));
    }
}

/// Executor pumped on a background thread standing in for the host tick.
pub(crate) struct Pump {
    queue: WorkQueue,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Pump {
    pub(crate) fn start(store: MemoryStore) -> Self {
        let mut context = MainContext::new(store);
        let queue = context.queue();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread =
            thread::spawn(move || run_until(&mut context, Duration::from_millis(1), &flag));
        Self {
            queue,
            stop,
            thread: Some(thread),
        }
    }

    pub(crate) fn queue(&self) -> WorkQueue {
        self.queue.clone()
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().expect("pump thread");
        }
    }
}

/// Polls `condition` for up to two seconds.
pub(crate) fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
