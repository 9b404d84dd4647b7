//! Table of live connections.
//!
//! The accept side registers each connection and receives a
//! [`Registration`] guard; dropping the guard removes the entry. Closing the
//! table shuts down every registered socket, which unblocks their reads, and
//! refuses later registrations.

use std::collections::HashMap;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::TRANSPORT_TARGET;

#[derive(Debug, Default)]
struct Entries {
    closed: bool,
    sockets: HashMap<u64, TcpStream>,
}

/// Concurrent map of connection id to socket.
#[derive(Debug)]
pub(crate) struct ConnectionTable {
    next_id: AtomicU64,
    entries: Mutex<Entries>,
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Entries::default()),
        }
    }
}

impl ConnectionTable {
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `socket` under a fresh id.
    ///
    /// Returns `None` once the table has been closed.
    pub(crate) fn register(table: &Arc<Self>, socket: TcpStream) -> Option<Registration> {
        let mut entries = table.lock();
        if entries.closed {
            return None;
        }
        let id = table.next_id.fetch_add(1, Ordering::SeqCst);
        entries.sockets.insert(id, socket);
        Some(Registration {
            table: Arc::clone(table),
            id,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().sockets.len()
    }

    /// Shuts down every registered socket and refuses new ones.
    ///
    /// Returns how many sockets were shut down.
    pub(crate) fn close_all(&self) -> usize {
        let mut entries = self.lock();
        entries.closed = true;
        let sockets: Vec<(u64, TcpStream)> = entries.sockets.drain().collect();
        drop(entries);
        for (id, socket) in &sockets {
            if let Err(error) = socket.shutdown(Shutdown::Both) {
                debug!(
                    target: TRANSPORT_TARGET,
                    connection = id,
                    error = %error,
                    "socket already closed"
                );
            }
        }
        sockets.len()
    }

    /// Allows registrations again after [`ConnectionTable::close_all`].
    pub(crate) fn reopen(&self) {
        self.lock().closed = false;
    }

    fn remove(&self, id: u64) {
        self.lock().sockets.remove(&id);
    }
}

/// Membership of one connection in the table.
#[derive(Debug)]
pub(crate) struct Registration {
    table: Arc<ConnectionTable>,
    id: u64,
}

impl Registration {
    pub(crate) const fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.table.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::TcpListener;

    use rstest::{fixture, rstest};

    use super::*;

    fn socket_pair(listener: &TcpListener) -> (TcpStream, TcpStream) {
        let client = TcpStream::connect(listener.local_addr().expect("addr")).expect("connect");
        let (server, _) = listener.accept().expect("accept");
        (client, server)
    }

    #[fixture]
    fn listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    #[rstest]
    fn ids_increase_and_entries_leave_on_drop(listener: TcpListener) {
        let table = Arc::new(ConnectionTable::default());
        let (_client_a, server_a) = socket_pair(&listener);
        let (_client_b, server_b) = socket_pair(&listener);

        let first = ConnectionTable::register(&table, server_a).expect("open table");
        let second = ConnectionTable::register(&table, server_b).expect("open table");
        assert!(second.id() > first.id());
        assert_eq!(table.len(), 2);

        drop(first);
        assert_eq!(table.len(), 1);
        drop(second);
        assert_eq!(table.len(), 0);
    }

    #[rstest]
    fn closing_shuts_sockets_and_refuses_newcomers(listener: TcpListener) {
        let table = Arc::new(ConnectionTable::default());
        let (mut client, server) = socket_pair(&listener);
        let registration = ConnectionTable::register(&table, server).expect("open table");

        assert_eq!(table.close_all(), 1);
        let mut buffer = [0_u8; 8];
        assert_eq!(client.read(&mut buffer).expect("read after shutdown"), 0);

        let (_late_client, late_server) = socket_pair(&listener);
        assert!(ConnectionTable::register(&table, late_server).is_none());
        drop(registration);
        assert_eq!(table.len(), 0);

        table.reopen();
        let (_client, server) = socket_pair(&listener);
        assert!(ConnectionTable::register(&table, server).is_some());
    }
}
