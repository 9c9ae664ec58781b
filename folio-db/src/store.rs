//! Connection pool over the library database, and request scopes.
//!
//! The library is opened read-only through a small pool of SQLite
//! connections, each behind its own mutex. A request takes the first idle
//! connection from a round-robin starting point, and only waits when every
//! connection is busy. Every
//! query of one request runs on a single checked-out connection under one
//! [`RequestScope`], so cancelling the scope stops whatever that request is
//! running and nothing else.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Duration;

use rusqlite::{Connection, InterruptHandle, OpenFlags};

use crate::error::QueryError;
use crate::queries::QueryKey;
use crate::schema::{self, SchemaError};

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of pooled connections. Zero is treated as one.
    pub pool_size: usize,
    /// How long a query waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Read-only pool of connections to a Calibre library database.
pub struct CatalogStore {
    connections: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl CatalogStore {
    /// Open `pool_size` read-only connections to the database at `path`
    /// and check that it has the tables the catalog reads.
    pub fn open(path: &Path, config: &StoreConfig) -> Result<Self, SchemaError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let mut connections = Vec::with_capacity(config.pool_size.max(1));
        for _ in 0..config.pool_size.max(1) {
            let conn = Connection::open_with_flags(path, flags)?;
            conn.busy_timeout(config.busy_timeout)?;
            connections.push(conn);
        }
        if let Some(first) = connections.first() {
            schema::check_schema(first)?;
        }
        log::debug!(
            "Opened {} read-only connection(s) to {}",
            connections.len(),
            path.display()
        );
        Ok(Self::from_connections(connections))
    }

    /// Wrap a single existing connection, e.g. from [`schema::open_memory`].
    pub fn from_connection(conn: Connection) -> Self {
        Self::from_connections(vec![conn])
    }

    fn from_connections(connections: Vec<Connection>) -> Self {
        let connections = connections
            .into_iter()
            .map(|conn| {
                // Room for the whole query catalog plus search queries
                conn.set_prepared_statement_cache_capacity(QueryKey::all().len() * 2);
                Mutex::new(conn)
            })
            .collect();
        Self {
            connections,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.connections.len()
    }

    /// Run `f` on a pooled connection within `scope`.
    ///
    /// Fails with [`QueryError::Cancelled`] without touching the database if
    /// the scope is already cancelled. While `f` runs, cancelling the scope
    /// interrupts the statement in progress.
    pub fn with_connection<T>(
        &self,
        scope: &RequestScope,
        f: impl FnOnce(&Connection) -> Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        scope.check()?;
        let conn = self.checkout();
        scope.attach(conn.get_interrupt_handle());
        let result = scope.check().and_then(|()| f(&conn));
        scope.detach();
        result
    }

    fn checkout(&self) -> MutexGuard<'_, Connection> {
        let len = self.connections.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % len;
        for step in 0..len {
            let index = (start + step) % len;
            match self.connections[index].try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return recover(index, poisoned),
                Err(TryLockError::WouldBlock) => {}
            }
        }
        log::trace!("All {len} connection(s) busy, waiting on {start}");
        self.connections[start]
            .lock()
            .unwrap_or_else(|poisoned| recover(start, poisoned))
    }

    /// Flush cached statements and close every connection.
    pub fn close(self) -> Result<(), QueryError> {
        let mut first_error = None;
        for slot in self.connections {
            let conn = slot.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
            conn.flush_prepared_statement_cache();
            if let Err((_, e)) = conn.close() {
                log::warn!("Failed to close connection: {e}");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

// A panic mid-read leaves nothing half-written on a read-only connection
fn recover<'a>(
    index: usize,
    poisoned: PoisonError<MutexGuard<'a, Connection>>,
) -> MutexGuard<'a, Connection> {
    log::warn!("Recovering poisoned connection {index}");
    poisoned.into_inner()
}

// ── Request scope ───────────────────────────────────────────────────────────

/// Cancellation scope for every query issued on behalf of one request.
///
/// Clones share state, so a clone handed to another thread (a timeout
/// watcher, a disconnect handler) can cancel the request.
#[derive(Clone, Default)]
pub struct RequestScope {
    inner: Arc<ScopeState>,
}

#[derive(Default)]
struct ScopeState {
    cancelled: AtomicBool,
    // Interrupt handle of the connection the request currently holds
    active: Mutex<Option<InterruptHandle>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the request. Later queries fail with [`QueryError::Cancelled`]
    /// and a statement that is running now is interrupted.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.active().as_ref() {
            handle.interrupt();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the scope has been cancelled.
    pub fn check(&self) -> Result<(), QueryError> {
        if self.is_cancelled() {
            Err(QueryError::Cancelled)
        } else {
            Ok(())
        }
    }

    // Attach and detach happen while the connection is checked out, so an
    // interrupt can only ever reach this request's own statement.
    fn attach(&self, handle: InterruptHandle) {
        *self.active() = Some(handle);
    }

    fn detach(&self) {
        *self.active() = None;
    }

    fn active(&self) -> MutexGuard<'_, Option<InterruptHandle>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScope")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store(size: usize) -> CatalogStore {
        let connections = (0..size)
            .map(|_| Connection::open_in_memory().unwrap())
            .collect();
        CatalogStore::from_connections(connections)
    }

    #[test]
    fn checkout_skips_busy_connections() {
        let store = memory_store(3);
        let busy = store.connections[0].lock().unwrap();

        // The cursor points at the busy slot; the next idle one is handed out
        let conn = store.checkout();
        assert!(store.connections[1].try_lock().is_err());
        assert!(store.connections[2].try_lock().is_ok());

        drop(conn);
        drop(busy);
    }

    #[test]
    fn checkout_rotates_between_idle_connections() {
        let store = memory_store(2);
        let first = store.checkout();
        assert!(store.connections[0].try_lock().is_err());
        drop(first);

        let second = store.checkout();
        assert!(store.connections[0].try_lock().is_ok());
        assert!(store.connections[1].try_lock().is_err());
        drop(second);
    }

    #[test]
    fn checkout_waits_when_every_connection_is_busy() {
        let store = Arc::new(memory_store(1));
        let busy = store.connections[0].lock().unwrap();

        let waiter = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .with_connection(&RequestScope::new(), |conn| {
                        Ok(conn.query_row("SELECT 7", [], |row| row.get::<_, i64>(0))?)
                    })
                    .unwrap()
            })
        };
        std::thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());

        drop(busy);
        assert_eq!(waiter.join().unwrap(), 7);
    }
}
