use db_core::Result;

use crate::connection::{MySqlConnectParams, MySqlConnection};

/// Fixed-capacity LIFO cache of idle connections, owned by one
/// [`crate::session::MySqlSession`]. `acquire` pops the most recently
/// released connection (O(1)); `release` pushes back onto the same stack
/// unless it is full or the connection is poisoned, in which case the
/// connection is destroyed instead.
pub(crate) struct Pool {
    idle: Vec<MySqlConnection>,
    capacity: usize,
    params: MySqlConnectParams,
}

impl Pool {
    pub(crate) fn new(capacity: usize, params: MySqlConnectParams) -> Self {
        Pool {
            idle: Vec::new(),
            // A pool_size of 0 in the engine config means "use the default
            // of 1", matching the original driver's cache sizing.
            capacity: capacity.max(1),
            params,
        }
    }

    pub(crate) fn idle_len(&self) -> usize {
        self.idle.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn params(&self) -> &MySqlConnectParams {
        &self.params
    }

    /// Pops an idle connection if one is available, otherwise establishes a
    /// fresh one against the session's configured server.
    pub(crate) async fn acquire(&mut self) -> Result<MySqlConnection> {
        if let Some(conn) = self.idle.pop() {
            return Ok(conn);
        }
        MySqlConnection::establish(&self.params).await
    }

    /// Returns `conn` to the pool if there is room and it is not poisoned;
    /// otherwise destroys it. Never fails — `destroy` is best-effort.
    pub(crate) async fn release(&mut self, conn: MySqlConnection) {
        if conn.is_undefined() || self.idle.len() >= self.capacity {
            conn.destroy().await;
            return;
        }
        self.idle.push(conn);
    }

    /// Drains and destroys every idle connection, e.g. on session close.
    pub(crate) async fn clear(&mut self) {
        for conn in self.idle.drain(..) {
            conn.destroy().await;
        }
    }
}
