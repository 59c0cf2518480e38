use db_core::{EngineConfig, EngineKind, EngineParams, Error, Result, ServerError};
use tracing::instrument;

use crate::connection::{MySqlConnectParams, MySqlConnection};
use crate::pool::Pool;

/// One logical database session: credentials, timeouts, cached facts about
/// the server, and a [`Pool`] of idle connections. One `MySqlSession` per
/// logical database; `close` drains the pool.
pub struct MySqlSession {
    pool: Pool,
    last_error: Option<ServerError>,
    unsupported_version: bool,
    auth_failed: bool,
}

impl MySqlSession {
    /// Constructs a session from an engine-agnostic [`EngineConfig`],
    /// dispatching on `config.kind`. Any engine other than
    /// [`EngineKind::MySql`] returns [`Error::NotSupported`] before anything
    /// is allocated — no `MySqlSession` value is ever produced on error.
    ///
    /// Eagerly opens one connection and parks it in the pool so that
    /// `ConnectFailed`/`NotSupported`/`Failed` surface here rather than at
    /// the caller's first query.
    #[instrument(skip_all)]
    pub async fn start(config: EngineConfig) -> Result<Self> {
        if config.kind != EngineKind::MySql {
            return Err(Error::NotSupported);
        }

        let EngineParams::MySql(mysql_params) = config.params else {
            return Err(Error::NotSupported);
        };

        let params = MySqlConnectParams {
            host: mysql_params.host,
            port: mysql_params.port,
            username: mysql_params.username,
            password: mysql_params.password,
            database: mysql_params.schema,
            connect_timeout: config.connect_timeout,
            timeout: config.timeout,
        };

        let mut pool = Pool::new(config.pool_size, params);
        let conn = MySqlConnection::establish(pool.params()).await?;
        pool.release(conn).await;

        Ok(MySqlSession {
            pool,
            last_error: None,
            unsupported_version: false,
            auth_failed: false,
        })
    }

    pub fn last_error(&self) -> Option<&ServerError> {
        self.last_error.as_ref()
    }

    /// Pool-backed `connection_open`: pops an idle connection, or opens a
    /// fresh one. Short-circuits without network traffic once a prior
    /// attempt has cached `NotSupported`/`Failed` on this session.
    pub async fn acquire(&mut self) -> Result<MySqlConnection> {
        if self.unsupported_version {
            return Err(Error::NotSupported);
        }
        if self.auth_failed {
            return Err(Error::Failed(
                self.last_error.clone().unwrap_or_else(|| ServerError {
                    code: 0,
                    sqlstate: *b"HY000",
                    message: "authentication previously failed on this session".to_owned(),
                }),
            ));
        }

        match self.pool.acquire().await {
            Ok(conn) => Ok(conn),
            Err(Error::NotSupported) => {
                self.unsupported_version = true;
                Err(Error::NotSupported)
            }
            Err(Error::Failed(err)) => {
                self.auth_failed = true;
                self.last_error = Some(err.clone());
                Err(Error::Failed(err))
            }
            Err(e) => Err(e),
        }
    }

    /// `connection_close`: returns `conn` to the pool if there is room and
    /// it is not poisoned, otherwise destroys it.
    pub async fn release(&mut self, conn: MySqlConnection) {
        self.pool.release(conn).await;
    }

    pub fn idle_connections(&self) -> usize {
        self.pool.idle_len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.capacity()
    }

    /// Drains the pool, destroying every idle connection.
    pub async fn close(mut self) {
        self.pool.clear().await;
    }
}
