//! A native MySQL 4.1+ wire-protocol client: no C client library, no ORM.
//!
//! [`MySqlSession::start`] opens (and pools) connections; [`MySqlConnection`]
//! runs plain-text queries and transaction control; [`MySqlStatement`] runs
//! prepared statements over the binary protocol. [`MySqlResult`] streams rows
//! across however many result-sets a command produces.
//!
//! ```no_run
//! # async fn run() -> db_core::Result<()> {
//! use db_mysql::MySqlConnectOptions;
//!
//! let config = MySqlConnectOptions::parse("mysql://root@localhost/test")?.into_engine_config();
//! let mut session = db_mysql::MySqlSession::start(config).await?;
//!
//! let mut conn = session.acquire().await?;
//! if let Some(mut result) = conn.query("SELECT 1").await? {
//!     result.fetch_columns().await?;
//!     let rows = result.fetch_rows(0).await?;
//!     println!("{} rows", rows.len());
//!     result.close().await?;
//! }
//! session.release(conn).await;
//! # Ok(())
//! # }
//! ```

mod connection;
mod io;
mod options;
mod pool;
mod protocol;
mod result;
mod session;
mod statement;
mod stream;

pub use connection::{MySqlConnectParams, MySqlConnection};
pub use options::MySqlConnectOptions;
pub use result::{MySqlResult, Row};
pub use session::MySqlSession;
pub use statement::MySqlStatement;

pub use db_core::{Column, DbDate, DbTime, DbType, EngineConfig, Error, Result, ServerError, Value};
