use std::time::Duration;

/// Which backend a [`crate::EngineConfig`] describes.
///
/// Only [`EngineKind::MySql`] is implemented. The others are kept so that a
/// config value built from an external source (a file, an environment
/// variable holding an integer) has a name for every engine the facade could
/// in principle select, and fails predictably with `NotSupported` instead of
/// not compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    MySql,
    Db2,
    Firebird,
    Sqlite3,
    PostgreSql,
    Oracle,
    Tds,
}

/// Engine-specific connection parameters. Only the MySQL variant is wired to
/// a real driver; constructing a session with any other kind returns
/// `NotSupported` before anything is allocated.
#[derive(Debug, Clone)]
pub enum EngineParams {
    MySql(MySqlEngineParams),
    Unimplemented,
}

#[derive(Debug, Clone)]
pub struct MySqlEngineParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub schema: Option<String>,
}

impl Default for MySqlEngineParams {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 3306,
            username: "root".to_owned(),
            password: None,
            schema: None,
        }
    }
}

/// The language-neutral shape of `session_start`'s input: an engine tag, two
/// timeouts, a pool size, and the engine-specific fields.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub pool_size: usize,
    pub params: EngineParams,
}

impl EngineConfig {
    pub fn mysql(params: MySqlEngineParams) -> Self {
        Self {
            kind: EngineKind::MySql,
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
            pool_size: 1,
            params: EngineParams::MySql(params),
        }
    }
}
