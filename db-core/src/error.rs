use std::fmt;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a session, connection, statement, or result operation can fail.
///
/// This mirrors the original driver's integer return codes one-for-one so a
/// caller can still reason about "one of a fixed set of outcomes" even though
/// Rust returns `Result<T, Error>` rather than a code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server returned an ERR packet. Details are on the error itself.
    #[error("{0}")]
    Failed(#[from] ServerError),

    /// A short read/write, a deadline expiry, or an already-poisoned connection.
    #[error("connection is unavailable")]
    Unavailable,

    /// A packet at a status boundary was neither OK, EOF, nor ERR.
    #[error("protocol violation: {0}")]
    Unknown(String),

    /// TCP connect failed.
    #[error("failed to connect: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The configured engine is not implemented, or the server speaks a
    /// protocol version older than 10.
    #[error("engine or server protocol version is not supported")]
    NotSupported,

    /// A bind index fell outside `0..num_params`.
    #[error("parameter index out of range")]
    OutOfIndex,

    /// A bind value's type does not match the parameter's declared type.
    #[error("value type does not match the bound parameter")]
    Mismatch,

    /// A bind value would lose significant bits narrowing into the parameter's type.
    #[error("value does not fit in the bound parameter's type")]
    TooLong,

    /// A result-set operation was called while the decoder was in the wrong state.
    #[error("result set accessed out of sequence")]
    OutOfSync,

    /// No further rows or result-sets remain; normal end of iteration.
    #[error("no more data")]
    NoData,

    /// Malformed `mysql://` connection string.
    #[error("invalid connection url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Raw I/O failure not already classified as `Unavailable` (e.g. while
    /// closing a socket during `destroy`, where the outcome is ignored by
    /// callers but still worth a variant for completeness).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the local, non-fatal statement errors that leave prior state intact.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::OutOfIndex | Error::Mismatch | Error::TooLong | Error::OutOfSync | Error::NoData
        )
    }
}

/// An error reported by the server itself, as opposed to a transport or
/// protocol-framing failure.
#[derive(Debug, Clone)]
pub struct ServerError {
    pub code: u16,
    pub sqlstate: [u8; 5],
    pub message: String,
}

impl ServerError {
    pub fn sqlstate(&self) -> &str {
        std::str::from_utf8(&self.sqlstate).unwrap_or("?????")
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.sqlstate(), self.message)
    }
}

impl std::error::Error for ServerError {}
