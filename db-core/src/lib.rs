//! Engine-agnostic vocabulary shared by every driver: the error hierarchy,
//! the value/column model, and the engine selection config. A driver crate
//! (such as `db-mysql`) depends on this crate; this crate knows nothing
//! about any particular driver, so the dependency only ever points one way.

mod engine;
mod error;
mod value;

pub use engine::{EngineConfig, EngineKind, EngineParams, MySqlEngineParams};
pub use error::{Error, Result, ServerError};
pub use value::{Column, DbDate, DbTime, DbType, Value};
