//! Wire-level packet structures and codecs for the MySQL 4.1+ protocol.
//! Nothing in this module does I/O; [`crate::stream::MySqlStream`] and
//! [`crate::connection::MySqlConnection`] own the socket and drive these
//! encoders/decoders against it.

mod auth;
mod auth_switch;
mod capabilities;
mod column;
mod command;
mod eof;
mod err;
mod execute;
mod field;
mod handshake;
mod handshake_response;
mod ok;
mod prepare_ok;
mod reply;
mod row;
mod status;
mod type_id;

pub use auth::{caching_sha2_password_proof, native_password_proof};
pub use auth_switch::AuthSwitchRequest;
pub use capabilities::{Capabilities, CLIENT_CAPABILITIES};
pub use column::ColumnDefinition;
pub use command::Command;
pub use eof::EofPacket;
pub use err::ErrPacket;
pub use execute::encode_execute;
pub use field::FieldFlags;
pub use handshake::Handshake;
pub use handshake_response::HandshakeResponse;
pub use ok::OkPacket;
pub use prepare_ok::PrepareOkPacket;
pub use reply::StatusPacket;
pub use row::{decode_binary_row, decode_text_row};
pub use status::Status;
pub use type_id::TypeId;
