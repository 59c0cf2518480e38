use bytes::Buf;
use db_core::{Error, Result, ServerError};

use crate::io::BufExt;

/// An `ERR` packet: engine error code, SQLSTATE, and a human-readable message.
#[derive(Debug, Clone)]
pub struct ErrPacket(pub ServerError);

impl ErrPacket {
    /// `buf` is the full packet payload, header byte included.
    pub fn read(mut buf: bytes::Bytes) -> Result<Self> {
        let header = buf.get_u8();
        if header != 0xFF {
            return Err(Error::Unknown(format!("expected ERR header, got {header:#x}")));
        }

        let code = buf.get_u16_le();

        // SQLSTATE is only present behind the `#` marker byte when the server
        // advertises CLIENT_PROTOCOL_41, which this client always requests.
        let mut sqlstate = [b'H', b'Y', b'0', b'0', b'0'];
        if buf.first().copied() == Some(b'#') {
            buf.advance(1);
            let raw = buf.copy_to_bytes(5);
            sqlstate.copy_from_slice(&raw);
        }

        let message = String::from_utf8_lossy(&buf).into_owned();

        Ok(ErrPacket(ServerError {
            code,
            sqlstate,
            message,
        }))
    }
}

pub fn is_err_header(first_byte: u8) -> bool {
    first_byte == 0xFF
}
