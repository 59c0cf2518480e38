use bytes::Buf;
use db_core::{Error, Result};

use super::status::Status;

/// An `EOF` packet: punctuates a column-definition block or a row batch.
/// Only valid where the payload is shorter than 9 bytes — a longer payload
/// starting with `0xFE` is a length-encoded integer (a huge row count), not
/// an EOF marker, under `CLIENT_DEPRECATE_EOF`-free negotiation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EofPacket {
    pub warnings: u16,
    pub status: Status,
}

impl EofPacket {
    pub fn read(mut buf: bytes::Bytes) -> Result<Self> {
        let header = buf.get_u8();
        if header != 0xFE {
            return Err(Error::Unknown(format!("expected EOF header, got {header:#x}")));
        }
        if buf.remaining() >= 9 {
            return Err(Error::Unknown("packet looked like EOF but payload is too long".to_owned()));
        }

        let warnings = buf.get_u16_le();
        let status = Status::from_bits_truncate(buf.get_u16_le());

        Ok(EofPacket { warnings, status })
    }
}

/// An EOF packet is only recognizable as such at a status boundary: header
/// byte `0xFE` and a short remaining payload (`< 9` bytes after the header).
pub fn is_eof_header(first_byte: u8, payload_len: usize) -> bool {
    first_byte == 0xFE && payload_len < 9
}
