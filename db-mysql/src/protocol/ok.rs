use bytes::Buf;
use db_core::{Error, Result};

use super::status::Status;
use crate::io::BufExt;

#[derive(Debug, Clone, Default)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: Status,
    pub warnings: u16,
    pub info: Option<String>,
}

impl Default for Status {
    fn default() -> Self {
        Status::empty()
    }
}

impl OkPacket {
    /// `buf` is the full packet payload, header byte included.
    pub fn read(mut buf: bytes::Bytes) -> Result<Self> {
        let header = buf.get_u8();
        if header != 0x00 {
            return Err(Error::Unknown(format!("expected OK header, got {header:#x}")));
        }

        let affected_rows = buf.get_uint_lenenc().unwrap_or(0);
        let last_insert_id = buf.get_uint_lenenc().unwrap_or(0);
        if buf.remaining() < 4 {
            return Err(Error::Unknown("OK packet truncated before status/warnings".to_owned()));
        }
        let status = Status::from_bits_truncate(buf.get_u16_le());
        let warnings = buf.get_u16_le();
        let info = if buf.has_remaining() {
            Some(String::from_utf8_lossy(&buf).into_owned())
        } else {
            None
        };

        Ok(OkPacket {
            affected_rows,
            last_insert_id,
            status,
            warnings,
            info,
        })
    }
}

/// Detects an OK packet at a status boundary: header byte `0x00`, and for a
/// result-set row stream, a lenenc-encoded leading column count would also
/// start with a byte `< 0xfb`; callers that can receive row bytes here must
/// only call this where an OK/ERR/column-count boundary is expected.
pub fn is_ok_header(first_byte: u8) -> bool {
    first_byte == 0x00
}
