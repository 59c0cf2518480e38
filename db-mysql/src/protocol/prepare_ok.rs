use bytes::{Buf, Bytes};
use db_core::{Error, Result};

/// The OK header returned by `COM_STMT_PREPARE`, distinct from the
/// general-purpose [`super::ok::OkPacket`]: the same leading `0x00` byte
/// introduces a different, fixed-width payload.
#[derive(Debug, Clone, Copy)]
pub struct PrepareOkPacket {
    pub statement_id: u32,
    pub num_columns: u16,
    pub num_params: u16,
    pub warnings: u16,
}

impl PrepareOkPacket {
    pub fn read(mut buf: Bytes) -> Result<Self> {
        let header = buf.get_u8();
        if header != 0x00 {
            return Err(Error::Unknown(format!("expected COM_STMT_PREPARE OK header, got {header:#x}")));
        }

        let statement_id = buf.get_u32_le();
        let num_columns = buf.get_u16_le();
        let num_params = buf.get_u16_le();
        buf.advance(1); // filler
        let warnings = buf.get_u16_le();

        Ok(PrepareOkPacket {
            statement_id,
            num_columns,
            num_params,
            warnings,
        })
    }
}
