use bytes::{Buf, Bytes};
use db_core::{Column, Error, Result};

use super::field::FieldFlags;
use super::type_id::TypeId;
use crate::io::BufExt;

/// A `Column Definition` packet, as sent once per column after a query's
/// column count and once per parameter after `COM_STMT_PREPARE`.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_id: TypeId,
    pub flags: FieldFlags,
    pub max_length: u32,
}

impl ColumnDefinition {
    pub fn read(mut buf: Bytes) -> Result<Self> {
        let _catalog = buf.get_bytes_lenenc();
        let _schema = buf.get_bytes_lenenc();
        let _table = buf.get_bytes_lenenc();
        let _org_table = buf.get_bytes_lenenc();
        let name = buf
            .get_str_lenenc()?
            .ok_or_else(|| Error::Unknown("column definition missing name".to_owned()))?;
        let _org_name = buf.get_bytes_lenenc();

        // length of the fixed-length fields below, always 0x0c
        let _filler = buf.get_uint_lenenc();

        let _charset = buf.get_u16_le();
        let max_length = buf.get_u32_le();
        let type_id = TypeId(buf.get_u8());
        let flags = FieldFlags::from_bits_truncate(buf.get_u16_le());
        let _decimals = buf.get_u8();

        Ok(ColumnDefinition {
            name,
            type_id,
            flags,
            max_length,
        })
    }

    pub fn into_column(self) -> Column {
        Column {
            name: self.name,
            ty: self.type_id.detect(),
            length: u64::from(self.max_length),
        }
    }
}
