use bytes::{Buf, Bytes};
use db_core::{Error, Result};

use crate::io::BufExt;

/// `AuthSwitchRequest`: sent by the server in place of the usual OK/ERR when
/// it wants the client to redo the password proof under a different plugin
/// (e.g. a MySQL 8+ account whose default plugin is `caching_sha2_password`
/// rather than the `mysql_native_password` this driver offers up front).
#[derive(Debug, Clone)]
pub struct AuthSwitchRequest {
    pub plugin_name: String,
    pub data: Bytes,
}

impl AuthSwitchRequest {
    pub fn read(mut buf: Bytes) -> Result<Self> {
        let header = buf.get_u8();
        if header != 0xFE {
            return Err(Error::Unknown(format!("expected auth switch header 0xfe, got {header:#x}")));
        }
        let plugin_name = buf.get_str_nul()?;
        let data = buf.copy_to_bytes(buf.remaining());
        Ok(AuthSwitchRequest { plugin_name, data })
    }

    /// Copies up to 20 bytes of the new challenge into a fixed-size array,
    /// zero-padded if the server sent fewer (it never does in practice, but
    /// nothing here should panic on a short packet).
    pub fn challenge(&self) -> [u8; 20] {
        let mut challenge = [0u8; 20];
        let n = self.data.len().min(20);
        challenge[..n].copy_from_slice(&self.data[..n]);
        challenge
    }
}
