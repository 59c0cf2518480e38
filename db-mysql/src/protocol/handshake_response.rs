use bytes::{BufMut, BytesMut};

use super::capabilities::{Capabilities, CLIENT_CAPABILITIES};
use crate::io::BufMutExt;

const CHARSET_UTF8_GENERAL_CI: u8 = 33;

/// The client's login reply, built and sent as the packet with sequence 1
/// immediately following the server's greeting.
pub struct HandshakeResponse<'a> {
    pub username: &'a str,
    pub database: Option<&'a str>,
    pub auth_response: &'a [u8],
    pub auth_plugin_name: &'a str,
}

impl HandshakeResponse<'_> {
    pub fn encode(&self) -> BytesMut {
        let mut capabilities = CLIENT_CAPABILITIES;

        if self.database.is_some() {
            capabilities |= Capabilities::CONNECT_WITH_DB;
        }

        let mut buf = BytesMut::new();
        buf.put_u32_le(capabilities.bits() as u32);
        buf.put_u32_le(0xFFFF_FFFF); // max packet size
        buf.put_u8(CHARSET_UTF8_GENERAL_CI);
        buf.put_bytes(0, 23); // reserved

        buf.put_str_nul(self.username);

        buf.put_u8(self.auth_response.len() as u8);
        buf.put_slice(self.auth_response);

        if let Some(database) = self.database {
            buf.put_str_nul(database);
        }

        buf.put_str_nul(self.auth_plugin_name);

        buf
    }
}
