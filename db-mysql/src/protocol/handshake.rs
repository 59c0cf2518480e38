use bytes::{Buf, Bytes};
use db_core::{Error, Result};

use super::capabilities::Capabilities;
use crate::io::BufExt;

/// The server's initial greeting packet (protocol version 10).
#[derive(Debug)]
pub struct Handshake {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub capabilities: Capabilities,
    pub status: super::status::Status,
    pub challenge: [u8; 20],
    pub auth_plugin_name: Option<String>,
}

impl Handshake {
    pub fn read(mut buf: Bytes) -> Result<Self> {
        let protocol_version = buf.get_u8();
        if protocol_version < 10 {
            return Err(Error::NotSupported);
        }

        let server_version = buf.get_str_nul()?;
        let connection_id = buf.get_u32_le();

        let mut challenge = [0u8; 20];
        challenge[..8].copy_from_slice(&buf.copy_to_bytes(8));
        buf.advance(1); // filler

        let capabilities_low = u32::from(buf.get_u16_le());
        let charset = buf.get_u8();
        let _ = charset;
        let status = super::status::Status::from_bits_truncate(buf.get_u16_le());
        let capabilities_high = u32::from(buf.get_u16_le()) << 16;
        let capabilities = Capabilities::from_bits_truncate(u64::from(capabilities_low | capabilities_high));

        let auth_plugin_data_len = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.get_u8()
        } else {
            buf.advance(1);
            0
        };

        buf.advance(10); // reserved

        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            let len = (auth_plugin_data_len as isize - 8 - 1).max(12) as usize;
            let len = len.min(buf.remaining());
            let second_half = buf.copy_to_bytes(len);
            let second_half = &second_half[..second_half.len().min(12)];
            challenge[8..8 + second_half.len()].copy_from_slice(second_half);
            if buf.has_remaining() && buf.first().copied() == Some(0) {
                buf.advance(1);
            }
        }

        let auth_plugin_name = if capabilities.contains(Capabilities::PLUGIN_AUTH) && buf.has_remaining() {
            Some(buf.get_str_nul()?)
        } else {
            None
        };

        Ok(Handshake {
            protocol_version,
            server_version,
            connection_id,
            capabilities,
            status,
            challenge,
            auth_plugin_name,
        })
    }
}
