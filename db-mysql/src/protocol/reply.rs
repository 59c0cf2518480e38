use bytes::Bytes;
use db_core::{Error, Result};

use super::eof::{is_eof_header, EofPacket};
use super::err::{is_err_header, ErrPacket};
use super::ok::{is_ok_header, OkPacket};

/// The classification of a packet read at a status boundary: the next
/// packet after a command is always one of these three framing-level kinds,
/// or `Other` (a row, a column count, a column definition) when the caller
/// expects that instead.
#[derive(Debug, Clone)]
pub enum StatusPacket {
    Ok(OkPacket),
    Eof(EofPacket),
    Err(ErrPacket),
    Other(Bytes),
}

impl StatusPacket {
    /// Classifies `payload` by its first byte. `Other` is returned verbatim
    /// (not consumed) so the caller can still decode it as a row or a
    /// column count.
    pub fn classify(payload: Bytes) -> Self {
        let first = payload.first().copied().unwrap_or(0xFF);
        if is_ok_header(first) {
            if let Ok(ok) = OkPacket::read(payload.clone()) {
                return StatusPacket::Ok(ok);
            }
        }
        if is_err_header(first) {
            if let Ok(err) = ErrPacket::read(payload.clone()) {
                return StatusPacket::Err(err);
            }
        }
        if is_eof_header(first, payload.len().saturating_sub(1)) {
            if let Ok(eof) = EofPacket::read(payload.clone()) {
                return StatusPacket::Eof(eof);
            }
        }
        StatusPacket::Other(payload)
    }

    /// Classifies a packet read inside a row stream (`fetch_rows`'s loop),
    /// where a leading `0x00` belongs to the row itself — the binary
    /// protocol's null-bitmap byte, or a text row whose first column is an
    /// empty string — and must never be mistaken for an OK terminator.
    /// Only `0xFF` (ERR) and a short `0xFE` payload (EOF) end the stream;
    /// everything else is a row, decoded by the caller.
    pub fn classify_row(payload: Bytes) -> Self {
        let first = payload.first().copied().unwrap_or(0xFF);
        if is_err_header(first) {
            if let Ok(err) = ErrPacket::read(payload.clone()) {
                return StatusPacket::Err(err);
            }
        }
        if is_eof_header(first, payload.len().saturating_sub(1)) {
            if let Ok(eof) = EofPacket::read(payload.clone()) {
                return StatusPacket::Eof(eof);
            }
        }
        StatusPacket::Other(payload)
    }

    /// Reads a packet that MUST be OK, EOF, or ERR — anything else is a
    /// protocol violation (`Unknown`) at this boundary.
    pub fn expect_status(payload: Bytes) -> Result<Self> {
        match Self::classify(payload) {
            StatusPacket::Other(bytes) => Err(Error::Unknown(format!(
                "expected OK/EOF/ERR packet, got header {:#x}",
                bytes.first().copied().unwrap_or(0)
            ))),
            other => Ok(other),
        }
    }
}
