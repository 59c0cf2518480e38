use bytes::Buf;
use db_core::{Error, Result};

/// Length-encoded-integer and length-encoded-string helpers layered on top of
/// [`bytes::Buf`]. A `0xFB` first octet is MySQL's NULL sentinel and is
/// reported as `None`, never as a zero value.
pub trait BufExt: Buf {
    fn get_uint_lenenc(&mut self) -> Option<u64> {
        match self.get_u8() {
            0xFB => None,
            0xFC => Some(self.get_uint_le(2)),
            0xFD => Some(self.get_uint_le(3)),
            0xFE => Some(self.get_uint_le(8)),
            b => Some(u64::from(b)),
        }
    }

    fn get_bytes_lenenc(&mut self) -> Option<bytes::Bytes> {
        let len = self.get_uint_lenenc()?;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        Some(self.copy_to_bytes(len))
    }

    fn get_str_lenenc(&mut self) -> Result<Option<String>> {
        match self.get_bytes_lenenc() {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| Error::Unknown(format!("invalid utf-8 in lenenc string: {e}"))),
        }
    }

    /// Reads bytes up to (and consuming) the next NUL byte.
    fn get_bytes_nul(&mut self) -> Result<bytes::Bytes> {
        let chunk = self.chunk();
        let nul = memchr::memchr(0, chunk)
            .ok_or_else(|| Error::Unknown("missing NUL terminator".to_owned()))?;
        let out = self.copy_to_bytes(nul);
        self.advance(1);
        Ok(out)
    }

    fn get_str_nul(&mut self) -> Result<String> {
        let bytes = self.get_bytes_nul()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Unknown(format!("invalid utf-8 in NUL-terminated string: {e}")))
    }
}

impl<T: Buf + ?Sized> BufExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn lenenc_int_tiers() {
        let mut buf = Bytes::from_static(&[0x05]);
        assert_eq!(buf.get_uint_lenenc(), Some(5));

        let mut buf = Bytes::from_static(&[0xFC, 0xFF, 0xFF]);
        assert_eq!(buf.get_uint_lenenc(), Some(0xFFFF));

        let mut buf = Bytes::from_static(&[0xFD, 0x00, 0x00, 0x01]);
        assert_eq!(buf.get_uint_lenenc(), Some(0x0001_0000));

        let mut buf = Bytes::from_static(&[0xFD, 0xFF, 0xFF, 0xFF]);
        assert_eq!(buf.get_uint_lenenc(), Some(0x00FF_FFFF));

        let mut buf = Bytes::from_static(&[0xFE, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(buf.get_uint_lenenc(), Some(1));

        let mut buf = Bytes::from_static(&[0xFB]);
        assert_eq!(buf.get_uint_lenenc(), None);
    }

    #[test]
    fn nul_terminated_string() {
        let mut buf = Bytes::from_static(b"root\0rest");
        assert_eq!(buf.get_str_nul().unwrap(), "root");
        assert_eq!(&buf[..], b"rest");
    }
}
