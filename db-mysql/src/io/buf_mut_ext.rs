use bytes::BufMut;

/// Length-encoded-integer and length-encoded-string encoders layered on top
/// of [`bytes::BufMut`]. Always chooses the narrowest tier that fits.
pub trait BufMutExt: BufMut {
    fn put_uint_lenenc(&mut self, value: u64) {
        if value < 0xFB {
            self.put_u8(value as u8);
        } else if value <= 0xFFFF {
            self.put_u8(0xFC);
            self.put_uint_le(value, 2);
        } else if value <= 0x00FF_FFFF {
            self.put_u8(0xFD);
            self.put_uint_le(value, 3);
        } else {
            self.put_u8(0xFE);
            self.put_uint_le(value, 8);
        }
    }

    fn put_bytes_lenenc(&mut self, bytes: &[u8]) {
        self.put_uint_lenenc(bytes.len() as u64);
        self.put_slice(bytes);
    }

    fn put_str_nul(&mut self, s: &str) {
        self.put_slice(s.as_bytes());
        self.put_u8(0);
    }
}

impl<T: BufMut + ?Sized> BufMutExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenenc_int_tiers_round_trip() {
        use crate::io::buf_ext::BufExt;
        use bytes::{Bytes, BytesMut};

        for v in [0u64, 0xFA, 0xFB, 0xFFFF, 0x1_0000, 0x00FF_FFFF, 0x0100_0000, u64::MAX] {
            let mut buf = BytesMut::new();
            buf.put_uint_lenenc(v);
            let mut frozen: Bytes = buf.freeze();
            assert_eq!(frozen.get_uint_lenenc(), Some(v), "round trip of {v:#x}");
        }
    }
}
