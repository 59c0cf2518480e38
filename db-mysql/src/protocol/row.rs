use bytes::{Buf, Bytes};
use db_core::{DbDate, DbTime, DbType, Error, Result, Value};

use crate::io::BufExt;

/// Decodes one row of a `COM_QUERY` text-protocol result-set. `buf` is the
/// full packet payload for the row (no leading marker byte, unlike the
/// binary protocol).
pub fn decode_text_row(mut buf: Bytes, column_types: &[DbType]) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(column_types.len());

    for &ty in column_types {
        // The NULL sentinel is recognized only here, as the first byte of a
        // column's own length prefix — never by re-scanning an
        // already-length-delimited payload for a stray 0xFB.
        let Some(bytes) = buf.get_bytes_lenenc() else {
            values.push(Value::Null(ty));
            continue;
        };

        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::Unknown(format!("invalid utf-8 in text row: {e}")))?;

        values.push(parse_text_value(ty, text)?);
    }

    Ok(values)
}

fn parse_text_value(ty: DbType, text: &str) -> Result<Value> {
    let bad = |what: &str| Error::Unknown(format!("malformed {what} in text row: {text:?}"));

    // Integers are scanned with `atoi` rather than `str::parse`: a plain
    // ASCII digit scan with no locale dependence, matching how the binary
    // protocol's integers are never routed through any text conversion.
    Ok(match ty {
        DbType::Bool => Value::Bool(atoi::atoi::<i64>(text.as_bytes()).ok_or_else(|| bad("bool"))? != 0),
        DbType::Byte => Value::Byte(atoi::atoi(text.as_bytes()).ok_or_else(|| bad("tinyint"))?),
        DbType::Short => Value::Short(atoi::atoi(text.as_bytes()).ok_or_else(|| bad("smallint"))?),
        DbType::Int => Value::Int(atoi::atoi(text.as_bytes()).ok_or_else(|| bad("int"))?),
        DbType::Int64 => Value::Int64(atoi::atoi(text.as_bytes()).ok_or_else(|| bad("bigint"))?),
        DbType::Float => Value::Float(text.parse().map_err(|_| bad("float"))?),
        DbType::Double => Value::Double(text.parse().map_err(|_| bad("double"))?),
        DbType::Time => Value::Time(parse_time(text).ok_or_else(|| bad("time"))?),
        DbType::Date => Value::Date(parse_date(text).ok_or_else(|| bad("date"))?),
        DbType::DateTime => Value::DateTime(parse_date(text).ok_or_else(|| bad("datetime"))?),
        DbType::Timestamp => Value::Timestamp(parse_date(text).ok_or_else(|| bad("timestamp"))?),
        DbType::String => Value::String(text.to_owned()),
        DbType::Binary => Value::Binary(text.as_bytes().to_vec()),
    })
}

/// Parses `HH:MM:SS`, locale-independent (a plain ASCII digit scan, never
/// `sscanf`/libc float parsing). A leading `-` and a day count beyond 24h
/// (MySQL's extended TIME range) are tolerated by falling back to an hour
/// count wider than two digits.
fn parse_time(text: &str) -> Option<DbTime> {
    let (is_negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut parts = rest.splitn(3, ':');
    let hours_str = parts.next()?;
    let minutes_str = parts.next()?;
    let seconds_str = parts.next()?;

    let total_hours: u32 = hours_str.parse().ok()?;
    let minutes: u8 = minutes_str.parse().ok()?;
    let (seconds_str, microseconds) = match seconds_str.split_once('.') {
        Some((s, frac)) => (s, parse_fraction(frac)?),
        None => (seconds_str, 0),
    };
    let seconds: u8 = seconds_str.parse().ok()?;

    Some(DbTime {
        is_negative,
        days: total_hours / 24,
        hours: (total_hours % 24) as u8,
        minutes,
        seconds,
        microseconds,
    })
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS[.ffffff]`.
fn parse_date(text: &str) -> Option<DbDate> {
    let (date_part, time_part) = match text.split_once(' ') {
        Some((d, t)) => (d, Some(t)),
        None => (text, None),
    };

    let mut date_fields = date_part.splitn(3, '-');
    let year: u16 = date_fields.next()?.parse().ok()?;
    let month: u8 = date_fields.next()?.parse().ok()?;
    let day: u8 = date_fields.next()?.parse().ok()?;

    let mut out = DbDate {
        year,
        month,
        day,
        ..Default::default()
    };

    if let Some(time_part) = time_part {
        let time = parse_time(time_part)?;
        out.hour = time.hours;
        out.minute = time.minutes;
        out.second = time.seconds;
        out.microsecond = time.microseconds;
    }

    Some(out)
}

fn parse_fraction(frac: &str) -> Option<u32> {
    let mut digits = [b'0'; 6];
    let bytes = frac.as_bytes();
    let n = bytes.len().min(6);
    digits[..n].copy_from_slice(&bytes[..n]);
    std::str::from_utf8(&digits).ok()?.parse().ok()
}

/// Decodes one row of a prepared-statement binary result-set. `buf` is the
/// full packet payload, including the leading `0x00` marker byte.
pub fn decode_binary_row(mut buf: Bytes, column_types: &[DbType]) -> Result<Vec<Value>> {
    let marker = buf.get_u8();
    if marker != 0x00 {
        return Err(Error::Unknown(format!("expected binary row marker 0x00, got {marker:#x}")));
    }

    let bitmap_len = (column_types.len() + 7 + 2) / 8;
    if buf.remaining() < bitmap_len {
        return Err(Error::Unknown("binary row null bitmap truncated".to_owned()));
    }
    let bitmap = buf.copy_to_bytes(bitmap_len);

    let mut values = Vec::with_capacity(column_types.len());
    for (i, &ty) in column_types.iter().enumerate() {
        let bit = i + 2;
        let is_null = bitmap[bit / 8] & (1 << (bit % 8)) != 0;

        if is_null {
            values.push(Value::Null(ty));
            continue;
        }

        values.push(decode_binary_value(&mut buf, ty)?);
    }

    Ok(values)
}

fn decode_binary_value(buf: &mut Bytes, ty: DbType) -> Result<Value> {
    let truncated = || Error::Unknown("binary row value truncated".to_owned());

    Ok(match ty {
        DbType::Bool => {
            if buf.remaining() < 1 {
                return Err(truncated());
            }
            Value::Bool(buf.get_u8() != 0)
        }
        DbType::Byte => {
            if buf.remaining() < 1 {
                return Err(truncated());
            }
            Value::Byte(buf.get_i8())
        }
        DbType::Short => {
            if buf.remaining() < 2 {
                return Err(truncated());
            }
            Value::Short(buf.get_i16_le())
        }
        DbType::Int => {
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            Value::Int(buf.get_i32_le())
        }
        DbType::Int64 => {
            if buf.remaining() < 8 {
                return Err(truncated());
            }
            Value::Int64(buf.get_i64_le())
        }
        DbType::Float => {
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            Value::Float(buf.get_f32_le())
        }
        DbType::Double => {
            if buf.remaining() < 8 {
                return Err(truncated());
            }
            Value::Double(buf.get_f64_le())
        }
        DbType::Time => Value::Time(decode_binary_time(buf)?),
        DbType::Date => Value::Date(decode_binary_date(buf)?),
        DbType::DateTime => Value::DateTime(decode_binary_date(buf)?),
        DbType::Timestamp => Value::Timestamp(decode_binary_date(buf)?),
        DbType::String => {
            let bytes = buf.get_bytes_lenenc().ok_or_else(truncated)?;
            Value::String(
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| Error::Unknown(format!("invalid utf-8 in binary row: {e}")))?,
            )
        }
        DbType::Binary => {
            let bytes = buf.get_bytes_lenenc().ok_or_else(truncated)?;
            Value::Binary(bytes.to_vec())
        }
    })
}

fn decode_binary_time(buf: &mut Bytes) -> Result<DbTime> {
    if buf.remaining() < 1 {
        return Err(Error::Unknown("binary time value truncated".to_owned()));
    }
    let len = buf.get_u8();
    if len == 0 {
        return Ok(DbTime::default());
    }
    if len != 8 && len != 12 {
        return Err(Error::Unknown(format!("unexpected binary time length {len}")));
    }
    if buf.remaining() < len as usize {
        return Err(Error::Unknown("binary time value truncated".to_owned()));
    }

    let is_negative = buf.get_u8() != 0;
    let days = buf.get_u32_le();
    let hours = buf.get_u8();
    let minutes = buf.get_u8();
    let seconds = buf.get_u8();
    let microseconds = if len == 12 { buf.get_u32_le() } else { 0 };

    Ok(DbTime {
        is_negative,
        days,
        hours,
        minutes,
        seconds,
        microseconds,
    })
}

fn decode_binary_date(buf: &mut Bytes) -> Result<DbDate> {
    if buf.remaining() < 1 {
        return Err(Error::Unknown("binary date value truncated".to_owned()));
    }
    let len = buf.get_u8();
    if len == 0 {
        return Ok(DbDate::default());
    }
    if ![4, 7, 11].contains(&len) {
        return Err(Error::Unknown(format!("unexpected binary date length {len}")));
    }
    if buf.remaining() < len as usize {
        return Err(Error::Unknown("binary date value truncated".to_owned()));
    }

    let year = buf.get_u16_le();
    let month = buf.get_u8();
    let day = buf.get_u8();

    let (hour, minute, second, microsecond) = if len >= 7 {
        let h = buf.get_u8();
        let m = buf.get_u8();
        let s = buf.get_u8();
        let micros = if len == 11 { buf.get_u32_le() } else { 0 };
        (h, m, s, micros)
    } else {
        (0, 0, 0, 0)
    };

    Ok(DbDate {
        year,
        month,
        day,
        hour,
        minute,
        second,
        microsecond,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn text_row_null_sentinel() {
        let mut buf = BytesMut::new();
        buf.put_u8(0xFB);
        buf.put_u8(1);
        buf.put_slice(b"5");

        let row = decode_text_row(buf.freeze(), &[DbType::Int, DbType::Int]).unwrap();
        assert!(row[0].is_null());
        assert_eq!(row[1], Value::Int(5));
    }

    #[test]
    fn binary_row_null_bitmap_offset_round_trip() {
        // 3 columns, middle one null: bit (1+2)=3 set in byte 0.
        let mut buf = BytesMut::new();
        buf.put_u8(0x00);
        buf.put_u8(0b0000_1000);
        buf.put_i32_le(7);
        buf.put_i32_le(9);

        let row = decode_binary_row(buf.freeze(), &[DbType::Int, DbType::Int, DbType::Int]).unwrap();
        assert_eq!(row[0], Value::Int(7));
        assert!(row[1].is_null());
        assert_eq!(row[2], Value::Int(9));
    }

    #[test]
    fn binary_row_null_bitmap_every_column_count_and_bit() {
        for num_columns in 0..64usize {
            for null_index in 0..num_columns {
                let bitmap_len = (num_columns + 7 + 2) / 8;
                let mut bitmap = vec![0u8; bitmap_len];
                let bit = null_index + 2;
                bitmap[bit / 8] |= 1 << (bit % 8);

                let mut buf = BytesMut::new();
                buf.put_u8(0x00);
                buf.put_slice(&bitmap);
                for i in 0..num_columns {
                    if i != null_index {
                        buf.put_i32_le(i as i32);
                    }
                }

                let types = vec![DbType::Int; num_columns];
                let row = decode_binary_row(buf.freeze(), &types).unwrap();
                for (i, value) in row.iter().enumerate() {
                    if i == null_index {
                        assert!(value.is_null(), "col {i} should be null (n={num_columns})");
                    } else {
                        assert_eq!(*value, Value::Int(i as i32), "col {i} (n={num_columns})");
                    }
                }
            }
        }
    }

    #[test]
    fn date_and_time_text_parsing() {
        let d = parse_date("2024-03-05 07:08:09").unwrap();
        assert_eq!(d.year, 2024);
        assert_eq!(d.month, 3);
        assert_eq!(d.day, 5);
        assert_eq!(d.hour, 7);
        assert_eq!(d.minute, 8);
        assert_eq!(d.second, 9);

        let t = parse_time("26:01:02").unwrap();
        assert_eq!(t.days, 1);
        assert_eq!(t.hours, 2);
        assert_eq!(t.minutes, 1);
        assert_eq!(t.seconds, 2);
    }
}
