use bytes::{BufMut, BytesMut};
use db_core::Value;

use super::command::Command;
use super::type_id::TypeId;
use crate::io::BufMutExt;
use crate::statement::BoundParam;

const ITERATION_COUNT: u32 = 1;

/// Encodes a `COM_STMT_EXECUTE` payload for one statement invocation: header,
/// null bitmap, optional type block, and the inline binary-protocol payload
/// for every non-null, non-long-data parameter.
pub fn encode_execute(statement_id: u32, params: &[BoundParam], new_params_bound: bool) -> BytesMut {
    let mut buf = BytesMut::new();

    buf.put_u8(Command::StmtExecute as u8);
    buf.put_u32_le(statement_id);
    buf.put_u8(0); // flags: CURSOR_TYPE_NO_CURSOR
    buf.put_u32_le(ITERATION_COUNT);

    if !params.is_empty() {
        let bitmap_len = (params.len() + 7) / 8;
        let mut bitmap = vec![0u8; bitmap_len];
        for (i, param) in params.iter().enumerate() {
            if param.is_null() {
                bitmap[i / 8] |= 1 << (i % 8);
            }
        }
        buf.put_slice(&bitmap);

        buf.put_u8(new_params_bound as u8);
        if new_params_bound {
            for param in params {
                let type_id = TypeId::for_bind(param.ty);
                buf.put_u8(type_id.0);
                buf.put_u8(0); // unsigned flag: this driver only binds signed values
            }
        }

        for param in params {
            if param.is_null() || param.is_long_data() {
                continue;
            }
            encode_value(&mut buf, param.value.as_ref().expect("checked non-null above"));
        }
    }

    buf
}

fn encode_value(buf: &mut BytesMut, value: &Value) {
    match value {
        Value::Null(_) => {}
        Value::Bool(v) => buf.put_u8(*v as u8),
        Value::Byte(v) => buf.put_i8(*v),
        Value::Short(v) => buf.put_i16_le(*v),
        Value::Int(v) => buf.put_i32_le(*v),
        Value::Int64(v) => buf.put_i64_le(*v),
        Value::Float(v) => buf.put_f32_le(*v),
        Value::Double(v) => buf.put_f64_le(*v),
        Value::Time(t) => {
            if t.days == 0 && t.hours == 0 && t.minutes == 0 && t.seconds == 0 && t.microseconds == 0 {
                buf.put_u8(0);
                return;
            }
            let len = if t.microseconds != 0 { 12u8 } else { 8 };
            buf.put_u8(len);
            buf.put_u8(t.is_negative as u8);
            buf.put_u32_le(t.days);
            buf.put_u8(t.hours);
            buf.put_u8(t.minutes);
            buf.put_u8(t.seconds);
            if len == 12 {
                buf.put_u32_le(t.microseconds);
            }
        }
        Value::Date(d) | Value::DateTime(d) | Value::Timestamp(d) => {
            let has_time = d.hour != 0 || d.minute != 0 || d.second != 0 || d.microsecond != 0;
            if d.year == 0 && d.month == 0 && d.day == 0 && !has_time {
                buf.put_u8(0);
                return;
            }
            let len = if d.microsecond != 0 {
                11u8
            } else if has_time {
                7
            } else {
                4
            };
            buf.put_u8(len);
            buf.put_u16_le(d.year);
            buf.put_u8(d.month);
            buf.put_u8(d.day);
            if len >= 7 {
                buf.put_u8(d.hour);
                buf.put_u8(d.minute);
                buf.put_u8(d.second);
            }
            if len == 11 {
                buf.put_u32_le(d.microsecond);
            }
        }
        Value::String(s) => buf.put_bytes_lenenc(s.as_bytes()),
        Value::Binary(b) => buf.put_bytes_lenenc(b),
    }
}
