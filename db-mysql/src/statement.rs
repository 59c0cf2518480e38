use bytes::{BufMut, BytesMut};
use db_core::{Column, DbType, Error, Result, Value};
use tracing::{instrument, trace};

use crate::connection::MySqlConnection;
use crate::protocol::{encode_execute, ColumnDefinition, Command, PrepareOkPacket, StatusPacket};
use crate::result::MySqlResult;

/// One parameter slot: its currently bound value (`None` means SQL NULL),
/// the `DbType` used to tag it in the next execute's type block, and whether
/// its payload was instead streamed out-of-band via `bind_blob`.
#[derive(Debug, Clone)]
pub(crate) struct BoundParam {
    pub(crate) value: Option<Value>,
    pub(crate) ty: DbType,
    long_data: bool,
}

impl BoundParam {
    fn null(ty: DbType) -> Self {
        BoundParam {
            value: None,
            ty,
            long_data: false,
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        self.value.is_none() && !self.long_data
    }

    pub(crate) fn is_long_data(&self) -> bool {
        self.long_data
    }
}

/// A prepared statement bound to its owning connection. Holds the
/// server-assigned statement id, per-parameter metadata and current bound
/// values, and the `params_changed` bit that decides whether the next
/// `exec` resends the type block.
pub struct MySqlStatement<'c> {
    conn: &'c mut MySqlConnection,
    statement_id: u32,
    param_meta: Vec<Column>,
    params: Vec<BoundParam>,
    params_changed: bool,
}

fn integer_family(ty: DbType) -> bool {
    matches!(ty, DbType::Bool | DbType::Byte | DbType::Short | DbType::Int | DbType::Int64)
}

fn integer_width_bits(ty: DbType) -> u32 {
    match ty {
        DbType::Bool | DbType::Byte => 8,
        DbType::Short => 16,
        DbType::Int => 32,
        DbType::Int64 => 64,
        _ => 64,
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(v) => Some(*v as i64),
        Value::Byte(v) => Some(*v as i64),
        Value::Short(v) => Some(*v as i64),
        Value::Int(v) => Some(*v as i64),
        Value::Int64(v) => Some(*v),
        _ => None,
    }
}

impl<'c> MySqlStatement<'c> {
    #[instrument(skip(conn, sql), fields(sql = %sql))]
    pub(crate) async fn prepare(conn: &'c mut MySqlConnection, sql: &str) -> Result<Self> {
        if conn.is_undefined() {
            return Err(Error::Unavailable);
        }

        let mut payload = BytesMut::with_capacity(sql.len() + 1);
        payload.put_u8(Command::StmtPrepare as u8);
        payload.put_slice(sql.as_bytes());

        if let Err(e) = conn.stream.write_command(&payload, conn.timeout).await {
            conn.poison();
            return Err(e);
        }

        let (_seq, reply) = match conn.stream.read_packet(conn.timeout).await {
            Ok(p) => p,
            Err(e) => {
                conn.poison();
                return Err(e);
            }
        };

        let prepare_ok = match StatusPacket::classify(reply.clone()) {
            StatusPacket::Err(err) => {
                conn.record_error(err.0.clone());
                return Err(Error::Failed(err.0));
            }
            _ => PrepareOkPacket::read(reply)?,
        };

        let mut param_meta = Vec::with_capacity(prepare_ok.num_params as usize);
        if prepare_ok.num_params > 0 {
            for _ in 0..prepare_ok.num_params {
                let (_seq, p) = match conn.stream.read_packet(conn.timeout).await {
                    Ok(p) => p,
                    Err(e) => {
                        conn.poison();
                        return Err(e);
                    }
                };
                let def = ColumnDefinition::read(p).map_err(|e| {
                    conn.poison();
                    e
                })?;
                param_meta.push(def.into_column());
            }
            Self::expect_eof(conn).await?;
        }

        if prepare_ok.num_columns > 0 {
            // The result-set's own columns; discarded here, re-read by the
            // caller via `MySqlResult::fetch_columns` after `exec`.
            for _ in 0..prepare_ok.num_columns {
                if let Err(e) = conn.stream.read_packet(conn.timeout).await {
                    conn.poison();
                    return Err(e);
                }
            }
            Self::expect_eof(conn).await?;
        }

        let params = param_meta.iter().map(|c| BoundParam::null(c.ty)).collect();

        trace!(statement_id = prepare_ok.statement_id, num_params = prepare_ok.num_params, "prepared");

        Ok(MySqlStatement {
            conn,
            statement_id: prepare_ok.statement_id,
            param_meta,
            params,
            params_changed: false,
        })
    }

    async fn expect_eof(conn: &mut MySqlConnection) -> Result<()> {
        let (_seq, payload) = match conn.stream.read_packet(conn.timeout).await {
            Ok(p) => p,
            Err(e) => {
                conn.poison();
                return Err(e);
            }
        };
        match StatusPacket::classify(payload) {
            StatusPacket::Eof(_) => Ok(()),
            _ => {
                conn.poison();
                Err(Error::Unknown("expected EOF after parameter/column definitions".to_owned()))
            }
        }
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut BoundParam> {
        self.params.get_mut(index).ok_or(Error::OutOfIndex)
    }

    /// Binds `value` at `index`, applying the idempotence, type-mismatch,
    /// and integer-narrowing rules from the statement's binder laws. The
    /// mismatch/narrowing check is keyed on the server's own parameter
    /// metadata from `COM_STMT_PREPARE` (`param_meta[index].ty`), captured
    /// at prepare time.
    fn bind_value(&mut self, index: usize, new_value: Value) -> Result<()> {
        let new_ty = new_value.ty();
        let declared_ty = self.param_meta.get(index).ok_or(Error::OutOfIndex)?.ty;
        let slot = self.slot_mut(index)?;

        if let Some(current) = &slot.value {
            if !slot.is_long_data() && *current == new_value {
                return Ok(());
            }
        }

        if integer_family(declared_ty) {
            if !integer_family(new_ty) {
                return Err(Error::Mismatch);
            }
            if let Some(v) = integer_value(&new_value) {
                let target_bits = integer_width_bits(declared_ty);
                if target_bits < 64 {
                    // Round-trip through a sign-extended shift of the
                    // target width: any mismatch means bits outside
                    // that width were significant, i.e. the narrowing
                    // loses information.
                    let shift = 64 - target_bits;
                    let truncated = (v << shift) >> shift;
                    if truncated != v {
                        return Err(Error::TooLong);
                    }
                }
            }
        } else if declared_ty != new_ty {
            return Err(Error::Mismatch);
        }

        slot.value = Some(new_value);
        slot.ty = new_ty;
        slot.long_data = false;
        self.params_changed = true;
        Ok(())
    }

    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        let slot = self.slot_mut(index)?;
        if slot.is_null() {
            return Ok(());
        }
        slot.value = None;
        slot.long_data = false;
        self.params_changed = true;
        Ok(())
    }

    pub fn bind_bool(&mut self, index: usize, v: bool) -> Result<()> {
        self.bind_value(index, Value::Bool(v))
    }

    pub fn bind_byte(&mut self, index: usize, v: i8) -> Result<()> {
        self.bind_value(index, Value::Byte(v))
    }

    pub fn bind_short(&mut self, index: usize, v: i16) -> Result<()> {
        self.bind_value(index, Value::Short(v))
    }

    pub fn bind_int(&mut self, index: usize, v: i32) -> Result<()> {
        self.bind_value(index, Value::Int(v))
    }

    pub fn bind_int64(&mut self, index: usize, v: i64) -> Result<()> {
        self.bind_value(index, Value::Int64(v))
    }

    pub fn bind_float(&mut self, index: usize, v: f32) -> Result<()> {
        self.bind_value(index, Value::Float(v))
    }

    pub fn bind_double(&mut self, index: usize, v: f64) -> Result<()> {
        self.bind_value(index, Value::Double(v))
    }

    pub fn bind_time(&mut self, index: usize, v: db_core::DbTime) -> Result<()> {
        self.bind_value(index, Value::Time(v))
    }

    pub fn bind_date(&mut self, index: usize, v: db_core::DbDate) -> Result<()> {
        self.bind_value(index, Value::Date(v))
    }

    pub fn bind_datetime(&mut self, index: usize, v: db_core::DbDate) -> Result<()> {
        self.bind_value(index, Value::DateTime(v))
    }

    pub fn bind_timestamp(&mut self, index: usize, v: db_core::DbDate) -> Result<()> {
        self.bind_value(index, Value::Timestamp(v))
    }

    pub fn bind_string(&mut self, index: usize, v: impl Into<String>) -> Result<()> {
        self.bind_value(index, Value::String(v.into()))
    }

    pub fn bind_binary(&mut self, index: usize, v: impl Into<Vec<u8>>) -> Result<()> {
        self.bind_value(index, Value::Binary(v.into()))
    }

    /// Streams `bytes` to the server as a long-data chunk for parameter
    /// `index`, bypassing the value vector. Repeated calls append on the
    /// server side; the following `exec` sends this parameter's type code
    /// with no inline payload.
    pub async fn bind_blob(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        if index >= self.params.len() {
            return Err(Error::OutOfIndex);
        }

        let mut payload = Vec::with_capacity(7 + bytes.len());
        payload.push(Command::StmtSendLongData as u8);
        payload.extend_from_slice(&self.statement_id.to_le_bytes());
        payload.extend_from_slice(&(index as u16).to_le_bytes());
        payload.extend_from_slice(bytes);

        if let Err(e) = self.conn.stream.write_command(&payload, self.conn.timeout).await {
            self.conn.poison();
            return Err(e);
        }

        let slot = self.slot_mut(index)?;
        slot.long_data = true;
        slot.value = None;
        slot.ty = DbType::Binary;
        self.params_changed = true;
        Ok(())
    }

    /// Executes the statement with the binary protocol. Rows in the
    /// returned result (if any) decode per `column_types` captured from the
    /// result-set's own column-definition block, read by the caller via
    /// `MySqlResult::fetch_columns`.
    #[instrument(skip(self), fields(statement_id = self.statement_id))]
    pub async fn exec(&mut self) -> Result<Option<MySqlResult<'_>>> {
        let payload = encode_execute(self.statement_id, &self.params, self.params_changed);
        let result = self.conn.send_command_and_read_reply(&payload, self.statement_id).await?;
        self.params_changed = false;
        Ok(result)
    }

    /// Sends `COM_STMT_RESET`, discarding any long-data accumulated so far
    /// on the server and freeing every bound value locally.
    pub async fn reset(&mut self) -> Result<()> {
        for i in 0..self.params.len() {
            let _ = self.bind_null(i);
        }

        let mut payload = BytesMut::with_capacity(5);
        payload.put_u8(Command::StmtReset as u8);
        payload.put_u32_le(self.statement_id);

        if let Err(e) = self.conn.stream.write_command(&payload, self.conn.timeout).await {
            self.conn.poison();
            return Err(e);
        }

        let (_seq, reply) = match self.conn.stream.read_packet(self.conn.timeout).await {
            Ok(p) => p,
            Err(e) => {
                self.conn.poison();
                return Err(e);
            }
        };

        match StatusPacket::expect_status(reply)? {
            StatusPacket::Ok(_) => Ok(()),
            StatusPacket::Err(err) => {
                self.conn.record_error(err.0.clone());
                Err(Error::Failed(err.0))
            }
            _ => {
                self.conn.poison();
                Err(Error::Unknown("unexpected packet replying to COM_STMT_RESET".to_owned()))
            }
        }
    }

    /// Sends `COM_STMT_CLOSE`, which the server never replies to.
    pub async fn close(self) {
        let mut payload = BytesMut::with_capacity(5);
        payload.put_u8(Command::StmtClose as u8);
        payload.put_u32_le(self.statement_id);
        let _ = self.conn.stream.write_command(&payload, self.conn.timeout).await;
    }
}
