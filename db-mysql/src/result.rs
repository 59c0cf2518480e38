use db_core::{Column, DbType, Error, Result, Value};
use tracing::trace;

use crate::connection::MySqlConnection;
use crate::io::BufExt;
use crate::protocol::{decode_binary_row, decode_text_row, ColumnDefinition, Command, StatusPacket, Status};

/// One decoded row: a positional vector of values, in column order.
pub type Row = Vec<Value>;

/// One query's worth of result-sets, as they stream off `conn`. At most one
/// `MySqlResult` can be alive per connection at a time — the borrow checker
/// enforces that statically, since this holds `&mut MySqlConnection`.
///
/// Call [`fetch_columns`](Self::fetch_columns) to advance into the next
/// result-set, then [`fetch_rows`](Self::fetch_rows) repeatedly to drain its
/// rows. Drop without calling [`close`](Self::close) poisons the connection
/// if anything was left unread, since there is no safe way to drain
/// asynchronously from a synchronous destructor.
pub struct MySqlResult<'c> {
    conn: &'c mut MySqlConnection,
    num_columns: usize,
    columns: Option<Vec<Column>>,
    column_types: Vec<DbType>,
    rows: Vec<Row>,
    by_fetch: bool,
    rows_done: bool,
    has_more: bool,
    statement_id: u32,
}

impl<'c> MySqlResult<'c> {
    pub(crate) fn new(conn: &'c mut MySqlConnection, num_columns: usize, statement_id: u32) -> Self {
        MySqlResult {
            conn,
            num_columns,
            columns: None,
            column_types: Vec::new(),
            rows: Vec::new(),
            by_fetch: false,
            rows_done: true,
            has_more: false,
            statement_id,
        }
    }

    /// Reads the column-definition block (and, for the first call, consumes
    /// the already-known leading column count; for later calls, reads the
    /// next result-set's column count off the wire) and returns the decoded
    /// columns. Returns [`Error::NoData`] once every result-set has been
    /// consumed.
    pub async fn fetch_columns(&mut self) -> Result<&[Column]> {
        if self.conn.is_undefined() {
            return Err(Error::Unknown("connection is poisoned".to_owned()));
        }

        if !(self.num_columns > 0 && self.columns.is_none()) {
            if !self.rows_done {
                return Err(Error::OutOfSync);
            }
            if !self.has_more {
                return Err(Error::NoData);
            }

            let (_seq, payload) = self.read_packet().await?;
            match StatusPacket::classify(payload) {
                StatusPacket::Err(err) => {
                    self.conn.record_error(err.0.clone());
                    return Err(Error::Failed(err.0));
                }
                StatusPacket::Other(mut bytes) => {
                    self.num_columns = bytes
                        .get_uint_lenenc()
                        .ok_or_else(|| Error::Unknown("missing column count".to_owned()))?
                        as usize;
                }
                _ => {
                    self.conn.poison();
                    return Err(Error::Unknown("unexpected packet at result-set boundary".to_owned()));
                }
            }
        }

        self.by_fetch = false;
        self.rows_done = false;
        self.has_more = false;

        let mut columns = Vec::with_capacity(self.num_columns);
        let mut column_types = Vec::with_capacity(self.num_columns);

        for _ in 0..self.num_columns {
            let (_seq, payload) = match self.read_packet().await {
                Ok(p) => p,
                Err(e) => {
                    self.conn.poison();
                    return Err(e);
                }
            };
            let def = match ColumnDefinition::read(payload) {
                Ok(def) => def,
                Err(e) => {
                    self.conn.poison();
                    return Err(e);
                }
            };
            column_types.push(def.type_id.detect());
            columns.push(def.into_column());
        }

        let (_seq, eof_payload) = self.read_packet().await?;
        match StatusPacket::classify(eof_payload) {
            StatusPacket::Eof(eof) => {
                self.by_fetch = eof.status.contains(Status::CURSOR_EXISTS);
            }
            _ => {
                self.conn.poison();
                return Err(Error::Unknown("expected EOF after column definitions".to_owned()));
            }
        }

        self.columns = Some(columns);
        self.column_types = column_types;
        Ok(self.columns.as_deref().unwrap())
    }

    /// Reads up to `max` rows of the current result-set (`max == 0` drains
    /// it entirely). Returns [`Error::OutOfSync`] if called before
    /// [`fetch_columns`](Self::fetch_columns), [`Error::NoData`] if the
    /// current result-set is already exhausted.
    pub async fn fetch_rows(&mut self, max: usize) -> Result<&[Row]> {
        if self.columns.is_none() {
            return Err(Error::OutOfSync);
        }
        if self.rows_done {
            return Err(Error::NoData);
        }

        self.rows.clear();

        if self.by_fetch {
            let mut payload = Vec::with_capacity(9);
            payload.push(Command::StmtFetch as u8);
            payload.extend_from_slice(&self.statement_id.to_le_bytes());
            payload.extend_from_slice(&(max as u32).to_le_bytes());
            if let Err(e) = self.conn.stream.write_command(&payload, self.conn.timeout).await {
                self.conn.poison();
                return Err(e);
            }
        }

        loop {
            let (_seq, payload) = match self.read_packet().await {
                Ok(p) => p,
                Err(e) => {
                    self.conn.poison();
                    return Err(e);
                }
            };

            match StatusPacket::classify_row(payload) {
                StatusPacket::Err(err) => {
                    self.columns = None;
                    self.rows.clear();
                    self.conn.record_error(err.0.clone());
                    self.conn.poison();
                    return Err(Error::Failed(err.0));
                }
                StatusPacket::Eof(eof) => {
                    self.has_more = eof.status.contains(Status::MORE_RESULTS_EXISTS);
                    self.rows_done = true;
                    break;
                }
                StatusPacket::Other(bytes) => {
                    let row = if self.statement_id == 0 {
                        decode_text_row(bytes, &self.column_types)?
                    } else {
                        decode_binary_row(bytes, &self.column_types)?
                    };
                    self.rows.push(row);
                }
                StatusPacket::Ok(_) => unreachable!("classify_row never produces Ok"),
            }

            if max > 0 && self.rows.len() >= max {
                break;
            }
        }

        trace!(rows = self.rows.len(), "fetched rows");
        Ok(&self.rows)
    }

    /// Drains every remaining row and every following result-set so the
    /// connection's byte stream is realigned at the next packet boundary.
    /// This is the only way to safely finish using a `MySqlResult` without
    /// poisoning the connection.
    pub async fn close(mut self) -> Result<()> {
        self.drain().await
    }

    async fn drain(&mut self) -> Result<()> {
        if self.columns.is_some() && !self.rows_done {
            self.fetch_rows(0).await?;
        }

        loop {
            match self.fetch_columns().await {
                Ok(_) => {
                    self.fetch_rows(0).await?;
                }
                Err(Error::NoData) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    async fn read_packet(&mut self) -> Result<(u8, bytes::Bytes)> {
        self.conn.stream.read_packet(self.conn.timeout).await
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn is_fully_drained(&self) -> bool {
        self.rows_done && !self.has_more
    }
}

impl Drop for MySqlResult<'_> {
    fn drop(&mut self) {
        if !self.is_fully_drained() {
            self.conn.poison();
        }
    }
}
