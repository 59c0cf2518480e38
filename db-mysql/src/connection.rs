use std::net::ToSocketAddrs;
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use db_core::{Error, Result, ServerError};
use tracing::{debug, instrument, trace};

use crate::protocol::{
    caching_sha2_password_proof, native_password_proof, AuthSwitchRequest, Command, Handshake,
    HandshakeResponse, StatusPacket,
};
use crate::io::BufExt;
use crate::result::MySqlResult;
use crate::statement::MySqlStatement;
use crate::stream::MySqlStream;

/// Credentials and connect-time parameters the [`crate::session::MySqlSession`]
/// passes down when it needs a fresh socket. Distinct from
/// [`crate::options::MySqlConnectOptions`], which is the user-facing,
/// URL-parseable configuration this is derived from.
#[derive(Debug, Clone)]
pub struct MySqlConnectParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

/// One exclusively-owned MySQL connection. Optionally parked in a
/// [`crate::pool::Pool`] between uses. Once [`MySqlConnection::undefined`]
/// latches, every subsequent operation returns [`Error::Unavailable`] and the
/// connection must be destroyed rather than reused.
pub struct MySqlConnection {
    pub(crate) stream: MySqlStream,
    pub(crate) timeout: Duration,
    pub(crate) undefined: bool,
    last_error: Option<ServerError>,
    affected_rows: u64,
    last_insert_id: u64,
}

impl MySqlConnection {
    #[instrument(skip_all, fields(host = %params.host, port = params.port))]
    pub async fn establish(params: &MySqlConnectParams) -> Result<Self> {
        let addr = (params.host.as_str(), params.port)
            .to_socket_addrs()
            .map_err(Error::ConnectFailed)?
            .next()
            .ok_or_else(|| Error::ConnectFailed(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))?;

        let mut stream = MySqlStream::connect(addr, params.connect_timeout).await?;

        let (_seq, greeting) = stream.read_packet(params.timeout).await?;
        let handshake = Handshake::read(greeting)?;
        trace!(server_version = %handshake.server_version, "received greeting");

        let password = params.password.as_deref().unwrap_or("").as_bytes();
        let proof = if password.is_empty() {
            Vec::new()
        } else {
            native_password_proof(password, &handshake.challenge).to_vec()
        };

        let response = HandshakeResponse {
            username: &params.username,
            database: params.database.as_deref(),
            auth_response: &proof,
            auth_plugin_name: "mysql_native_password",
        };
        let payload = response.encode();
        stream.write_packet(1, &payload, params.timeout).await?;

        let (seq, reply) = stream.read_packet(params.timeout).await?;

        // A server whose account defaults to `caching_sha2_password` (or
        // any plugin other than the `mysql_native_password` this driver
        // offers up front) replies with an AuthSwitchRequest (header 0xFE)
        // instead of the usual OK/ERR; recompute the proof under the
        // plugin it names and resend once.
        let (_seq, reply) = if reply.first().copied() == Some(0xFE) {
            let switch = AuthSwitchRequest::read(reply)?;
            let challenge = switch.challenge();
            let proof = if password.is_empty() {
                Vec::new()
            } else if switch.plugin_name == "caching_sha2_password" {
                caching_sha2_password_proof(password, &challenge).to_vec()
            } else {
                native_password_proof(password, &challenge).to_vec()
            };
            stream.write_packet(seq + 1, &proof, params.timeout).await?;
            stream.read_packet(params.timeout).await?
        } else {
            (seq, reply)
        };

        match StatusPacket::classify(reply) {
            StatusPacket::Ok(ok) => {
                debug!("handshake complete");
                Ok(MySqlConnection {
                    stream,
                    timeout: params.timeout,
                    undefined: false,
                    last_error: None,
                    affected_rows: ok.affected_rows,
                    last_insert_id: ok.last_insert_id,
                })
            }
            StatusPacket::Err(err) => Err(Error::Failed(err.0)),
            _ => Err(Error::NotSupported),
        }
    }

    pub fn last_error(&self) -> Option<&ServerError> {
        self.last_error.as_ref()
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    pub fn is_undefined(&self) -> bool {
        self.undefined
    }

    fn check_alive(&self) -> Result<()> {
        if self.undefined {
            return Err(Error::Unavailable);
        }
        Ok(())
    }

    /// Sends a raw command packet with sequence 0 and reads the "first
    /// reply" that follows, per §4.5: ERR records the error and returns
    /// `Failed`; OK captures `affected_rows`/`last_insert_id` and returns
    /// `Ok(None)`; anything else is the leading column count of a result-set.
    pub(crate) async fn send_command_and_read_reply(
        &mut self,
        payload: &[u8],
        statement_id: u32,
    ) -> Result<Option<MySqlResult<'_>>> {
        self.check_alive()?;

        if let Err(e) = self.stream.write_command(payload, self.timeout).await {
            self.undefined = true;
            return Err(e);
        }

        let (_seq, reply) = match self.stream.read_packet(self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                self.undefined = true;
                return Err(e);
            }
        };

        match StatusPacket::classify(reply) {
            StatusPacket::Err(err) => {
                self.last_error = Some(err.0.clone());
                Err(Error::Failed(err.0))
            }
            StatusPacket::Ok(ok) => {
                self.affected_rows = ok.affected_rows;
                self.last_insert_id = ok.last_insert_id;
                Ok(None)
            }
            StatusPacket::Other(mut bytes) => {
                let num_columns = bytes
                    .get_uint_lenenc()
                    .ok_or_else(|| Error::Unknown("missing column count".to_owned()))?;
                Ok(Some(MySqlResult::new(self, num_columns as usize, statement_id)))
            }
            StatusPacket::Eof(_) => Err(Error::Unknown("unexpected EOF at reply boundary".to_owned())),
        }
    }

    /// `query(sql)`: drains any pending result, sends `COM_QUERY`, reads the
    /// first reply as a text-protocol result (statement id 0).
    #[instrument(skip(self, sql), fields(sql = %sql))]
    pub async fn query(&mut self, sql: &str) -> Result<Option<MySqlResult<'_>>> {
        self.check_alive()?;

        let mut payload = BytesMut::with_capacity(sql.len() + 1);
        payload.put_u8(Command::Query as u8);
        payload.put_slice(sql.as_bytes());

        self.send_command_and_read_reply(&payload, 0).await
    }

    pub async fn begin(&mut self) -> Result<()> {
        self.query("START TRANSACTION").await.map(drop)
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.query("COMMIT").await.map(drop)
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.query("ROLLBACK").await.map(drop)
    }

    pub async fn ping(&mut self) -> Result<()> {
        self.check_alive()?;

        if let Err(e) = self.stream.write_command(&[Command::Ping as u8], self.timeout).await {
            self.undefined = true;
            return Err(e);
        }

        let (_seq, reply) = match self.stream.read_packet(self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                self.undefined = true;
                return Err(e);
            }
        };

        match StatusPacket::expect_status(reply)? {
            StatusPacket::Ok(_) => Ok(()),
            StatusPacket::Err(err) => {
                self.last_error = Some(err.0.clone());
                Err(Error::Failed(err.0))
            }
            _ => {
                self.undefined = true;
                Err(Error::Unknown("unexpected packet replying to COM_PING".to_owned()))
            }
        }
    }

    pub async fn prepare(&mut self, sql: &str) -> Result<MySqlStatement<'_>> {
        MySqlStatement::prepare(self, sql).await
    }

    /// Sends `COM_QUIT` best-effort and shuts the socket down. Used both by
    /// an explicit destroy and by `close()` when the pool has no room left.
    pub async fn destroy(mut self) {
        let _ = self.stream.write_command(&[Command::Quit as u8], self.timeout).await;
        self.stream.shutdown().await;
    }

    pub(crate) fn record_error(&mut self, err: ServerError) {
        self.last_error = Some(err);
    }

    pub(crate) fn poison(&mut self) {
        self.undefined = true;
    }
}
