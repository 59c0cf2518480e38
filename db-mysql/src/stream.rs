use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use db_core::{Error, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// The framed packet transport underneath one connection: `[len:3 LE][seq:1][payload]`.
///
/// Any short read, short write, or deadline expiry is reported to the caller
/// as [`Error::Unavailable`]; the caller (the owning [`crate::connection::MySqlConnection`])
/// is responsible for latching its `undefined` flag in response — the stream
/// itself has no notion of "poisoned", only of "this one call failed".
pub struct MySqlStream {
    socket: TcpStream,
}

const MAX_PACKET_BODY: usize = 0x00FF_FFFF;

impl MySqlStream {
    pub async fn connect(addr: SocketAddr, connect_timeout: Duration) -> Result<Self> {
        let socket = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectFailed(std::io::Error::from(std::io::ErrorKind::TimedOut)))?
            .map_err(Error::ConnectFailed)?;
        socket.set_nodelay(true).ok();
        Ok(Self { socket })
    }

    /// Reads exactly one packet and returns its sequence number and payload.
    pub async fn read_packet(&mut self, timeout: Duration) -> Result<(u8, Bytes)> {
        let mut header = [0u8; 4];
        timed(timeout, self.socket.read_exact(&mut header)).await?;

        let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
        let seq = header[3];

        let mut payload = BytesMut::zeroed(len);
        timed(timeout, self.socket.read_exact(&mut payload)).await?;

        Ok((seq, payload.freeze()))
    }

    /// Writes one packet, resetting the sequence to 0 (a new client-initiated
    /// exchange) unless `seq` is given explicitly (the login reply uses 1).
    pub async fn write_packet(&mut self, seq: u8, payload: &[u8], timeout: Duration) -> Result<()> {
        if payload.len() > MAX_PACKET_BODY {
            return Err(Error::Unknown("packet payload exceeds 16MiB, split frames are not supported".to_owned()));
        }

        let mut header = [0u8; 4];
        header[0] = payload.len() as u8;
        header[1] = (payload.len() >> 8) as u8;
        header[2] = (payload.len() >> 16) as u8;
        header[3] = seq;

        timed(timeout, self.socket.write_all(&header)).await?;
        timed(timeout, self.socket.write_all(payload)).await?;
        timed(timeout, self.socket.flush()).await?;
        Ok(())
    }

    pub async fn write_command(&mut self, payload: &[u8], timeout: Duration) -> Result<()> {
        self.write_packet(0, payload, timeout).await
    }

    pub async fn shutdown(&mut self) {
        let _ = self.socket.shutdown().await;
    }
}

async fn timed<F, T>(timeout: Duration, fut: F) -> Result<T>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) | Err(_) => Err(Error::Unavailable),
    }
}
