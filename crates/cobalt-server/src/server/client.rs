//! Async client for the session transport.

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use super::error::{ServerError, ServerResult};
use super::frame::{self, MAX_FRAME_SIZE};

/// A connection to a Cobalt server.
///
/// Statements are sent one at a time; each call waits for its reply.
pub struct Client {
    stream: TcpStream,
    buf: BytesMut,
    max_frame_size: usize,
}

impl Client {
    /// Connects to a server.
    pub async fn connect(addr: impl ToSocketAddrs) -> ServerResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            buf: BytesMut::with_capacity(4096),
            max_frame_size: MAX_FRAME_SIZE,
        })
    }

    /// Sets the largest reply the client accepts.
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    /// Sends one statement and returns the server's reply text.
    pub async fn execute(&mut self, sql: &str) -> ServerResult<String> {
        let out = frame::encode(sql, self.max_frame_size)?;
        self.stream.write_all(&out).await?;
        self.read_reply().await
    }

    /// Waits for the next reply frame.
    pub async fn read_reply(&mut self) -> ServerResult<String> {
        loop {
            if let Some(reply) = frame::decode(&mut self.buf, self.max_frame_size)? {
                return Ok(reply);
            }
            if self.stream.read_buf(&mut self.buf).await? == 0 {
                return Err(ServerError::ConnectionClosed);
            }
        }
    }
}
