//! TCP session transport.
//!
//! Each accepted connection gets its own tokio task and its own database
//! session. Requests on one connection are handled in order; connections
//! run concurrently and share the engine through the database handle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  frame   ┌────────────────────────────┐
//! │ Client A │─────────▶│ task A: Session A          │──┐
//! └──────────┘◀─────────│  decode → execute → reply  │  │
//!                       └────────────────────────────┘  │ lock per
//! ┌──────────┐  frame   ┌────────────────────────────┐  │ statement
//! │ Client B │─────────▶│ task B: Session B          │──┤
//! └──────────┘◀─────────│                            │  ▼
//!                       └────────────────────────────┘ Arc<Database>
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cobalt_server::server::{Client, Server};
//!
//! let server = Server::bind(db, &config).await?;
//! let addr = server.local_addr()?;
//! tokio::spawn(server.serve_with_shutdown(std::future::pending()));
//!
//! let mut client = Client::connect(addr).await?;
//! assert_eq!(client.execute("CREATE DATABASE shop").await?, "OK");
//! ```

mod client;
pub mod console;
mod error;
pub mod frame;

pub use client::Client;
pub use error::{ServerError, ServerResult};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::database::{Database, Session};

/// Accepts client connections and serves statements over them.
pub struct Server {
    db: Arc<Database>,
    listener: TcpListener,
    max_connections: usize,
    max_frame_size: usize,
    connections: Arc<AtomicUsize>,
}

impl Server {
    /// Binds a listener on the configured host and port.
    pub async fn bind(db: Arc<Database>, config: &ServerConfig) -> ServerResult<Self> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        Ok(Self {
            db,
            listener,
            max_connections: config.max_connections,
            max_frame_size: config.max_frame_size,
            connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns the number of open connections.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Serves connections until `shutdown` completes.
    ///
    /// On shutdown the listener is dropped and every connection task is
    /// told to stop before its next statement. Returns once all connection
    /// tasks have finished, so no statement runs after this future resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!("Server listening on {}", addr);

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!("Accepted connection from {}", peer);
                            self.spawn_connection(&mut tasks, stream, peer, stop_rx.clone());
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
                _ = &mut shutdown => {
                    info!("Server shutdown requested");
                    break;
                }
            }
        }

        drop(self.listener);
        // Receivers may all be gone already.
        let _ = stop_tx.send(true);

        let pending = tasks.len();
        if pending > 0 {
            debug!(pending, "Waiting for connections to stop");
        }
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
        info!("All connections closed");
        Ok(())
    }

    fn spawn_connection(
        &self,
        tasks: &mut JoinSet<()>,
        stream: TcpStream,
        peer: SocketAddr,
        stop: watch::Receiver<bool>,
    ) {
        let db = Arc::clone(&self.db);
        let connections = Arc::clone(&self.connections);
        let max_connections = self.max_connections;
        let max_frame_size = self.max_frame_size;

        tasks.spawn(async move {
            let Some(_guard) = ConnectionGuard::acquire(connections, max_connections) else {
                warn!("Refusing connection from {}: too many connections", peer);
                refuse(stream, "Too many connections", max_frame_size).await;
                return;
            };

            let session = match db.create_session() {
                Ok(session) => session,
                Err(e) => {
                    warn!("Refusing connection from {}: {}", peer, e);
                    refuse(stream, &e.to_string(), max_frame_size).await;
                    return;
                }
            };

            info!(session = %session.id(), "Client connected from {}", peer);
            let mut conn = Connection {
                stream,
                session,
                max_frame_size,
            };
            match conn.run(stop).await {
                Ok(()) => info!(session = %conn.session.id(), "Client disconnected"),
                Err(e) => warn!(session = %conn.session.id(), "Connection error: {}", e),
            }
        });
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Connection task failed: {}", e);
    }
}

/// One client connection and its session.
struct Connection {
    stream: TcpStream,
    session: Session,
    max_frame_size: usize,
}

impl Connection {
    /// Serves statements until the peer closes or the server stops.
    ///
    /// A statement that has started always completes. Frames still buffered
    /// when the stop signal arrives are dropped unexecuted.
    async fn run(&mut self, mut stop: watch::Receiver<bool>) -> ServerResult<()> {
        let mut buf = BytesMut::with_capacity(4096);

        loop {
            while let Some(sql) = frame::decode(&mut buf, self.max_frame_size)? {
                if *stop.borrow() {
                    debug!(session = %self.session.id(), "Stopping with statements pending");
                    return Ok(());
                }
                let reply = self.session.reply(&sql);
                tokio::select! {
                    result = self.write_reply(&reply) => result?,
                    _ = stop.changed() => {
                        debug!(session = %self.session.id(), "Stopping during reply");
                        return Ok(());
                    }
                }
            }

            tokio::select! {
                n = self.stream.read_buf(&mut buf) => {
                    if n? == 0 {
                        return Ok(());
                    }
                }
                _ = stop.changed() => {
                    debug!(session = %self.session.id(), "Stopping connection");
                    return Ok(());
                }
            }
        }
    }

    async fn write_reply(&mut self, reply: &str) -> ServerResult<()> {
        let out = match frame::encode(reply, self.max_frame_size) {
            Ok(out) => out,
            Err(e) => {
                warn!(session = %self.session.id(), "Reply dropped: {}", e);
                frame::encode(&format!("Error: {}", e), self.max_frame_size)?
            }
        };
        self.stream.write_all(&out).await?;
        Ok(())
    }
}

async fn refuse(mut stream: TcpStream, reason: &str, max_frame_size: usize) {
    if let Ok(out) = frame::encode(&format!("Error: {}", reason), max_frame_size) {
        if let Err(e) = stream.write_all(&out).await {
            debug!("Failed to send refusal: {}", e);
        }
    }
    let _ = stream.shutdown().await;
}

/// Holds one slot of the connection limit.
struct ConnectionGuard {
    connections: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn acquire(connections: Arc<AtomicUsize>, max: usize) -> Option<Self> {
        connections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()?;
        Some(Self { connections })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connections.fetch_sub(1, Ordering::SeqCst);
    }
}
