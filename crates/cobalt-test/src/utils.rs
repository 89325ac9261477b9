//! Helpers for starting servers and running statement scripts.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use cobalt_server::config::ServerConfig;
use cobalt_server::database::{Database, Session};
use cobalt_server::server::{Server, ServerResult};
use cobalt_sql::executor::{ExecResult, Executor, SessionContext};
use cobalt_sql::parser::Parser;
use cobalt_sql::storage::Engine;

/// A server running on an ephemeral local port.
pub struct TestServer {
    /// Address the server listens on.
    pub addr: SocketAddr,
    /// Shared database handle.
    pub db: Arc<Database>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<ServerResult<()>>,
}

impl TestServer {
    /// Starts a server for `db` on 127.0.0.1.
    pub async fn start(db: Arc<Database>) -> ServerResult<Self> {
        Self::start_with(db, 100).await
    }

    /// Starts a server with a connection limit.
    pub async fn start_with(db: Arc<Database>, max_connections: usize) -> ServerResult<Self> {
        let config = ServerConfig::builder()
            .host("127.0.0.1")
            .port(0)
            .max_connections(max_connections)
            .build();
        let server = Server::bind(Arc::clone(&db), &config).await?;
        let addr = server.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(async {
            let _ = rx.await;
        }));

        Ok(Self {
            addr,
            db,
            stop: Some(tx),
            handle,
        })
    }

    /// Stops accepting, waits for the accept loop and saves the database.
    pub async fn shutdown(mut self) -> ServerResult<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match (&mut self.handle).await {
            Ok(result) => result?,
            Err(e) => return Err(std::io::Error::other(e.to_string()).into()),
        }
        self.db.close()?;
        Ok(())
    }
}

/// Runs statements in a session and returns their replies.
pub fn run_session(session: &mut Session, statements: &[&str]) -> Vec<String> {
    statements
        .iter()
        .map(|sql| session.reply(sql))
        .collect()
}

/// Runs one statement directly against an engine.
pub fn run(sql: &str, engine: &mut Engine, ctx: &mut SessionContext) -> ExecResult {
    Executor::execute(&Parser::parse(sql), engine, ctx)
}

/// Runs statements that must all succeed.
///
/// # Panics
///
/// Panics on the first failing statement.
pub fn run_all(statements: &[&str], engine: &mut Engine, ctx: &mut SessionContext) {
    for sql in statements {
        let result = run(sql, engine, ctx);
        assert!(result.ok, "{}: {}", sql, result.error);
    }
}
