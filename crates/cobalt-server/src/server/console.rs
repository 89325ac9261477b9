//! Operator console.
//!
//! The server watches its standard input for a stop command. Lines are
//! trimmed and compared case-insensitively; anything else is ignored.
//!
//! Stdin is read on a plain thread rather than a runtime task: a blocking
//! read cannot be cancelled and would hold up runtime shutdown.

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Commands that stop the server.
pub const STOP_COMMANDS: [&str; 3] = ["stop", "quit", "exit"];

/// Returns true if `line` is a stop command.
pub fn is_stop_command(line: &str) -> bool {
    let line = line.trim();
    STOP_COMMANDS.iter().any(|c| line.eq_ignore_ascii_case(c))
}

/// Resolves once a stop command arrives on `lines`.
///
/// A closed channel never resolves, so a server started with a closed
/// stdin keeps running until another signal stops it.
pub async fn wait_for_stop(mut lines: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        if is_stop_command(&line) {
            info!("Stop command received");
            return;
        }
        if !line.trim().is_empty() {
            debug!("Ignoring console input: {}", line.trim());
        }
    }
    debug!("Console input closed");
    std::future::pending::<()>().await
}

/// Forwards stdin lines to a channel from a background thread.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = thread::Builder::new()
        .name("cobalt-console".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!("Console read error: {}", e);
                        return;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Failed to start console reader: {}", e);
    }
    rx
}

/// Resolves once a stop command is typed on stdin.
pub async fn stdin_stop() {
    wait_for_stop(spawn_stdin_reader()).await
}
