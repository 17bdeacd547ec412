//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler
//! plus a writer task:
//!
//! ```text
//! socket ──recv──→ reader (this fn) ──dispatch──→ Messenger queues
//! socket ←──send── writer task ←──────────────── this connection's queue
//! ```
//!
//! The reader never writes to the socket itself, so a response queued by
//! another connection's request interleaves in FIFO order with this
//! connection's own responses.

use std::sync::Arc;
use std::time::Duration;

use splendor_transport::{
    Connection, ConnectionId, TransportError, WebSocketConnection,
};
use tokio::task::JoinHandle;

use crate::ServerError;
use crate::server::ServerState;

/// How long a closing connection may spend sending responses that were
/// queued before it stopped reading.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Drop guard that removes the connection's user from the server when
/// the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Everything
/// it touches is behind synchronous locks, so it runs inline.
struct ConnectionGuard {
    conn_id: ConnectionId,
    state: Arc<ServerState>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.dispatcher.connection_closed(self.conn_id);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let mut outbox = state.dispatcher.messenger().register(conn_id);
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(text) = outbox.recv().await {
                if let Err(e) = conn.send(&text).await {
                    tracing::debug!(%conn_id, error = %e, "send failed");
                    break;
                }
            }
        })
    };

    let result = loop {
        let data = match next_frame(&conn, state.idle_timeout).await {
            Some(Ok(Some(data))) => data,
            Some(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break Ok(());
            }
            Some(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break Err(ServerError::from(e));
            }
            None => {
                tracing::info!(%conn_id, "connection timed out");
                break Ok(());
            }
        };

        state.dispatcher.dispatch(conn_id, &data);
    };

    // Closing the queue lets the writer finish what is already in it.
    state.dispatcher.messenger().unregister(conn_id);
    if !flush_writer(writer, FLUSH_TIMEOUT).await {
        tracing::debug!(%conn_id, "dropped unsent responses on close");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    // _guard drops here → the user leaves their room.
    result
}

/// Waits for the next frame. `None` means the idle timeout fired first.
async fn next_frame(
    conn: &WebSocketConnection,
    idle_timeout: Option<Duration>,
) -> Option<Result<Option<Vec<u8>>, TransportError>> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, conn.recv()).await.ok(),
        None => Some(conn.recv().await),
    }
}

/// Waits up to `limit` for the writer to drain its queue, aborting it
/// otherwise. Returns `true` if it finished in time.
async fn flush_writer(mut writer: JoinHandle<()>, limit: Duration) -> bool {
    match tokio::time::timeout(limit, &mut writer).await {
        Ok(_) => true,
        Err(_) => {
            writer.abort();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Messenger;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_flush_writer_sends_everything_queued() {
        let messenger = Messenger::new();
        let conn = ConnectionId::new(1);
        let mut outbox = messenger.register(conn);
        let sent = Arc::new(Mutex::new(Vec::new()));

        let writer = {
            let sent = Arc::clone(&sent);
            tokio::spawn(async move {
                while let Some(text) = outbox.recv().await {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    sent.lock().push(text);
                }
            })
        };
        for text in ["one", "two", "three"] {
            assert!(messenger.send(conn, text.to_owned()));
        }
        messenger.unregister(conn);

        assert!(flush_writer(writer, Duration::from_secs(5)).await);
        assert_eq!(*sent.lock(), ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_flush_writer_gives_up_after_limit() {
        let messenger = Messenger::new();
        let conn = ConnectionId::new(1);
        let mut outbox = messenger.register(conn);

        // The queue stays open, so this writer never finishes.
        let writer = tokio::spawn(async move {
            while outbox.recv().await.is_some() {}
        });

        assert!(!flush_writer(writer, Duration::from_millis(20)).await);
        assert_eq!(messenger.connection_count(), 1);
    }
}
