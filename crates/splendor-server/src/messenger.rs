//! Per-connection outbound queues.
//!
//! Every open connection registers an unbounded FIFO here and a writer
//! task drains it onto the socket. Enqueueing never blocks, so a
//! reaction can address any number of connections without awaiting.

use std::collections::HashMap;

use parking_lot::Mutex;
use splendor_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender for delivering encoded messages to one connection.
pub type ConnectionSender = mpsc::UnboundedSender<String>;

/// Outbound queues keyed by connection.
#[derive(Debug, Default)]
pub struct Messenger {
    queues: Mutex<HashMap<ConnectionId, ConnectionSender>>,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a queue for `conn` and returns its receiving end.
    ///
    /// Registering the same connection twice replaces the old queue.
    pub fn register(
        &self,
        conn: ConnectionId,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.queues.lock().insert(conn, tx);
        rx
    }

    /// Closes the queue for `conn`. Messages already queued stay
    /// readable by the receiver.
    pub fn unregister(&self, conn: ConnectionId) {
        self.queues.lock().remove(&conn);
    }

    /// Queues `text` for `conn`.
    ///
    /// Returns `false` (and drops the message) when the connection is
    /// unknown or its receiver is gone.
    pub fn send(&self, conn: ConnectionId, text: String) -> bool {
        let queues = self.queues.lock();
        let Some(tx) = queues.get(&conn) else {
            tracing::debug!(%conn, "dropping message for unknown connection");
            return false;
        };
        if tx.send(text).is_err() {
            tracing::debug!(%conn, "dropping message for closed connection");
            return false;
        }
        true
    }

    /// Queues a copy of `text` for each connection in `targets`.
    pub fn broadcast(&self, targets: &[ConnectionId], text: &str) {
        for &conn in targets {
            self.send(conn, text.to_owned());
        }
    }

    pub fn connection_count(&self) -> usize {
        self.queues.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_arrive_in_order() {
        let messenger = Messenger::new();
        let conn = ConnectionId::new(1);
        let mut rx = messenger.register(conn);

        for i in 0..5 {
            assert!(messenger.send(conn, format!("msg-{i}")));
        }

        for i in 0..5 {
            assert_eq!(rx.try_recv().unwrap(), format!("msg-{i}"));
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_to_unknown_connection_is_dropped() {
        let messenger = Messenger::new();
        assert!(!messenger.send(ConnectionId::new(9), "lost".into()));
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let messenger = Messenger::new();
        let conn = ConnectionId::new(1);
        drop(messenger.register(conn));
        assert!(!messenger.send(conn, "lost".into()));
    }

    #[test]
    fn test_unregister_keeps_queued_messages() {
        let messenger = Messenger::new();
        let conn = ConnectionId::new(1);
        let mut rx = messenger.register(conn);
        messenger.send(conn, "before".into());

        messenger.unregister(conn);

        assert_eq!(messenger.connection_count(), 0);
        assert_eq!(rx.try_recv().unwrap(), "before");
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_broadcast_reaches_each_target() {
        let messenger = Messenger::new();
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(2);
        let mut rx_a = messenger.register(a);
        let mut rx_b = messenger.register(b);

        messenger.broadcast(&[a, b], "hello");

        assert_eq!(rx_a.try_recv().unwrap(), "hello");
        assert_eq!(rx_b.try_recv().unwrap(), "hello");
    }
}
