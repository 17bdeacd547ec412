use std::io;
use std::net::SocketAddr;

/// Errors that can occur in the transport layer.
///
/// Only `Bind` is fatal to a server. The rest concern a single
/// connection attempt or an open connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be opened.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The listener failed to hand over the next TCP connection.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] io::Error),

    /// A TCP peer connected but never completed the WebSocket upgrade.
    #[error("WebSocket handshake with {peer} failed: {reason}")]
    Handshake { peer: SocketAddr, reason: String },

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] io::Error),
}

impl TransportError {
    /// Whether the error ends only the connection attempt that caused it.
    pub fn is_per_connection(&self) -> bool {
        matches!(self, TransportError::Handshake { .. })
    }
}
