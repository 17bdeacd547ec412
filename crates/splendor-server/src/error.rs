//! Unified error type for the server crate.

use splendor_game::CatalogError;
use splendor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Request-level failures (protocol, room or game errors) never surface
/// here; they become FAILURE responses. This is what building or
/// running the server can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
