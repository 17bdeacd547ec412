//! # splendor-server
//!
//! WebSocket session server for Splendor.
//!
//! Clients send JSON requests tagged with a `type`; the server routes
//! each one to a reaction, applies it to the room and game it names,
//! and answers with a correlated response:
//!
//! ```text
//! → {"contextId": "c-1", "type": "CREATE_ROOM", "data": {...}}
//! ← {"contextId": "c-1", "type": "CREATE_ROOM_RESPONSE", "result": "OK", "data": {...}}
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SplendorServer ──accept──→ handler task per connection
//!                                 │ dispatch
//!                             Dispatcher ──Registry──→ Reaction
//!                                 │                      │
//!                             Messenger            RoomDirectory → Room → Game
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splendor_server::SplendorServer;
//!
//! # async fn start() -> Result<(), splendor_server::ServerError> {
//! let server = SplendorServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatcher;
mod error;
mod handler;
mod messenger;
pub mod reactions;
mod server;

pub use dispatcher::{Dispatcher, ReactionFactory, Registry, ServerContext, build};
pub use error::ServerError;
pub use messenger::{ConnectionSender, Messenger};
pub use reactions::{Audience, Reaction, ReactionError, Reply, Responder};
pub use server::{
    DEFAULT_BIND_ADDR, DEFAULT_IDLE_TIMEOUT, ServerConfig, SplendorServer,
    SplendorServerBuilder,
};

/// Convenience re-exports for embedding the server.
pub mod prelude {
    pub use crate::{
        Dispatcher, Registry, ServerConfig, ServerContext, ServerError,
        SplendorServer, SplendorServerBuilder,
    };
    pub use splendor_game::{Catalog, InMemoryCatalog};
    pub use splendor_room::{RoomConfig, RoomDirectory};
    pub use splendor_transport::ConnectionId;
}
