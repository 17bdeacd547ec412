//! Wire protocol for the Splendor server.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Messages** ([`UserMessage`], [`ServerMessage`], [`ResultKind`]):
//!   the JSON envelopes that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those envelopes are
//!   converted to/from bytes.
//! - **Validation** ([`validate`]): the exact format rules requests must
//!   pass before any room state is looked at.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the
//! dispatcher. It doesn't know about rooms or games; it only knows how
//! envelopes are shaped and correlated.
//!
//! ```text
//! Transport (text) → Protocol (UserMessage) → Dispatcher → Reaction
//!                                                  │
//! Transport (text) ← Protocol (ServerMessage) ←────┘
//! ```

mod codec;
mod error;
mod message;
pub mod validate;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{
    ErrorData, ResultKind, ServerMessage, UserMessage, response_type,
};
