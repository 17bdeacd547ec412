//! Routing raw frames to reactions and responses back to connections.
//!
//! ```text
//! bytes ──decode──→ UserMessage ──registry[type]──→ Box<dyn Reaction>
//!                                                        │ react
//!          Messenger ←──encode── ServerMessage ←── Responder
//! ```
//!
//! Dispatch is synchronous: everything between reading a frame and
//! queueing its responses runs without awaiting, so no lock is ever
//! held across an await point. Room broadcasts are queued while the
//! room lock is held. Lock order is directory → room → messenger.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use splendor_protocol::{
    Codec, JsonCodec, ProtocolError, ServerMessage, UserMessage,
};
use splendor_room::RoomDirectory;
use splendor_transport::ConnectionId;

use crate::messenger::Messenger;
use crate::reactions::{
    BuyCard, CreateRoom, JoinRoom, LeaveRoom, Reaction, ReactionError, Reply,
    Responder, StartGame, TakeTokens, departure,
};

/// Turns a request's `data` into a runnable reaction.
pub type ReactionFactory =
    fn(Value) -> Result<Box<dyn Reaction>, ProtocolError>;

/// Decodes `data` into `T`. Registered once per request tag.
pub fn build<T>(data: Value) -> Result<Box<dyn Reaction>, ProtocolError>
where
    T: DeserializeOwned + Reaction + 'static,
{
    serde_json::from_value::<T>(data)
        .map(|reaction| Box::new(reaction) as Box<dyn Reaction>)
        .map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

/// Request tag → factory. Built once at startup and never mutated.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<&'static str, ReactionFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request the server understands.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(CreateRoom::TAG, build::<CreateRoom>)
            .register(JoinRoom::TAG, build::<JoinRoom>)
            .register(LeaveRoom::TAG, build::<LeaveRoom>)
            .register(StartGame::TAG, build::<StartGame>)
            .register(TakeTokens::TAG, build::<TakeTokens>)
            .register(BuyCard::TAG, build::<BuyCard>);
        registry
    }

    pub fn register(
        &mut self,
        tag: &'static str,
        factory: ReactionFactory,
    ) -> &mut Self {
        self.factories.insert(tag, factory);
        self
    }

    /// Builds the reaction for `tag` from its payload.
    ///
    /// # Errors
    /// - [`ProtocolError::UnknownRequestType`] if `tag` is not registered
    /// - [`ProtocolError::MalformedPayload`] if `data` does not fit
    pub fn resolve(
        &self,
        tag: &str,
        data: Value,
    ) -> Result<Box<dyn Reaction>, ProtocolError> {
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| ProtocolError::UnknownRequestType(tag.to_owned()))?;
        factory(data)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.factories.keys().collect();
        tags.sort();
        f.debug_struct("Registry").field("tags", &tags).finish()
    }
}

/// The collaborators every reaction may touch.
#[derive(Debug)]
pub struct ServerContext {
    directory: RoomDirectory,
}

impl ServerContext {
    pub fn new(directory: RoomDirectory) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }
}

/// Routes frames from any connection. One instance is shared by every
/// connection task.
#[derive(Debug)]
pub struct Dispatcher<C: Codec = JsonCodec> {
    registry: Registry,
    context: ServerContext,
    messenger: Messenger,
    codec: C,
}

impl Dispatcher<JsonCodec> {
    pub fn new(registry: Registry, context: ServerContext) -> Self {
        Self::with_codec(registry, context, JsonCodec)
    }
}

impl<C: Codec> Dispatcher<C> {
    pub fn with_codec(
        registry: Registry,
        context: ServerContext,
        codec: C,
    ) -> Self {
        Self {
            registry,
            context,
            messenger: Messenger::new(),
            codec,
        }
    }

    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handles one inbound frame from `origin`.
    ///
    /// Never fails: every request-level error is turned into a FAILURE
    /// response to `origin`. A frame that is not an envelope at all has
    /// no `contextId` to answer to and is dropped.
    pub fn dispatch(&self, origin: ConnectionId, raw: &[u8]) {
        let msg: UserMessage = match self.codec.decode(raw) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(conn_id = %origin, error = %e, "dropping undecodable frame");
                return;
            }
        };

        let out = RequestResponder {
            dispatcher: self,
            context_id: &msg.context_id,
            kind: &msg.kind,
            origin,
        };
        let outcome = self
            .registry
            .resolve(&msg.kind, msg.data)
            .map_err(ReactionError::from)
            .and_then(|reaction| reaction.react(&self.context, origin, &out));

        if let Err(e) = outcome {
            tracing::debug!(
                conn_id = %origin,
                request = %msg.kind,
                error = %e,
                "request rejected"
            );
            let response =
                ServerMessage::failure(msg.context_id.as_str(), &msg.kind, &e);
            self.deliver(&response, &[origin]);
        }
    }

    /// Removes whoever was using `conn` from their rooms and tells the
    /// members left behind.
    ///
    /// The notice is an unsolicited `LEAVE_ROOM_RESPONSE` with an empty
    /// `contextId`, since no request triggered it.
    pub fn connection_closed(&self, conn: ConnectionId) {
        self.messenger.unregister(conn);
        self.context.directory().drop_connection_with(conn, |outcome| {
            tracing::info!(
                conn_id = %conn,
                user = %outcome.user.id,
                room = %outcome.room.uuid,
                "user left on disconnect"
            );
            if outcome.emptied {
                return;
            }
            let notice =
                ServerMessage::ok("", LeaveRoom::TAG, departure(outcome));
            self.deliver(&notice, &outcome.room.connections());
        });
    }

    fn deliver(&self, response: &ServerMessage, targets: &[ConnectionId]) {
        let text = match self.codec.encode(response) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response");
                return;
            }
        };
        self.messenger.broadcast(targets, &text);
    }
}

/// Answers one request on behalf of its reaction.
struct RequestResponder<'a, C: Codec> {
    dispatcher: &'a Dispatcher<C>,
    context_id: &'a str,
    kind: &'a str,
    origin: ConnectionId,
}

impl<C: Codec> Responder for RequestResponder<'_, C> {
    fn respond(&self, reply: Reply) {
        let response = ServerMessage::ok(self.context_id, self.kind, reply.data);
        self.dispatcher
            .deliver(&response, &reply.audience.targets(self.origin));
    }
}
