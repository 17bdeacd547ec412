//! Request handlers.
//!
//! Each request tag maps to one reaction type. A reaction is the decoded
//! `data` payload of its request; [`Reaction::react`] runs it against
//! the server state and hands the result to a [`Responder`].
//!
//! Every reaction works in the same order:
//!
//! 1. format checks on each field (ids, names, passwords, codes)
//! 2. semantic checks against rooms and games
//! 3. mutation
//! 4. building the response payload
//!
//! Steps 2 and 3 happen inside one directory call, under the room lock,
//! so a rejected request changes nothing. Room broadcasts are also sent
//! from inside that call, so members hear about moves in the order the
//! room applied them.

mod buy_card;
mod create_room;
mod join_room;
mod leave_room;
mod start_game;
mod take_tokens;

pub use buy_card::BuyCard;
pub use create_room::CreateRoom;
pub use join_room::JoinRoom;
pub use leave_room::LeaveRoom;
pub(crate) use leave_room::departure;
pub use start_game::StartGame;
pub use take_tokens::TakeTokens;

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use splendor_game::UserId;
use splendor_protocol::{ProtocolError, validate};
use splendor_room::{RoomError, RoomInfo, User};
use splendor_transport::ConnectionId;
use uuid::Uuid;

use crate::ServerContext;

/// A decoded request, ready to run.
///
/// `self: Box<Self>` lets the dispatcher call this through a
/// `Box<dyn Reaction>` and still hand the reaction ownership of its
/// payload.
pub trait Reaction: Send {
    /// Sends at most one [`Reply`] through `out`. An `Err` means nothing
    /// was sent and nothing changed.
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError>;
}

/// Queues a reaction's OK response, stamped with the request's
/// `contextId` and response type.
pub trait Responder {
    fn respond(&self, reply: Reply);
}

/// Who receives a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Only the connection the request came from.
    Requester,
    /// An explicit set of connections, typically a room's members.
    Connections(Vec<ConnectionId>),
}

impl Audience {
    /// Resolves the audience to concrete connections.
    pub fn targets(&self, origin: ConnectionId) -> Vec<ConnectionId> {
        match self {
            Audience::Requester => vec![origin],
            Audience::Connections(conns) => conns.clone(),
        }
    }
}

/// The OK payload of a reaction and where it goes.
#[derive(Debug, Clone)]
pub struct Reply {
    pub audience: Audience,
    pub data: Value,
}

impl Reply {
    pub fn to_requester(data: Value) -> Self {
        Self {
            audience: Audience::Requester,
            data,
        }
    }

    pub fn to_connections(conns: Vec<ConnectionId>, data: Value) -> Self {
        Self {
            audience: Audience::Connections(conns),
            data,
        }
    }
}

/// Which display name failed its format check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    User,
    Room,
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameField::User => f.write_str("Invalid username credentials."),
            NameField::Room => f.write_str("Invalid room name format."),
        }
    }
}

/// Why a request was rejected. The message is what the client sees in
/// `data.error`.
#[derive(Debug, thiserror::Error)]
pub enum ReactionError {
    #[error("Invalid UUID format.")]
    InvalidIdentifierFormat,

    #[error("{0}")]
    InvalidNameFormat(NameField),

    #[error("Invalid room password format.")]
    InvalidCredentialFormat,

    #[error("Invalid enter code format.")]
    InvalidEnterCodeFormat,

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

// ---------------------------------------------------------------------------
// Shared payload pieces
// ---------------------------------------------------------------------------

/// `userDTO` for requests that introduce the user (create, join).
///
/// Ids arrive as strings so a malformed one is reported as a format
/// error rather than a malformed payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub uuid: String,
    pub name: String,
}

impl UserDto {
    /// Validates both fields and binds the user to `origin`.
    pub fn into_user(self, origin: ConnectionId) -> Result<User, ReactionError> {
        let id = parse_user_id(&self.uuid)?;
        check_name(&self.name, NameField::User)?;
        Ok(User::new(id, self.name, origin))
    }
}

/// `userDTO` for requests by a user the server already knows.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserRef {
    pub fn id(&self) -> Result<UserId, ReactionError> {
        parse_user_id(&self.uuid)
    }
}

/// `roomDTO` that points at an existing room.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomRef {
    pub uuid: String,
}

impl RoomRef {
    pub fn id(&self) -> Result<Uuid, ReactionError> {
        parse_uuid(&self.uuid)
    }
}

// ---------------------------------------------------------------------------
// Format checks
// ---------------------------------------------------------------------------

fn parse_uuid(raw: &str) -> Result<Uuid, ReactionError> {
    if !validate::is_identifier(raw) {
        return Err(ReactionError::InvalidIdentifierFormat);
    }
    Uuid::parse_str(raw).map_err(|_| ReactionError::InvalidIdentifierFormat)
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ReactionError> {
    parse_uuid(raw).map(UserId)
}

pub(crate) fn check_name(
    name: &str,
    field: NameField,
) -> Result<(), ReactionError> {
    if validate::is_display_name(name) {
        Ok(())
    } else {
        Err(ReactionError::InvalidNameFormat(field))
    }
}

pub(crate) fn check_password(password: &str) -> Result<(), ReactionError> {
    if validate::is_credential(password) {
        Ok(())
    } else {
        Err(ReactionError::InvalidCredentialFormat)
    }
}

pub(crate) fn check_enter_code(code: &str) -> Result<(), ReactionError> {
    if validate::is_enter_code(code) {
        Ok(())
    } else {
        Err(ReactionError::InvalidEnterCodeFormat)
    }
}

/// `{"uuid", "name"}` of a room, the shape most responses embed.
pub(crate) fn room_summary(room: &RoomInfo) -> Value {
    serde_json::json!({ "uuid": room.uuid, "name": room.name })
}

/// The member list as it appears under `users`.
pub(crate) fn member_list(room: &RoomInfo) -> Value {
    serde_json::json!(room.members)
}

/// `user` as seen by the rest of the room, falling back to the bare id
/// when the member list no longer has it.
pub(crate) fn acting_user(room: &RoomInfo, id: UserId) -> Value {
    match room.member(id) {
        Some(user) => serde_json::json!(user),
        None => serde_json::json!({ "id": id }),
    }
}
