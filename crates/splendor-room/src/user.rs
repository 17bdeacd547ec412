//! Connected users.

use serde::Serialize;
use splendor_game::UserId;
use splendor_transport::ConnectionId;

/// A user as the server knows them: client-chosen id, display name, and
/// the connection their requests arrive on.
///
/// Serializes as `{"id": ..., "name": ...}`; the connection stays
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(skip)]
    pub connection: ConnectionId,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        connection: ConnectionId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            connection,
        }
    }
}
