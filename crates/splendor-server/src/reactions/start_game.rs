//! `START_GAME`: the owner moves the lobby into play.

use serde::Deserialize;
use serde_json::json;
use splendor_transport::ConnectionId;

use super::{Reaction, ReactionError, Reply, Responder, RoomRef, UserRef};
use crate::ServerContext;

/// ```text
/// {"roomDTO": {"uuid"}, "userDTO": {"uuid", "name"?}}
/// ```
///
/// Every member receives the room and the opening game snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct StartGame {
    #[serde(rename = "roomDTO")]
    pub room: RoomRef,
    #[serde(rename = "userDTO")]
    pub user: UserRef,
}

impl StartGame {
    pub const TAG: &'static str = "START_GAME";
}

impl Reaction for StartGame {
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        _origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError> {
        let requester = self.user.id()?;
        let room = self.room.id()?;

        ctx.directory().start_game_with(requester, room, |update| {
            out.respond(Reply::to_connections(
                update.room.connections(),
                json!({
                    "room": {
                        "uuid": update.room.uuid,
                        "name": update.room.name,
                        "state": update.room.state,
                    },
                    "game": update.game,
                }),
            ));
        })?;
        Ok(())
    }
}
