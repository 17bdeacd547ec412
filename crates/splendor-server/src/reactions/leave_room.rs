//! `LEAVE_ROOM`: walk out of the current room.

use serde::Deserialize;
use serde_json::{Value, json};
use splendor_room::LeaveOutcome;
use splendor_transport::ConnectionId;

use super::{
    Reaction, ReactionError, Reply, Responder, RoomRef, UserRef, member_list,
    room_summary,
};
use crate::ServerContext;

/// ```text
/// {"roomDTO": {"uuid"}, "userDTO": {"uuid", "name"?}}
/// ```
///
/// The leaver and everyone still in the room receive the same payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRoom {
    #[serde(rename = "roomDTO")]
    pub room: RoomRef,
    #[serde(rename = "userDTO")]
    pub user: UserRef,
}

impl LeaveRoom {
    pub const TAG: &'static str = "LEAVE_ROOM";
}

/// Payload announcing a departure, shared with disconnect notices.
pub(crate) fn departure(outcome: &LeaveOutcome) -> Value {
    json!({
        "user": outcome.user,
        "room": room_summary(&outcome.room),
        "users": member_list(&outcome.room),
        "owner": outcome.new_owner,
        "abandoned": outcome.abandoned,
    })
}

impl Reaction for LeaveRoom {
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError> {
        let user = self.user.id()?;
        let room = self.room.id()?;

        ctx.directory().leave_room_with(user, room, |outcome| {
            let mut audience = vec![origin];
            audience.extend(
                outcome
                    .room
                    .connections()
                    .into_iter()
                    .filter(|&conn| conn != origin),
            );
            out.respond(Reply::to_connections(audience, departure(outcome)));
        })?;
        Ok(())
    }
}
