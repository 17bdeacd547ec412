//! `JOIN_ROOM`: enter a lobby by its code and password.

use serde::Deserialize;
use serde_json::json;
use splendor_transport::ConnectionId;

use super::{
    Reaction, ReactionError, Reply, Responder, UserDto, check_enter_code,
    check_password, member_list, room_summary,
};
use crate::ServerContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRoomDto {
    pub enter_code: String,
    pub password: String,
}

/// ```text
/// {"roomDTO": {"enterCode", "password"}, "userDTO": {"uuid", "name"}}
/// ```
///
/// Everyone in the room, newcomer included, receives the joining
/// `user`, the `room`, and the full member list.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoom {
    #[serde(rename = "roomDTO")]
    pub room: EnterRoomDto,
    #[serde(rename = "userDTO")]
    pub user: UserDto,
}

impl JoinRoom {
    pub const TAG: &'static str = "JOIN_ROOM";
}

impl Reaction for JoinRoom {
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError> {
        let JoinRoom { room, user } = *self;
        let user = user.into_user(origin)?;
        check_enter_code(&room.enter_code)?;
        check_password(&room.password)?;

        let info = ctx.directory().join_room_with(
            user.clone(),
            &room.enter_code,
            &room.password,
            |info| {
                out.respond(Reply::to_connections(
                    info.connections(),
                    json!({
                        "user": user,
                        "room": room_summary(info),
                        "users": member_list(info),
                    }),
                ));
            },
        )?;
        tracing::info!(room = %info.uuid, user = %user.id, "user joined room");
        Ok(())
    }
}
