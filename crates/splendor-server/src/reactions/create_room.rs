//! `CREATE_ROOM`: register a new room owned by the requester.

use serde::Deserialize;
use serde_json::json;
use splendor_transport::ConnectionId;

use super::{
    NameField, Reaction, ReactionError, Reply, Responder, UserDto, check_name,
    check_password,
};
use crate::ServerContext;

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoomDto {
    pub name: String,
    pub password: String,
}

/// ```text
/// {"roomDTO": {"name", "password"}, "userDTO": {"uuid", "name"}}
/// ```
///
/// Replies to the requester only with `user` and the new room's
/// `uuid`, `name`, and `enterCode`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    #[serde(rename = "roomDTO")]
    pub room: NewRoomDto,
    #[serde(rename = "userDTO")]
    pub user: UserDto,
}

impl CreateRoom {
    pub const TAG: &'static str = "CREATE_ROOM";
}

impl Reaction for CreateRoom {
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError> {
        let CreateRoom { room, user } = *self;
        let user = user.into_user(origin)?;
        check_name(&room.name, NameField::Room)?;
        check_password(&room.password)?;

        let info =
            ctx.directory().create_room(user.clone(), &room.name, &room.password)?;

        out.respond(Reply::to_requester(json!({
            "user": user,
            "room": {
                "uuid": info.uuid,
                "name": info.name,
                "enterCode": info.enter_code,
            },
        })));
        Ok(())
    }
}
