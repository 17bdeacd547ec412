//! `TAKE_TOKENS`: spend a turn taking tokens from the table.

use serde::Deserialize;
use serde_json::json;
use splendor_game::TokenPool;
use splendor_transport::ConnectionId;

use super::{
    Reaction, ReactionError, Reply, Responder, RoomRef, UserRef, acting_user,
};
use crate::ServerContext;

/// ```text
/// {"roomDTO": {"uuid"}, "userDTO": {"uuid", "name"?}, "tokens": {"RUBY": 1, ...}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TakeTokens {
    #[serde(rename = "roomDTO")]
    pub room: RoomRef,
    #[serde(rename = "userDTO")]
    pub user: UserRef,
    pub tokens: TokenPool,
}

impl TakeTokens {
    pub const TAG: &'static str = "TAKE_TOKENS";
}

impl Reaction for TakeTokens {
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        _origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError> {
        let user = self.user.id()?;
        let room = self.room.id()?;

        ctx.directory()
            .take_tokens_with(user, room, &self.tokens, |update| {
                out.respond(Reply::to_connections(
                    update.room.connections(),
                    json!({
                        "user": acting_user(&update.room, user),
                        "tokens": self.tokens,
                        "game": update.game,
                    }),
                ));
            })?;
        Ok(())
    }
}
