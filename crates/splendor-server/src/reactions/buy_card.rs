//! `BUY_CARD`: spend a turn buying a revealed card.

use serde::Deserialize;
use serde_json::json;
use splendor_game::CardId;
use splendor_transport::ConnectionId;

use super::{
    Reaction, ReactionError, Reply, Responder, RoomRef, UserRef, acting_user,
};
use crate::ServerContext;

/// ```text
/// {"roomDTO": {"uuid"}, "userDTO": {"uuid", "name"?}, "cardId": 17}
/// ```
///
/// The broadcast carries the bought `card`, the visiting `noble` if one
/// came, and the game after the move.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyCard {
    #[serde(rename = "roomDTO")]
    pub room: RoomRef,
    #[serde(rename = "userDTO")]
    pub user: UserRef,
    pub card_id: CardId,
}

impl BuyCard {
    pub const TAG: &'static str = "BUY_CARD";
}

impl Reaction for BuyCard {
    fn react(
        self: Box<Self>,
        ctx: &ServerContext,
        _origin: ConnectionId,
        out: &dyn Responder,
    ) -> Result<(), ReactionError> {
        let user = self.user.id()?;
        let room = self.room.id()?;

        ctx.directory().buy_card_with(user, room, self.card_id, |update| {
            let purchase = update.purchase.as_ref();
            out.respond(Reply::to_connections(
                update.room.connections(),
                json!({
                    "user": acting_user(&update.room, user),
                    "card": purchase.map(|p| &p.card),
                    "noble": purchase.and_then(|p| p.noble.as_ref()),
                    "game": update.game,
                }),
            ));
        })?;
        Ok(())
    }
}
