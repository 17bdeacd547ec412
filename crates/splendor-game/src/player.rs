//! Player identity and per-session holdings.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Card, CardId, GameError, Noble, NobleId, TokenKind, TokenPool};

/// Stable identity of a user, chosen by the client.
///
/// Serialized as the bare UUID string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Everything one player has accumulated during a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHand {
    pub id: UserId,
    pub tokens: TokenPool,
    pub cards: Vec<Card>,
    pub nobles: Vec<Noble>,
}

impl PlayerHand {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            tokens: TokenPool::new(),
            cards: Vec::new(),
            nobles: Vec::new(),
        }
    }

    /// Permanent discounts from bought cards, one per card.
    pub fn bonuses(&self) -> TokenPool {
        self.cards.iter().map(|c| (c.bonus, 1)).collect()
    }

    pub fn prestige(&self) -> u32 {
        let cards: u32 = self.cards.iter().map(|c| u32::from(c.prestige)).sum();
        let nobles: u32 =
            self.nobles.iter().map(|n| u32::from(n.prestige)).sum();
        cards + nobles
    }

    /// Works out which tokens this player would hand over to buy `card`.
    ///
    /// Bonuses reduce each colored cost first, then the player's own
    /// tokens of that color pay, and any shortfall is covered by gold.
    ///
    /// # Errors
    /// [`GameError::InsufficientResources`] (reported against gold) when
    /// the shortfall exceeds the gold held.
    pub fn payment_for(&self, card: &Card) -> Result<TokenPool, GameError> {
        let bonuses = self.bonuses();
        let mut payment = TokenPool::new();
        let mut shortfall: u8 = 0;

        for (kind, cost) in card.cost.iter() {
            let due = cost.saturating_sub(bonuses.get(kind));
            let paid = due.min(self.tokens.get(kind));
            if paid > 0 {
                payment.add(kind, paid);
            }
            shortfall = shortfall.saturating_add(due - paid);
        }

        let gold = self.tokens.get(TokenKind::Gold);
        if shortfall > gold {
            return Err(GameError::InsufficientResources {
                kind: TokenKind::Gold,
                requested: shortfall,
                available: gold,
            });
        }
        if shortfall > 0 {
            payment.add(TokenKind::Gold, shortfall);
        }
        Ok(payment)
    }

    /// Public view sent to clients.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            tokens: self.tokens.clone(),
            bonuses: self.bonuses(),
            prestige: self.prestige(),
            cards: self.cards.iter().map(|c| c.id).collect(),
            nobles: self.nobles.iter().map(|n| n.id).collect(),
        }
    }
}

/// What everyone at the table can see about a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: UserId,
    pub tokens: TokenPool,
    pub bonuses: TokenPool,
    pub prestige: u32,
    pub cards: Vec<CardId>,
    pub nobles: Vec<NobleId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tier;

    fn card(id: u32, bonus: TokenKind, cost: &[(TokenKind, u8)]) -> Card {
        Card {
            id: CardId(id),
            tier: Tier::Level1,
            prestige: 1,
            bonus,
            cost: cost.iter().copied().collect(),
        }
    }

    fn hand_with(tokens: &[(TokenKind, u8)]) -> PlayerHand {
        let mut hand = PlayerHand::new(UserId(Uuid::nil()));
        hand.tokens = tokens.iter().copied().collect();
        hand
    }

    #[test]
    fn test_user_id_serializes_as_uuid_string() {
        let id = UserId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn test_payment_exact_tokens() {
        let hand = hand_with(&[(TokenKind::Ruby, 2), (TokenKind::Onyx, 1)]);
        let target = card(1, TokenKind::Emerald, &[(TokenKind::Ruby, 2)]);

        let payment = hand.payment_for(&target).unwrap();

        assert_eq!(payment.get(TokenKind::Ruby), 2);
        assert_eq!(payment.total(), 2);
    }

    #[test]
    fn test_payment_uses_bonuses_first() {
        let mut hand = hand_with(&[(TokenKind::Ruby, 1)]);
        hand.cards.push(card(10, TokenKind::Ruby, &[]));
        let target = card(1, TokenKind::Emerald, &[(TokenKind::Ruby, 2)]);

        let payment = hand.payment_for(&target).unwrap();

        assert_eq!(payment.get(TokenKind::Ruby), 1);
        assert_eq!(payment.get(TokenKind::Gold), 0);
    }

    #[test]
    fn test_payment_gold_covers_shortfall() {
        let hand = hand_with(&[(TokenKind::Ruby, 1), (TokenKind::Gold, 2)]);
        let target = card(1, TokenKind::Emerald, &[(TokenKind::Ruby, 3)]);

        let payment = hand.payment_for(&target).unwrap();

        assert_eq!(payment.get(TokenKind::Ruby), 1);
        assert_eq!(payment.get(TokenKind::Gold), 2);
    }

    #[test]
    fn test_payment_insufficient_reports_gold() {
        let hand = hand_with(&[(TokenKind::Ruby, 1)]);
        let target = card(1, TokenKind::Emerald, &[(TokenKind::Ruby, 3)]);

        let err = hand.payment_for(&target).unwrap_err();

        assert_eq!(
            err,
            GameError::InsufficientResources {
                kind: TokenKind::Gold,
                requested: 2,
                available: 0,
            }
        );
    }

    #[test]
    fn test_prestige_counts_cards_and_nobles() {
        let mut hand = hand_with(&[]);
        hand.cards.push(card(1, TokenKind::Ruby, &[]));
        hand.cards.push(card(2, TokenKind::Ruby, &[]));
        hand.nobles.push(Noble {
            id: NobleId(1),
            prestige: 3,
            requirements: TokenPool::new(),
        });
        assert_eq!(hand.prestige(), 5);
        assert_eq!(hand.bonuses().get(TokenKind::Ruby), 2);
    }
}
