//! Development cards and noble tiles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{TokenKind, TokenPool};

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// One of the three card levels. Serialized as `"LEVEL_1"`..`"LEVEL_3"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub enum Tier {
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    Level3,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Level1, Tier::Level2, Tier::Level3];

    /// Zero-based position, used to index per-tier arrays.
    pub fn index(self) -> usize {
        match self {
            Tier::Level1 => 0,
            Tier::Level2 => 1,
            Tier::Level3 => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEVEL_{}", self.index() + 1)
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// Catalog identifier of a card. Unique across all tiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A development card. Immutable once loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub tier: Tier,
    /// Prestige points granted to the buyer.
    pub prestige: u8,
    /// Permanent discount granted to the buyer for one colored kind.
    pub bonus: TokenKind,
    /// Colored tokens required to buy the card.
    pub cost: TokenPool,
}

// ---------------------------------------------------------------------------
// Noble
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct NobleId(pub u32);

impl fmt::Display for NobleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N-{}", self.0)
    }
}

/// A noble tile. Visits the first player whose card bonuses meet
/// `requirements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noble {
    pub id: NobleId,
    pub prestige: u8,
    pub requirements: TokenPool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_wire_names() {
        assert_eq!(serde_json::to_string(&Tier::Level1).unwrap(), "\"LEVEL_1\"");
        assert_eq!(serde_json::to_string(&Tier::Level3).unwrap(), "\"LEVEL_3\"");
        assert_eq!(Tier::Level2.to_string(), "LEVEL_2");
    }

    #[test]
    fn test_tier_index_matches_all_order() {
        for (i, tier) in Tier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }

    #[test]
    fn test_card_deserializes_from_catalog_shape() {
        let json = r#"{
            "id": 7,
            "tier": "LEVEL_2",
            "prestige": 1,
            "bonus": "RUBY",
            "cost": {"ONYX": 3, "DIAMOND": 2}
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, CardId(7));
        assert_eq!(card.tier, Tier::Level2);
        assert_eq!(card.bonus, TokenKind::Ruby);
        assert_eq!(card.cost.get(TokenKind::Onyx), 3);
        assert_eq!(card.cost.get(TokenKind::Emerald), 0);
    }
}
