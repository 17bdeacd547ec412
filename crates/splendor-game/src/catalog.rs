//! The card and noble catalog.
//!
//! The engine never hard-codes the card set. It asks a [`Catalog`] for the
//! cards of each tier and the full noble pool when a game starts, and
//! keeps its own copies from then on. Tests can hand in a tiny catalog;
//! the server uses [`InMemoryCatalog::standard`] or a JSON file.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{Card, CatalogError, Noble, Tier, TokenKind};

/// The bundled 90-card / 10-noble set.
const STANDARD_CATALOG: &str = include_str!("../data/catalog.json");

/// Source of the full card and noble sets.
///
/// Lookups are synchronous and infallible: a catalog that has no cards
/// for a tier simply returns an empty list.
pub trait Catalog: Send + Sync + 'static {
    /// Every card of one tier.
    fn cards(&self, tier: Tier) -> Vec<Card>;

    /// Every card of every tier.
    fn all_cards(&self) -> Vec<Card>;

    /// The full noble pool.
    fn nobles(&self) -> Vec<Noble>;
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct InMemoryCatalog {
    cards: Vec<Card>,
    nobles: Vec<Noble>,
}

impl InMemoryCatalog {
    /// Builds a catalog from explicit lists, checking ids are unique and
    /// that no card involves the wildcard kind.
    pub fn new(
        cards: Vec<Card>,
        nobles: Vec<Noble>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self { cards, nobles };
        catalog.check()?;
        Ok(catalog)
    }

    /// The bundled standard set.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_json(STANDARD_CATALOG.as_bytes())
    }

    /// Parses `{"cards": [...], "nobles": [...]}`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let catalog: InMemoryCatalog = serde_json::from_slice(bytes)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    fn check(&self) -> Result<(), CatalogError> {
        let mut card_ids = HashSet::new();
        for card in &self.cards {
            if !card_ids.insert(card.id) {
                return Err(CatalogError::DuplicateCard(card.id));
            }
            if card.bonus.is_wildcard()
                || card.cost.get(TokenKind::Gold) > 0
            {
                return Err(CatalogError::WildcardCard(card.id));
            }
        }
        let mut noble_ids = HashSet::new();
        for noble in &self.nobles {
            if !noble_ids.insert(noble.id) {
                return Err(CatalogError::DuplicateNoble(noble.id));
            }
        }
        Ok(())
    }
}

impl Catalog for InMemoryCatalog {
    fn cards(&self, tier: Tier) -> Vec<Card> {
        self.cards.iter().filter(|c| c.tier == tier).cloned().collect()
    }

    fn all_cards(&self) -> Vec<Card> {
        self.cards.clone()
    }

    fn nobles(&self) -> Vec<Noble> {
        self.nobles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardId, NobleId, TokenPool};

    #[test]
    fn test_standard_catalog_sizes() {
        let catalog = InMemoryCatalog::standard().unwrap();
        assert_eq!(catalog.cards(Tier::Level1).len(), 40);
        assert_eq!(catalog.cards(Tier::Level2).len(), 30);
        assert_eq!(catalog.cards(Tier::Level3).len(), 20);
        assert_eq!(catalog.all_cards().len(), 90);
        assert_eq!(catalog.nobles().len(), 10);
    }

    #[test]
    fn test_standard_catalog_nobles_worth_three() {
        let catalog = InMemoryCatalog::standard().unwrap();
        assert!(catalog.nobles().iter().all(|n| n.prestige == 3));
    }

    #[test]
    fn test_duplicate_card_rejected() {
        let card = Card {
            id: CardId(1),
            tier: Tier::Level1,
            prestige: 0,
            bonus: TokenKind::Onyx,
            cost: TokenPool::new(),
        };
        let result = InMemoryCatalog::new(vec![card.clone(), card], vec![]);
        assert!(matches!(result, Err(CatalogError::DuplicateCard(CardId(1)))));
    }

    #[test]
    fn test_duplicate_noble_rejected() {
        let noble = Noble {
            id: NobleId(4),
            prestige: 3,
            requirements: TokenPool::new(),
        };
        let result = InMemoryCatalog::new(vec![], vec![noble.clone(), noble]);
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateNoble(NobleId(4)))
        ));
    }

    #[test]
    fn test_gold_bonus_rejected() {
        let card = Card {
            id: CardId(9),
            tier: Tier::Level2,
            prestige: 1,
            bonus: TokenKind::Gold,
            cost: TokenPool::new(),
        };
        let result = InMemoryCatalog::new(vec![card], vec![]);
        assert!(matches!(result, Err(CatalogError::WildcardCard(CardId(9)))));
    }

    #[test]
    fn test_from_json_garbage_is_parse_error() {
        let result = InMemoryCatalog::from_json(b"{not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }
}
