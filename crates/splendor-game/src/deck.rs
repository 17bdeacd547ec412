//! Decks and the random-draw primitive shared by cards and nobles.

use rand::Rng;

use crate::{Card, CardId, Tier};

/// Removes and returns a uniformly chosen element of `source`.
///
/// Each call picks an index in `0..source.len()` and takes that element
/// out, so it can never be chosen again. Returns `None` when `source` is
/// empty.
///
/// `source` is treated as an unordered bag: the removal uses
/// `swap_remove`, which is O(1) but reorders the remaining elements.
pub fn draw_random<T, R: Rng + ?Sized>(
    source: &mut Vec<T>,
    rng: &mut R,
) -> Option<T> {
    if source.is_empty() {
        return None;
    }
    let index = rng.random_range(0..source.len());
    Some(source.swap_remove(index))
}

/// Draws up to `amount` elements without replacement.
///
/// Saturating: asking for more than `source` holds returns everything
/// that is left instead of failing.
pub fn draw_many<T, R: Rng + ?Sized>(
    source: &mut Vec<T>,
    amount: usize,
    rng: &mut R,
) -> Vec<T> {
    let amount = amount.min(source.len());
    let mut drawn = Vec::with_capacity(amount);
    for _ in 0..amount {
        if let Some(item) = draw_random(source, rng) {
            drawn.push(item);
        }
    }
    drawn
}

/// The face-down stack of one tier.
#[derive(Debug, Clone)]
pub struct Deck {
    tier: Tier,
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a deck from catalog cards. Cards of other tiers are dropped.
    pub fn new(tier: Tier, cards: Vec<Card>) -> Self {
        let cards = cards.into_iter().filter(|c| c.tier == tier).collect();
        Self { tier, cards }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }

    /// Draws one random card, or `None` if the deck is exhausted.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        draw_random(&mut self.cards, rng)
    }

    /// Draws up to `amount` random cards.
    pub fn draw_many<R: Rng + ?Sized>(
        &mut self,
        amount: usize,
        rng: &mut R,
    ) -> Vec<Card> {
        draw_many(&mut self.cards, amount, rng)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::{TokenKind, TokenPool};

    fn card(id: u32, tier: Tier) -> Card {
        Card {
            id: CardId(id),
            tier,
            prestige: 0,
            bonus: TokenKind::Ruby,
            cost: TokenPool::new(),
        }
    }

    #[test]
    fn test_draw_random_empty_returns_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut source: Vec<u8> = Vec::new();
        assert_eq!(draw_random(&mut source, &mut rng), None);
    }

    #[test]
    fn test_draw_random_never_repeats() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut source: Vec<u32> = (0..50).collect();
        let mut seen = HashSet::new();

        while let Some(x) = draw_random(&mut source, &mut rng) {
            assert!(seen.insert(x), "element {x} drawn twice");
        }

        assert_eq!(seen.len(), 50);
        assert!(source.is_empty());
    }

    #[test]
    fn test_draw_random_is_uniform() {
        // 50k single draws from a 5-element bag. Expected 10k each, the
        // standard deviation is ~90, so ±500 is a very loose bound.
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [0u32; 5];
        for _ in 0..50_000 {
            let mut source: Vec<usize> = (0..5).collect();
            let picked = draw_random(&mut source, &mut rng).unwrap();
            counts[picked] += 1;
        }
        for (i, &n) in counts.iter().enumerate() {
            assert!(
                (9_500..=10_500).contains(&n),
                "index {i} drawn {n} times: {counts:?}"
            );
        }
    }

    #[test]
    fn test_draw_many_saturates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut source = vec![1, 2, 3];
        let drawn = draw_many(&mut source, 10, &mut rng);
        assert_eq!(drawn.len(), 3);
        assert!(source.is_empty());
    }

    #[test]
    fn test_draw_many_same_seed_same_sequence() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b: Vec<u32> = (0..20).collect();
        let drawn_a = draw_many(&mut a, 5, &mut StdRng::seed_from_u64(99));
        let drawn_b = draw_many(&mut b, 5, &mut StdRng::seed_from_u64(99));
        assert_eq!(drawn_a, drawn_b);
    }

    #[test]
    fn test_deck_new_drops_foreign_tiers() {
        let deck = Deck::new(
            Tier::Level1,
            vec![card(1, Tier::Level1), card(2, Tier::Level2)],
        );
        assert_eq!(deck.len(), 1);
        assert!(deck.contains(CardId(1)));
        assert!(!deck.contains(CardId(2)));
    }

    #[test]
    fn test_deck_draw_removes_card() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut deck = Deck::new(
            Tier::Level3,
            vec![card(1, Tier::Level3), card(2, Tier::Level3)],
        );
        let drawn = deck.draw(&mut rng).unwrap();
        assert_eq!(deck.len(), 1);
        assert!(!deck.contains(drawn.id));
    }
}
