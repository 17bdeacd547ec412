//! Token kinds and pools.
//!
//! Tokens of the same kind are fungible, so a "pile" of tokens is just a
//! count. A [`TokenPool`] maps each kind to how many its owner holds: the
//! table, a player's hand, a card's cost, or a noble's requirements.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GameError;

// ---------------------------------------------------------------------------
// TokenKind
// ---------------------------------------------------------------------------

/// One of the six resource kinds: five gem colors plus the gold wildcard.
///
/// On the wire these are `"EMERALD"`, `"SAPPHIRE"`, `"RUBY"`, `"DIAMOND"`,
/// `"ONYX"` and `"GOLD_JOKER"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Emerald,
    Sapphire,
    Ruby,
    Diamond,
    Onyx,
    /// Wildcard: pays for any colored shortfall, never taken directly.
    #[serde(rename = "GOLD_JOKER")]
    Gold,
}

impl TokenKind {
    /// Every kind, colors first.
    pub const ALL: [TokenKind; 6] = [
        TokenKind::Emerald,
        TokenKind::Sapphire,
        TokenKind::Ruby,
        TokenKind::Diamond,
        TokenKind::Onyx,
        TokenKind::Gold,
    ];

    /// The five colored kinds.
    pub const COLORS: [TokenKind; 5] = [
        TokenKind::Emerald,
        TokenKind::Sapphire,
        TokenKind::Ruby,
        TokenKind::Diamond,
        TokenKind::Onyx,
    ];

    /// Returns `true` for the gold wildcard.
    pub fn is_wildcard(self) -> bool {
        matches!(self, TokenKind::Gold)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Emerald => "EMERALD",
            TokenKind::Sapphire => "SAPPHIRE",
            TokenKind::Ruby => "RUBY",
            TokenKind::Diamond => "DIAMOND",
            TokenKind::Onyx => "ONYX",
            TokenKind::Gold => "GOLD_JOKER",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// TokenPool
// ---------------------------------------------------------------------------

/// Kind → count. Counts are unsigned, and [`TokenPool::remove`] refuses to
/// take more than is held, so a pool can never go negative.
///
/// Serializes as a plain JSON object: `{"EMERALD": 4, "GOLD_JOKER": 5}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPool(BTreeMap<TokenKind, u8>);

impl TokenPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many tokens of `kind` the pool holds.
    pub fn get(&self, kind: TokenKind) -> u8 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Overwrites the count for `kind`.
    pub fn set(&mut self, kind: TokenKind, count: u8) {
        self.0.insert(kind, count);
    }

    /// Adds `count` tokens of `kind`.
    pub fn add(&mut self, kind: TokenKind, count: u8) {
        let entry = self.0.entry(kind).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Removes `count` tokens of `kind`.
    ///
    /// # Errors
    /// [`GameError::InsufficientResources`] if fewer than `count` are held.
    /// The pool is untouched in that case.
    pub fn remove(
        &mut self,
        kind: TokenKind,
        count: u8,
    ) -> Result<(), GameError> {
        let available = self.get(kind);
        if available < count {
            return Err(GameError::InsufficientResources {
                kind,
                requested: count,
                available,
            });
        }
        self.0.insert(kind, available - count);
        Ok(())
    }

    /// Total number of tokens across all kinds.
    pub fn total(&self) -> u32 {
        self.0.values().map(|&n| u32::from(n)).sum()
    }

    /// Iterates over kinds with a non-zero count, in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenKind, u8)> + '_ {
        self.0
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(kind, n)| (*kind, *n))
    }

    /// Returns `true` if this pool holds at least as many of every kind
    /// as `other` asks for.
    pub fn covers(&self, other: &TokenPool) -> bool {
        other.iter().all(|(kind, n)| self.get(kind) >= n)
    }
}

impl FromIterator<(TokenKind, u8)> for TokenPool {
    fn from_iter<I: IntoIterator<Item = (TokenKind, u8)>>(iter: I) -> Self {
        let mut pool = TokenPool::new();
        for (kind, n) in iter {
            pool.add(kind, n);
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&TokenKind::Emerald).unwrap();
        assert_eq!(json, "\"EMERALD\"");
        let json = serde_json::to_string(&TokenKind::Gold).unwrap();
        assert_eq!(json, "\"GOLD_JOKER\"");
    }

    #[test]
    fn test_token_kind_display_matches_wire_name() {
        for kind in TokenKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_colors_exclude_wildcard() {
        assert!(TokenKind::COLORS.iter().all(|k| !k.is_wildcard()));
        assert!(TokenKind::Gold.is_wildcard());
    }

    #[test]
    fn test_pool_remove_more_than_held_fails_without_change() {
        let mut pool: TokenPool = [(TokenKind::Ruby, 2)].into_iter().collect();

        let err = pool.remove(TokenKind::Ruby, 3).unwrap_err();

        assert_eq!(
            err,
            GameError::InsufficientResources {
                kind: TokenKind::Ruby,
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(pool.get(TokenKind::Ruby), 2);
    }

    #[test]
    fn test_pool_remove_to_zero() {
        let mut pool: TokenPool = [(TokenKind::Onyx, 2)].into_iter().collect();
        pool.remove(TokenKind::Onyx, 2).unwrap();
        assert_eq!(pool.get(TokenKind::Onyx), 0);
        assert_eq!(pool.total(), 0);
        assert_eq!(pool.iter().count(), 0, "zero counts are not iterated");
    }

    #[test]
    fn test_pool_covers() {
        let held: TokenPool =
            [(TokenKind::Ruby, 3), (TokenKind::Onyx, 1)].into_iter().collect();
        let ask: TokenPool = [(TokenKind::Ruby, 2)].into_iter().collect();
        let too_much: TokenPool =
            [(TokenKind::Onyx, 2)].into_iter().collect();

        assert!(held.covers(&ask));
        assert!(!held.covers(&too_much));
        assert!(held.covers(&TokenPool::new()));
    }

    #[test]
    fn test_pool_json_shape() {
        let pool: TokenPool =
            [(TokenKind::Diamond, 4), (TokenKind::Gold, 5)].into_iter().collect();
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["DIAMOND"], 4);
        assert_eq!(json["GOLD_JOKER"], 5);

        let back: TokenPool = serde_json::from_value(json).unwrap();
        assert_eq!(back, pool);
    }
}
