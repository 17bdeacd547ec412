//! Entity model and rule engine for Splendor.
//!
//! This crate knows nothing about connections, rooms, or JSON envelopes.
//! It owns the pieces that sit on the table and the rules that move them:
//!
//! - **Model** ([`TokenKind`], [`TokenPool`], [`Card`], [`Noble`], [`Deck`],
//!   [`UserId`], [`PlayerHand`]): small value types with
//!   invariant-preserving mutation primitives.
//! - **Catalog** ([`Catalog`] trait, [`InMemoryCatalog`]): where the full
//!   card and noble sets come from.
//! - **Engine** ([`Game`]): session start, random draws, and rule-checked
//!   transitions (take tokens, buy card, refill, noble visits).
//!
//! # Architecture
//!
//! ```text
//! Room (splendor-room) ──owns──→ Game ──reads──→ Catalog
//!                                 │
//!                                 └──owns──→ TokenPool, Deck×3, windows×3, nobles, hands
//! ```
//!
//! Randomness is always injected: the engine draws through a `StdRng`
//! handed to [`Game::new`], so a seeded generator reproduces a session.

mod card;
mod catalog;
mod deck;
mod error;
mod game;
mod player;
mod token;

pub use card::{Card, CardId, Noble, NobleId, Tier};
pub use catalog::{Catalog, InMemoryCatalog};
pub use deck::{Deck, draw_many, draw_random};
pub use error::{CatalogError, GameError};
pub use game::{
    GOLD_TOKENS, Game, GameSnapshot, MAX_HAND_TOKENS, MAX_PLAYERS, MIN_PLAYERS,
    NOBLES_PER_GAME, Purchase, REVEALED_PER_TIER, WINNING_PRESTIGE,
    colored_stack_for,
};
pub use player::{PlayerHand, PlayerView, UserId};
pub use token::{TokenKind, TokenPool};
