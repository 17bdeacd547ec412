//! Error types for the game layer.

use crate::{CardId, NobleId, TokenKind, UserId};

/// Rule violations and misuse of the game engine.
///
/// Every variant is raised *before* any state changes, so a failed call
/// leaves the game exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// `start` was called with fewer than 2 or more than 4 players.
    #[error("a game needs between 2 and 4 players, got {0}")]
    InvalidPlayerCount(usize),

    /// `start` was called twice.
    #[error("the game has already been started")]
    AlreadyStarted,

    /// A play operation was attempted before `start`.
    #[error("the game has not been started yet")]
    NotStarted,

    /// A play operation was attempted after the game ended.
    #[error("the game is already finished")]
    GameFinished,

    /// The acting user is not seated in this game.
    #[error("user {0} is not a player in this game")]
    NotAPlayer(UserId),

    /// The acting user is seated, but it is someone else's turn.
    #[error("it is not the turn of user {0}")]
    NotYourTurn(UserId),

    /// The requested token set is not a legal take.
    #[error("invalid token combination: {0}")]
    InvalidTokenCombination(String),

    /// Somebody (table or player) does not hold enough tokens of a kind.
    #[error("not enough {kind} tokens: requested {requested}, available {available}")]
    InsufficientResources {
        kind: TokenKind,
        requested: u8,
        available: u8,
    },

    /// Taking the tokens would push the player over the hand limit.
    #[error("a player may hold at most {limit} tokens, this would make {would_hold}")]
    TokenLimitExceeded { would_hold: u32, limit: u32 },

    /// The card is not in any revealed window.
    #[error("card {0} is not on the table")]
    CardNotFound(CardId),
}

/// Problems loading a card/noble catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("card {0} appears more than once")]
    DuplicateCard(CardId),

    #[error("noble {0} appears more than once")]
    DuplicateNoble(NobleId),

    /// Cards must grant a colored bonus and cost only colored tokens.
    #[error("card {0} uses the wildcard kind")]
    WildcardCard(CardId),
}
