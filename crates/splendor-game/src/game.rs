//! The game engine: one playing session.
//!
//! A [`Game`] is created unstarted (it only knows its catalog and its
//! random source). [`Game::start`] performs the one-time randomized setup;
//! after that the state changes only through [`Game::take_tokens`],
//! [`Game::buy_card`] and [`Game::refill`], each of which checks every rule
//! before touching anything.
//!
//! ```text
//!   new() ──start()──→ playing ──(someone reaches 15 prestige)──→ finished
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    Card, CardId, Catalog, Deck, GameError, Noble, PlayerHand, PlayerView, Tier,
    TokenKind, TokenPool, UserId, draw_many,
};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
/// Gold tokens on the table, whatever the player count.
pub const GOLD_TOKENS: u8 = 5;
/// Size of each tier's face-up window.
pub const REVEALED_PER_TIER: usize = 4;
pub const NOBLES_PER_GAME: usize = 4;
pub const WINNING_PRESTIGE: u32 = 15;
/// Most tokens a player may hold after taking.
pub const MAX_HAND_TOKENS: u32 = 10;

/// Colored tokens per kind for a player count, or `None` if the count is
/// not playable.
pub fn colored_stack_for(players: usize) -> Option<u8> {
    match players {
        2 => Some(4),
        3 => Some(5),
        4 => Some(7),
        _ => None,
    }
}

/// One playing session.
pub struct Game {
    catalog: Arc<dyn Catalog>,
    rng: StdRng,
    board: Option<Board>,
}

/// Everything that exists only once the game has started.
#[derive(Debug, Clone)]
struct Board {
    table: TokenPool,
    max_token_stack: u8,
    decks: [Deck; 3],
    revealed: [Vec<Card>; 3],
    nobles: Vec<Noble>,
    players: Vec<PlayerHand>,
    turn: usize,
    finished: bool,
    winner: Option<UserId>,
}

/// The result of a successful [`Game::buy_card`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub card: Card,
    /// The card that took its place in the window, if the deck had one.
    pub replacement: Option<Card>,
    /// The noble that visited the buyer, if any.
    pub noble: Option<Noble>,
}

/// Everything clients are allowed to see about a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub tokens: TokenPool,
    pub max_token_stack: u8,
    pub revealed: BTreeMap<Tier, Vec<Card>>,
    pub deck_sizes: BTreeMap<Tier, usize>,
    pub nobles: Vec<Noble>,
    pub players: Vec<PlayerView>,
    pub current_player: UserId,
    pub finished: bool,
    pub winner: Option<UserId>,
}

impl Game {
    /// Creates an unstarted game drawing from `catalog` with `rng`.
    pub fn new(catalog: Arc<dyn Catalog>, rng: StdRng) -> Self {
        Self {
            catalog,
            rng,
            board: None,
        }
    }

    /// Sets up the table for `players` (in seating order).
    ///
    /// Colored piles get 4/5/7 tokens for 2/3/4 players, gold gets 5, each
    /// tier reveals up to 4 random cards and up to 4 random nobles are
    /// drawn. The first player in `players` moves first.
    ///
    /// # Errors
    /// - [`GameError::AlreadyStarted`] on a second call
    /// - [`GameError::InvalidPlayerCount`] outside 2..=4
    ///
    /// Nothing changes when an error is returned.
    pub fn start(&mut self, players: &[UserId]) -> Result<(), GameError> {
        if self.board.is_some() {
            return Err(GameError::AlreadyStarted);
        }
        let max_token_stack = colored_stack_for(players.len())
            .ok_or(GameError::InvalidPlayerCount(players.len()))?;

        let mut table = TokenPool::new();
        for kind in TokenKind::COLORS {
            table.set(kind, max_token_stack);
        }
        table.set(TokenKind::Gold, GOLD_TOKENS);

        let mut decks =
            Tier::ALL.map(|tier| Deck::new(tier, self.catalog.cards(tier)));
        let revealed: [Vec<Card>; 3] = std::array::from_fn(|i| {
            decks[i].draw_many(REVEALED_PER_TIER, &mut self.rng)
        });

        let mut noble_pool = self.catalog.nobles();
        let nobles = draw_many(&mut noble_pool, NOBLES_PER_GAME, &mut self.rng);

        self.board = Some(Board {
            table,
            max_token_stack,
            decks,
            revealed,
            nobles,
            players: players.iter().map(|&id| PlayerHand::new(id)).collect(),
            turn: 0,
            finished: false,
            winner: None,
        });

        tracing::info!(
            players = players.len(),
            max_token_stack,
            "game started"
        );
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.board.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.board.as_ref().is_some_and(|b| b.finished)
    }

    pub fn winner(&self) -> Option<UserId> {
        self.board.as_ref().and_then(|b| b.winner)
    }

    pub fn table(&self) -> Result<&TokenPool, GameError> {
        Ok(&self.board()?.table)
    }

    pub fn max_token_stack(&self) -> Result<u8, GameError> {
        Ok(self.board()?.max_token_stack)
    }

    /// The face-up cards of one tier.
    pub fn revealed(&self, tier: Tier) -> Result<&[Card], GameError> {
        Ok(&self.board()?.revealed[tier.index()])
    }

    pub fn deck(&self, tier: Tier) -> Result<&Deck, GameError> {
        Ok(&self.board()?.decks[tier.index()])
    }

    /// Nobles still waiting on the table.
    pub fn nobles(&self) -> Result<&[Noble], GameError> {
        Ok(&self.board()?.nobles)
    }

    pub fn hand(&self, player: UserId) -> Result<&PlayerHand, GameError> {
        self.board()?
            .players
            .iter()
            .find(|h| h.id == player)
            .ok_or(GameError::NotAPlayer(player))
    }

    pub fn current_player(&self) -> Result<UserId, GameError> {
        let board = self.board()?;
        Ok(board.players[board.turn].id)
    }

    /// Tops the tier's window back up to 4 from its deck.
    ///
    /// Returns the newly revealed cards. When the deck runs dry the window
    /// simply stays short.
    pub fn refill(&mut self, tier: Tier) -> Result<Vec<Card>, GameError> {
        let board = self.board.as_mut().ok_or(GameError::NotStarted)?;
        Ok(board.refill(tier, &mut self.rng))
    }

    /// Takes tokens from the table into `player`'s hand.
    ///
    /// Legal takes: one token each of 1–3 different colors, or two tokens
    /// of one color when the table holds at least 4 of it. Gold is never
    /// taken directly.
    pub fn take_tokens(
        &mut self,
        player: UserId,
        request: &TokenPool,
    ) -> Result<(), GameError> {
        let board = self.board.as_mut().ok_or(GameError::NotStarted)?;
        let seat = board.seat_for_turn(player)?;

        check_take_shape(&board.table, request)?;
        for (kind, n) in request.iter() {
            let available = board.table.get(kind);
            if available < n {
                return Err(GameError::InsufficientResources {
                    kind,
                    requested: n,
                    available,
                });
            }
        }
        let would_hold = board.players[seat].tokens.total() + request.total();
        if would_hold > MAX_HAND_TOKENS {
            return Err(GameError::TokenLimitExceeded {
                would_hold,
                limit: MAX_HAND_TOKENS,
            });
        }

        for (kind, n) in request.iter() {
            board.table.remove(kind, n)?;
            board.players[seat].tokens.add(kind, n);
        }
        board.advance_turn();

        tracing::debug!(%player, taken = request.total(), "tokens taken");
        Ok(())
    }

    /// Buys a face-up card for `player`.
    ///
    /// The payment goes back to the table, the window is refilled, a noble
    /// may visit, and the turn passes. Reaching 15 prestige ends the game.
    pub fn buy_card(
        &mut self,
        player: UserId,
        card_id: CardId,
    ) -> Result<Purchase, GameError> {
        let board = self.board.as_mut().ok_or(GameError::NotStarted)?;
        let seat = board.seat_for_turn(player)?;

        let (tier, position) = board
            .locate_revealed(card_id)
            .ok_or(GameError::CardNotFound(card_id))?;
        let payment = board.players[seat]
            .payment_for(&board.revealed[tier.index()][position])?;

        for (kind, n) in payment.iter() {
            board.players[seat].tokens.remove(kind, n)?;
            board.return_to_table(kind, n);
        }
        let card = board.revealed[tier.index()].remove(position);
        board.players[seat].cards.push(card.clone());

        let replacement = board.refill(tier, &mut self.rng).into_iter().next();
        let noble = board.visit_noble(seat);
        board.advance_turn();
        board.check_finished();

        tracing::debug!(
            %player,
            card = %card.id,
            noble = noble.is_some(),
            "card bought"
        );
        Ok(Purchase {
            card,
            replacement,
            noble,
        })
    }

    /// A serializable view of the whole table.
    pub fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        let board = self.board()?;
        Ok(GameSnapshot {
            tokens: board.table.clone(),
            max_token_stack: board.max_token_stack,
            revealed: Tier::ALL
                .iter()
                .map(|&t| (t, board.revealed[t.index()].clone()))
                .collect(),
            deck_sizes: Tier::ALL
                .iter()
                .map(|&t| (t, board.decks[t.index()].len()))
                .collect(),
            nobles: board.nobles.clone(),
            players: board.players.iter().map(PlayerHand::view).collect(),
            current_player: board.players[board.turn].id,
            finished: board.finished,
            winner: board.winner,
        })
    }

    fn board(&self) -> Result<&Board, GameError> {
        self.board.as_ref().ok_or(GameError::NotStarted)
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("started", &self.is_started())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Seat index of `player` if they may act right now.
    fn seat_for_turn(&self, player: UserId) -> Result<usize, GameError> {
        if self.finished {
            return Err(GameError::GameFinished);
        }
        let seat = self
            .players
            .iter()
            .position(|h| h.id == player)
            .ok_or(GameError::NotAPlayer(player))?;
        if seat != self.turn {
            return Err(GameError::NotYourTurn(player));
        }
        Ok(seat)
    }

    fn locate_revealed(&self, card_id: CardId) -> Option<(Tier, usize)> {
        Tier::ALL.iter().find_map(|&tier| {
            self.revealed[tier.index()]
                .iter()
                .position(|c| c.id == card_id)
                .map(|pos| (tier, pos))
        })
    }

    fn refill(&mut self, tier: Tier, rng: &mut StdRng) -> Vec<Card> {
        let window = &mut self.revealed[tier.index()];
        let missing = REVEALED_PER_TIER.saturating_sub(window.len());
        let drawn = self.decks[tier.index()].draw_many(missing, rng);
        window.extend(drawn.iter().cloned());
        if window.len() < REVEALED_PER_TIER {
            tracing::debug!(%tier, shown = window.len(), "deck exhausted");
        }
        drawn
    }

    /// Puts paid tokens back, never above the pile's starting size.
    fn return_to_table(&mut self, kind: TokenKind, n: u8) {
        let cap = if kind.is_wildcard() {
            GOLD_TOKENS
        } else {
            self.max_token_stack
        };
        let current = self.table.get(kind);
        let next = current.saturating_add(n);
        if next > cap {
            tracing::warn!(%kind, current, returned = n, cap, "table pile over capacity, clamping");
        }
        self.table.set(kind, next.min(cap));
    }

    fn visit_noble(&mut self, seat: usize) -> Option<Noble> {
        let bonuses = self.players[seat].bonuses();
        let position = self
            .nobles
            .iter()
            .position(|n| bonuses.covers(&n.requirements))?;
        let noble = self.nobles.remove(position);
        self.players[seat].nobles.push(noble.clone());
        Some(noble)
    }

    fn advance_turn(&mut self) {
        self.turn = (self.turn + 1) % self.players.len();
    }

    fn check_finished(&mut self) {
        if !self
            .players
            .iter()
            .any(|p| p.prestige() >= WINNING_PRESTIGE)
        {
            return;
        }
        self.finished = true;
        self.winner = self
            .players
            .iter()
            .max_by(|a, b| {
                a.prestige()
                    .cmp(&b.prestige())
                    .then(b.cards.len().cmp(&a.cards.len()))
            })
            .map(|p| p.id);
        tracing::info!(winner = ?self.winner, "game finished");
    }
}

/// Checks the shape of a take, independent of what the table holds
/// (except for the "two of a kind needs four on the table" rule).
fn check_take_shape(
    table: &TokenPool,
    request: &TokenPool,
) -> Result<(), GameError> {
    let entries: Vec<(TokenKind, u8)> = request.iter().collect();
    let invalid = |reason: &str| {
        Err(GameError::InvalidTokenCombination(reason.to_string()))
    };

    if entries.is_empty() {
        return invalid("no tokens requested");
    }
    if entries.iter().any(|(kind, _)| kind.is_wildcard()) {
        return invalid("gold tokens cannot be taken");
    }
    match entries.as_slice() {
        [(_, 1)] => Ok(()),
        [(kind, 2)] => {
            if table.get(*kind) >= 4 {
                Ok(())
            } else {
                invalid("two tokens of one kind need at least 4 on the table")
            }
        }
        [(_, _)] => invalid("at most 2 tokens of one kind can be taken"),
        many if many.len() > 3 => {
            invalid("at most 3 different kinds can be taken")
        }
        many if many.iter().all(|(_, n)| *n == 1) => Ok(()),
        _ => invalid("different kinds must be taken one each"),
    }
}
