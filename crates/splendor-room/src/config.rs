//! Room configuration and state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use splendor_game::{MAX_PLAYERS, MIN_PLAYERS};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Length of every enter code. Clients validate codes against this
/// exact length, so it is fixed rather than configurable.
pub const ENTER_CODE_LEN: usize = 6;

/// Settings shared by every room in a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum members required to start the game.
    pub min_players: usize,

    /// Maximum members allowed in the room.
    pub max_players: usize,

    /// Seed for enter codes and card draws. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions are strictly ordered, no skipping states:
///
/// ```text
/// Lobby → Active → Finished
/// ```
///
/// - **Lobby**: accepting joins, waiting for the owner to start.
/// - **Active**: a game is running; members take turns.
/// - **Finished**: someone won or a member walked out. The final state
///   stays visible but nothing can change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomState {
    Lobby,
    Active,
    Finished,
}

impl RoomState {
    /// Returns `true` if the room is accepting new members.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` while a game is being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the next state, or `None` from the terminal state.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "LOBBY"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}
