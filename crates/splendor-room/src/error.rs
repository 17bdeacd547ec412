//! Error types for the room layer.
//!
//! The messages are what clients see in FAILURE responses.

use splendor_game::GameError;

use crate::RoomState;

/// Errors that can occur during room and directory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Another room already uses this name.
    #[error("Room with specified name already exists!")]
    DuplicateName,

    /// The user is already a member of some room.
    #[error("Leave your current room before joining another.")]
    UserAlreadyInRoom,

    /// The room is at its player limit.
    #[error("The room is full.")]
    RoomFull,

    /// No room matches the id or enter code.
    #[error("Could not find a room with specified parameters.")]
    NotFound,

    /// The user is not a member of this room.
    #[error("You are not a member of this room.")]
    NotInRoom,

    #[error("Wrong room password.")]
    WrongPassword,

    /// Only the owner may start the game.
    #[error("Only the owner of the room can start the game.")]
    NotOwner,

    #[error("At least {min} players are needed to start the game, the room has {actual}.")]
    NotEnoughPlayers { min: usize, actual: usize },

    /// The room's lifecycle state forbids the operation.
    #[error("Cannot {action} while the room is {state}.")]
    InvalidState {
        state: RoomState,
        action: &'static str,
    },

    #[error(transparent)]
    Game(#[from] GameError),
}
