//! Room lifecycle and the room directory for the Splendor server.
//!
//! A room gathers 2–4 users around one game. Rooms are found by name,
//! joined by a six-character enter code plus password, and started by
//! their owner.
//!
//! # Key types
//!
//! - [`Room`]: membership, owner, state, and the room's [`Game`](splendor_game::Game)
//! - [`RoomDirectory`]: every room on the server, plus the indices that
//!   keep names unique and users in at most one room
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`]: player limits and the random seed
//!
//! # Locking
//!
//! Each room sits behind its own `parking_lot::Mutex`, so unrelated rooms
//! never wait for each other. The directory keeps a separate lock for its
//! indices. When both are needed the directory lock is taken first.

mod config;
mod directory;
mod error;
mod room;
mod user;

pub use config::{ENTER_CODE_LEN, RoomConfig, RoomState};
pub use directory::RoomDirectory;
pub use error::RoomError;
pub use room::{GameUpdate, LeaveOutcome, Room, RoomInfo};
pub use user::User;
