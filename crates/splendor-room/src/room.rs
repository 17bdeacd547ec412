//! A single room: membership, ownership, lifecycle, and its game.
//!
//! `Room` is plain data with synchronous methods. The directory wraps
//! each one in a mutex, and every method here validates everything it
//! needs before changing anything, so a rejected call leaves the room
//! exactly as it was.

use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use serde::Serialize;
use splendor_game::{
    CardId, Catalog, Game, GameError, GameSnapshot, Purchase, TokenPool,
    UserId,
};
use splendor_transport::ConnectionId;
use uuid::Uuid;

use crate::{RoomConfig, RoomError, RoomState, User};

/// A random alphanumeric enter code of `len` characters.
pub(crate) fn generate_enter_code<R: Rng + ?Sized>(
    len: usize,
    rng: &mut R,
) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// A snapshot of room metadata (not the game itself).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub uuid: Uuid,
    pub name: String,
    pub enter_code: String,
    pub owner: UserId,
    pub state: RoomState,
    /// Members in join order.
    pub members: Vec<User>,
    pub max_players: usize,
}

impl RoomInfo {
    /// Connections of every member, in join order.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|u| u.connection).collect()
    }

    pub fn member(&self, id: UserId) -> Option<&User> {
        self.members.iter().find(|u| u.id == id)
    }
}

/// What a successful start or move produced.
#[derive(Debug, Clone)]
pub struct GameUpdate {
    pub room: RoomInfo,
    pub game: GameSnapshot,
    /// Set only for card purchases.
    pub purchase: Option<Purchase>,
}

/// What a successful leave produced.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// The user who left.
    pub user: User,
    /// The room as it is after the departure.
    pub room: RoomInfo,
    /// Set when the owner left and ownership moved on.
    pub new_owner: Option<UserId>,
    /// `true` when the departure ended a running game.
    pub abandoned: bool,
    /// `true` when nobody is left. The directory drops such rooms.
    pub emptied: bool,
}

/// One room and, once started, its game.
pub struct Room {
    id: Uuid,
    name: String,
    password: String,
    enter_code: String,
    owner: UserId,
    members: Vec<User>,
    state: RoomState,
    min_players: usize,
    max_players: usize,
    game: Option<Game>,
}

impl Room {
    /// Creates a room in the lobby with `owner` as its only member.
    pub fn new(
        name: impl Into<String>,
        password: impl Into<String>,
        enter_code: impl Into<String>,
        owner: User,
        config: &RoomConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            password: password.into(),
            enter_code: enter_code.into(),
            owner: owner.id,
            members: vec![owner],
            state: RoomState::Lobby,
            min_players: config.min_players,
            max_players: config.max_players,
            game: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enter_code(&self) -> &str {
        &self.enter_code
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn members(&self) -> &[User] {
        &self.members
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.iter().any(|u| u.id == user)
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            uuid: self.id,
            name: self.name.clone(),
            enter_code: self.enter_code.clone(),
            owner: self.owner,
            state: self.state,
            members: self.members.clone(),
            max_players: self.max_players,
        }
    }

    /// Adds `user` as a member.
    ///
    /// # Errors
    /// - [`RoomError::UserAlreadyInRoom`] if already a member
    /// - [`RoomError::InvalidState`] unless the room is in the lobby
    /// - [`RoomError::RoomFull`] at the player limit
    /// - [`RoomError::WrongPassword`] if `password` does not match
    pub fn join(&mut self, user: User, password: &str) -> Result<(), RoomError> {
        if self.is_member(user.id) {
            return Err(RoomError::UserAlreadyInRoom);
        }
        if !self.state.is_joinable() {
            return Err(RoomError::InvalidState {
                state: self.state,
                action: "join",
            });
        }
        if self.members.len() >= self.max_players {
            return Err(RoomError::RoomFull);
        }
        if self.password != password {
            return Err(RoomError::WrongPassword);
        }

        tracing::info!(room = %self.id, user = %user.id, "user joined room");
        self.members.push(user);
        Ok(())
    }

    /// Removes `user` from the room.
    ///
    /// If the owner leaves, the earliest-joined remaining member becomes
    /// owner. Leaving a running game ends it.
    pub fn leave(&mut self, user: UserId) -> Result<LeaveOutcome, RoomError> {
        let position = self
            .members
            .iter()
            .position(|u| u.id == user)
            .ok_or(RoomError::NotInRoom)?;
        let departed = self.members.remove(position);

        let mut new_owner = None;
        if self.owner == user {
            if let Some(next) = self.members.first() {
                self.owner = next.id;
                new_owner = Some(next.id);
            }
        }

        let abandoned = self.state.is_active();
        if abandoned {
            self.state = RoomState::Finished;
            tracing::info!(room = %self.id, %user, "game abandoned");
        }

        tracing::info!(room = %self.id, %user, remaining = self.members.len(), "user left room");
        Ok(LeaveOutcome {
            user: departed,
            room: self.info(),
            new_owner,
            abandoned,
            emptied: self.members.is_empty(),
        })
    }

    /// Starts the game with the current members, in join order.
    ///
    /// # Errors
    /// - [`RoomError::NotInRoom`] / [`RoomError::NotOwner`] for the
    ///   wrong requester
    /// - [`RoomError::InvalidState`] unless the room is in the lobby
    /// - [`RoomError::NotEnoughPlayers`] below the minimum
    pub fn start(
        &mut self,
        requester: UserId,
        catalog: Arc<dyn Catalog>,
        rng: StdRng,
    ) -> Result<GameUpdate, RoomError> {
        if !self.is_member(requester) {
            return Err(RoomError::NotInRoom);
        }
        if self.owner != requester {
            return Err(RoomError::NotOwner);
        }
        if !self.state.can_transition_to(RoomState::Active) {
            return Err(RoomError::InvalidState {
                state: self.state,
                action: "start the game",
            });
        }
        if self.members.len() < self.min_players {
            return Err(RoomError::NotEnoughPlayers {
                min: self.min_players,
                actual: self.members.len(),
            });
        }

        let players: Vec<UserId> = self.members.iter().map(|u| u.id).collect();
        let mut game = Game::new(catalog, rng);
        game.start(&players)?;
        self.game = Some(game);
        self.state = RoomState::Active;

        tracing::info!(room = %self.id, players = players.len(), "game started in room");
        self.update(None)
    }

    /// Takes tokens for `user` from the table.
    pub fn take_tokens(
        &mut self,
        user: UserId,
        tokens: &TokenPool,
    ) -> Result<GameUpdate, RoomError> {
        self.playing(user, "take tokens")?.take_tokens(user, tokens)?;
        self.update(None)
    }

    /// Buys a revealed card for `user`. Moves the room to
    /// [`RoomState::Finished`] when the purchase ends the game.
    pub fn buy_card(
        &mut self,
        user: UserId,
        card: CardId,
    ) -> Result<GameUpdate, RoomError> {
        let purchase = self.playing(user, "buy a card")?.buy_card(user, card)?;
        if self.game.as_ref().is_some_and(Game::is_finished) {
            self.state = RoomState::Finished;
            tracing::info!(room = %self.id, "game finished");
        }
        self.update(Some(purchase))
    }

    /// The game, if `user` may play in it right now.
    fn playing(
        &mut self,
        user: UserId,
        action: &'static str,
    ) -> Result<&mut Game, RoomError> {
        if !self.is_member(user) {
            return Err(RoomError::NotInRoom);
        }
        if !self.state.is_active() {
            return Err(RoomError::InvalidState {
                state: self.state,
                action,
            });
        }
        Ok(self.game.as_mut().ok_or(GameError::NotStarted)?)
    }

    fn update(
        &self,
        purchase: Option<Purchase>,
    ) -> Result<GameUpdate, RoomError> {
        let game = self.game.as_ref().ok_or(GameError::NotStarted)?;
        Ok(GameUpdate {
            room: self.info(),
            game: game.snapshot()?,
            purchase,
        })
    }
}
