//! The room directory: every room on the server and the indices that
//! span them.
//!
//! Two invariants cross room boundaries: room names are unique, and a
//! user is a member of at most one room. Both are enforced by a
//! check-then-insert under the directory lock. Everything that only
//! concerns one room runs under that room's own lock instead.
//!
//! ```text
//! RoomDirectory
//!   ├─ index: Mutex<DirectoryIndex>   names, enter codes, memberships, users
//!   └─ rooms: uuid → Arc<Mutex<Room>>  one lock per room
//! ```
//!
//! Lock order is always directory → room. No method awaits or does I/O
//! while holding either.
//!
//! The `*_with` variants take a `notify` callback that runs on the
//! result while the room lock is still held. Whatever it records or
//! queues is therefore ordered the same way as the room's updates.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use splendor_game::{CardId, Catalog, TokenPool, UserId};
use splendor_transport::ConnectionId;
use uuid::Uuid;

use crate::room::generate_enter_code;
use crate::{
    ENTER_CODE_LEN, GameUpdate, LeaveOutcome, Room, RoomConfig, RoomError,
    RoomInfo, User,
};

/// Everything guarded by the directory lock.
struct DirectoryIndex {
    rooms: HashMap<Uuid, Arc<Mutex<Room>>>,
    names: HashMap<String, Uuid>,
    codes: HashMap<String, Uuid>,
    /// Which room each user is a member of. At most one per user.
    memberships: HashMap<UserId, Uuid>,
    /// Users seen on create/join, with their latest connection.
    users: HashMap<UserId, User>,
    /// Source of enter codes and per-game seeds.
    rng: StdRng,
}

impl DirectoryIndex {
    fn unique_enter_code(&mut self, len: usize) -> String {
        loop {
            let code = generate_enter_code(len, &mut self.rng);
            if !self.codes.contains_key(&code) {
                return code;
            }
        }
    }

    fn room(&self, id: Uuid) -> Result<Arc<Mutex<Room>>, RoomError> {
        self.rooms.get(&id).cloned().ok_or(RoomError::NotFound)
    }

    fn remove_room(&mut self, info: &RoomInfo) {
        self.rooms.remove(&info.uuid);
        self.names.remove(&info.name);
        self.codes.remove(&info.enter_code);
        tracing::info!(room = %info.uuid, name = %info.name, "room removed");
    }
}

/// All rooms on the server.
pub struct RoomDirectory {
    catalog: Arc<dyn Catalog>,
    config: RoomConfig,
    index: Mutex<DirectoryIndex>,
}

impl RoomDirectory {
    /// Creates an empty directory whose games draw from `catalog`.
    ///
    /// With `config.seed` set, enter codes and every game's draws are
    /// reproducible.
    pub fn new(catalog: Arc<dyn Catalog>, config: RoomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            catalog,
            config,
            index: Mutex::new(DirectoryIndex {
                rooms: HashMap::new(),
                names: HashMap::new(),
                codes: HashMap::new(),
                memberships: HashMap::new(),
                users: HashMap::new(),
                rng,
            }),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Registers a new room owned by `owner`.
    ///
    /// # Errors
    /// - [`RoomError::DuplicateName`] if the name is taken
    /// - [`RoomError::UserAlreadyInRoom`] if `owner` is a member elsewhere
    pub fn create_room(
        &self,
        owner: User,
        name: &str,
        password: &str,
    ) -> Result<RoomInfo, RoomError> {
        let mut index = self.index.lock();
        if index.names.contains_key(name) {
            return Err(RoomError::DuplicateName);
        }
        if index.memberships.contains_key(&owner.id) {
            return Err(RoomError::UserAlreadyInRoom);
        }

        let enter_code = index.unique_enter_code(ENTER_CODE_LEN);
        let room = Room::new(name, password, enter_code, owner.clone(), &self.config);
        let info = room.info();

        index.names.insert(info.name.clone(), info.uuid);
        index.codes.insert(info.enter_code.clone(), info.uuid);
        index.memberships.insert(owner.id, info.uuid);
        index.rooms.insert(info.uuid, Arc::new(Mutex::new(room)));
        tracing::info!(room = %info.uuid, name, owner = %owner.id, "room created");
        index.users.insert(owner.id, owner);

        Ok(info)
    }

    /// Adds `user` to the room with `enter_code`.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] for an unknown code
    /// - [`RoomError::UserAlreadyInRoom`] if `user` is a member anywhere
    /// - anything [`Room::join`] rejects
    pub fn join_room(
        &self,
        user: User,
        enter_code: &str,
        password: &str,
    ) -> Result<RoomInfo, RoomError> {
        self.join_room_with(user, enter_code, password, |_| {})
    }

    pub fn join_room_with(
        &self,
        user: User,
        enter_code: &str,
        password: &str,
        notify: impl FnOnce(&RoomInfo),
    ) -> Result<RoomInfo, RoomError> {
        let mut index = self.index.lock();
        let room_id = *index.codes.get(enter_code).ok_or(RoomError::NotFound)?;
        if index.memberships.contains_key(&user.id) {
            return Err(RoomError::UserAlreadyInRoom);
        }
        let room = index.room(room_id)?;

        let info = {
            let mut room = room.lock();
            room.join(user.clone(), password)?;
            let info = room.info();
            notify(&info);
            info
        };
        index.memberships.insert(user.id, room_id);
        index.users.insert(user.id, user);
        Ok(info)
    }

    /// Removes `user` from the room `room_id`, dropping the room if it
    /// ends up empty.
    pub fn leave_room(
        &self,
        user: UserId,
        room_id: Uuid,
    ) -> Result<LeaveOutcome, RoomError> {
        self.leave_room_with(user, room_id, |_| {})
    }

    pub fn leave_room_with(
        &self,
        user: UserId,
        room_id: Uuid,
        notify: impl FnOnce(&LeaveOutcome),
    ) -> Result<LeaveOutcome, RoomError> {
        let mut index = self.index.lock();
        let room = index.room(room_id)?;
        let outcome = room.lock().leave(user).inspect(notify)?;

        index.memberships.remove(&user);
        if outcome.emptied {
            index.remove_room(&outcome.room);
        }
        Ok(outcome)
    }

    /// Starts the game in `room_id` on behalf of `requester`.
    pub fn start_game(
        &self,
        requester: UserId,
        room_id: Uuid,
    ) -> Result<GameUpdate, RoomError> {
        self.start_game_with(requester, room_id, |_| {})
    }

    pub fn start_game_with(
        &self,
        requester: UserId,
        room_id: Uuid,
        notify: impl FnOnce(&GameUpdate),
    ) -> Result<GameUpdate, RoomError> {
        let (room, seed) = {
            let mut index = self.index.lock();
            let room = index.room(room_id)?;
            (room, index.rng.random::<u64>())
        };
        let rng = StdRng::seed_from_u64(seed);
        room.lock()
            .start(requester, Arc::clone(&self.catalog), rng)
            .inspect(notify)
    }

    pub fn take_tokens(
        &self,
        user: UserId,
        room_id: Uuid,
        tokens: &TokenPool,
    ) -> Result<GameUpdate, RoomError> {
        self.take_tokens_with(user, room_id, tokens, |_| {})
    }

    pub fn take_tokens_with(
        &self,
        user: UserId,
        room_id: Uuid,
        tokens: &TokenPool,
        notify: impl FnOnce(&GameUpdate),
    ) -> Result<GameUpdate, RoomError> {
        self.with_room(room_id, |room| {
            room.take_tokens(user, tokens).inspect(notify)
        })
    }

    pub fn buy_card(
        &self,
        user: UserId,
        room_id: Uuid,
        card: CardId,
    ) -> Result<GameUpdate, RoomError> {
        self.buy_card_with(user, room_id, card, |_| {})
    }

    pub fn buy_card_with(
        &self,
        user: UserId,
        room_id: Uuid,
        card: CardId,
        notify: impl FnOnce(&GameUpdate),
    ) -> Result<GameUpdate, RoomError> {
        self.with_room(room_id, |room| room.buy_card(user, card).inspect(notify))
    }

    /// Runs `f` under the lock of one room.
    ///
    /// The directory lock is released before the room lock is taken, so
    /// `f` never blocks operations on other rooms.
    pub fn with_room<T>(
        &self,
        room_id: Uuid,
        f: impl FnOnce(&mut Room) -> Result<T, RoomError>,
    ) -> Result<T, RoomError> {
        let room = self.index.lock().room(room_id)?;
        let mut room = room.lock();
        f(&mut room)
    }

    pub fn find_room_by_name(&self, name: &str) -> Option<RoomInfo> {
        let index = self.index.lock();
        let id = index.names.get(name)?;
        let room = index.rooms.get(id)?;
        Some(room.lock().info())
    }

    pub fn room_info(&self, room_id: Uuid) -> Option<RoomInfo> {
        let index = self.index.lock();
        let room = index.rooms.get(&room_id)?;
        Some(room.lock().info())
    }

    pub fn is_user_in_room(&self, user: UserId) -> bool {
        self.index.lock().memberships.contains_key(&user)
    }

    /// The room `user` is a member of, if any.
    pub fn room_of(&self, user: UserId) -> Option<Uuid> {
        self.index.lock().memberships.get(&user).copied()
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.index.lock().users.get(&id).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.index.lock().rooms.len()
    }

    /// Forgets every user whose latest connection is `connection`,
    /// removing them from their rooms.
    ///
    /// Returns one outcome per room departure so callers can notify the
    /// members left behind.
    pub fn drop_connection(&self, connection: ConnectionId) -> Vec<LeaveOutcome> {
        self.drop_connection_with(connection, |_| {})
    }

    /// Like [`drop_connection`](Self::drop_connection), calling `notify`
    /// on each departure under its room's lock.
    pub fn drop_connection_with(
        &self,
        connection: ConnectionId,
        mut notify: impl FnMut(&LeaveOutcome),
    ) -> Vec<LeaveOutcome> {
        let mut index = self.index.lock();
        let gone: Vec<UserId> = index
            .users
            .values()
            .filter(|u| u.connection == connection)
            .map(|u| u.id)
            .collect();

        let mut outcomes = Vec::new();
        for user in gone {
            index.users.remove(&user);
            let Some(room_id) = index.memberships.remove(&user) else {
                continue;
            };
            let Ok(room) = index.room(room_id) else {
                continue;
            };
            let outcome = room.lock().leave(user).inspect(&mut notify);
            match outcome {
                Ok(outcome) => {
                    if outcome.emptied {
                        index.remove_room(&outcome.room);
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    tracing::warn!(%user, room = %room_id, error = %e, "membership index out of sync");
                }
            }
        }
        if !outcomes.is_empty() {
            tracing::debug!(%connection, departures = outcomes.len(), "connection dropped");
        }
        outcomes
    }
}

impl fmt::Debug for RoomDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomDirectory")
            .field("config", &self.config)
            .field("rooms", &self.room_count())
            .finish_non_exhaustive()
    }
}
