//! Lobby surface: the three client-facing operations on top of the fleet.
//!
//! Thin glue over [`Fleet`], as §4.4 describes it — the interesting logic
//! lives in the fleet itself.

use std::sync::Arc;

use relaycore_protocol::{CreateRoomResponse, JoinRoomResponse, LobbyMessage, RoomId};
use relaycore_transport::Connection;

use crate::{Fleet, FleetError};

/// Handle to the lobby's three operations: `CreateRoom`, `JoinRoom`, and
/// the `InLobby` room-list stream.
pub struct LobbySurface {
    fleet: Arc<Fleet>,
}

impl LobbySurface {
    pub fn new(fleet: Arc<Fleet>) -> Self {
        Self { fleet }
    }

    /// Allocates a fresh room under `room_name` (or a synthetic unique name
    /// if empty) and returns its id. Any allocation failure other than an
    /// id collision (`RoomAlreadyAllocated`) is a hard error; only that
    /// exact case folds into a successful response with `already_exist =
    /// true` — a real error is never silently mapped into a success.
    pub fn create_room(&self, room_name: &str) -> Result<CreateRoomResponse, FleetError> {
        let room_id = Self::fresh_room_id();
        let name = if room_name.is_empty() { format!("\0anon:{}", room_id.0) } else { room_name.to_string() };

        match self.fleet.allocate_room(room_id, name) {
            Ok(_addr) => Ok(CreateRoomResponse { room_id, already_exist: false }),
            Err(FleetError::RoomAlreadyAllocated(existing)) => {
                Ok(CreateRoomResponse { room_id: existing, already_exist: true })
            }
            Err(other) => Err(other),
        }
    }

    /// Resolves the game node address currently hosting `room_id`.
    pub fn join_room(&self, room_id: RoomId) -> Result<JoinRoomResponse, FleetError> {
        self.fleet
            .lookup_game_server_addr(room_id)
            .map(|game_server| JoinRoomResponse { game_server })
            .ok_or(FleetError::RoomNotFound(room_id))
    }

    /// Drives an `InLobby` subscriber: re-emits the full room list on every
    /// allocation event, until the stream is cancelled.
    pub async fn run_in_lobby<C, E>(&self, conn: &C) -> Result<(), FleetError>
    where
        C: Connection<(), LobbyMessage, Error = E>,
        E: std::error::Error + Send + Sync,
    {
        let (sub_id, mut events) = self.fleet.subscribe();
        let result = self.drive_in_lobby(conn, &mut events).await;
        self.fleet.unsubscribe(sub_id);
        result
    }

    async fn drive_in_lobby<C, E>(
        &self,
        conn: &C,
        events: &mut tokio::sync::mpsc::Receiver<crate::RoomAllocatedEvent>,
    ) -> Result<(), FleetError>
    where
        C: Connection<(), LobbyMessage, Error = E>,
        E: std::error::Error + Send + Sync,
    {
        loop {
            tokio::select! {
                incoming = conn.recv() => {
                    match incoming.map_err(|e| FleetError::Transport(e.to_string()))? {
                        None => return Ok(()),
                        Some(()) => continue,
                    }
                }
                event = events.recv() => {
                    match event {
                        None => return Ok(()),
                        Some(_) => {
                            let room_list = self.fleet.room_list();
                            conn.send(LobbyMessage::RoomListUpdated { room_list })
                                .await
                                .map_err(|e| FleetError::Transport(e.to_string()))?;
                        }
                    }
                }
            }
        }
    }

    fn fresh_room_id() -> RoomId {
        loop {
            let candidate = rand::random::<u64>();
            if candidate != 0 {
                return RoomId(candidate);
            }
        }
    }
}
