//! Master-node-facing surface: the `RegisterGameServer` stream and the
//! `Update` RPC that game nodes use to report their room status.

use std::sync::Arc;

use relaycore_protocol::{GameServerAddr, GameServerId, MasterServerMessage, RoomListEntry, RoomStatus};
use relaycore_transport::Connection;

use crate::{Fleet, FleetError};

/// Handle to the game-node-facing `RegisterGameServer`/`Update` surface.
pub struct MasterSurface {
    fleet: Arc<Fleet>,
}

impl MasterSurface {
    pub fn new(fleet: Arc<Fleet>) -> Self {
        Self { fleet }
    }

    /// Registers a game node, assigning it a fresh [`GameServerId`].
    pub fn register_game_server(&self, addr: GameServerAddr, capacity: u32) -> GameServerId {
        self.fleet.register_game_server(addr, capacity)
    }

    /// Drives a `RegisterGameServer` stream: sends `Registered` first,
    /// then forwards every subsequent allocation event whose target
    /// address matches this node's, until the stream is cancelled.
    pub async fn run_register_stream<C, E>(
        &self,
        game_server_id: GameServerId,
        addr: &GameServerAddr,
        conn: &C,
    ) -> Result<(), FleetError>
    where
        C: Connection<(), MasterServerMessage, Error = E>,
        E: std::error::Error + Send + Sync,
    {
        conn.send(MasterServerMessage::Registered { game_server_id })
            .await
            .map_err(|e| FleetError::Transport(e.to_string()))?;

        let (sub_id, mut events) = self.fleet.subscribe();
        let result = self.drive_register_stream(addr, conn, &mut events).await;
        self.fleet.unsubscribe(sub_id);
        result
    }

    async fn drive_register_stream<C, E>(
        &self,
        addr: &GameServerAddr,
        conn: &C,
        events: &mut tokio::sync::mpsc::Receiver<crate::RoomAllocatedEvent>,
    ) -> Result<(), FleetError>
    where
        C: Connection<(), MasterServerMessage, Error = E>,
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
                        Some(ev) if &ev.game_server_addr == addr => {
                            let room = RoomListEntry { room_id: ev.room_status.room_id, room_name: ev.room_status.room_name };
                            conn.send(MasterServerMessage::RoomAllocation { room })
                                .await
                                .map_err(|e| FleetError::Transport(e.to_string()))?;
                        }
                        Some(_) => continue,
                    }
                }
            }
        }
    }

    /// Applies a batch of status updates reported via the `Update` RPC.
    ///
    /// `game_server_id` is the value already parsed from the
    /// `quark-gameserver-id` metadata header via
    /// [`GameServerId::from_metadata_value`](relaycore_protocol::GameServerId::from_metadata_value)
    /// — `None` when the header was absent or did not parse, in which case
    /// this surfaces [`FleetError::MissingAuth`] rather than treating it as
    /// an unregistered (but well-formed) id.
    pub fn handle_update(
        &self,
        game_server_id: Option<GameServerId>,
        updates: Vec<RoomStatus>,
    ) -> Result<(), FleetError> {
        let game_server_id = game_server_id.ok_or(FleetError::MissingAuth)?;
        if !self.fleet.is_registered_game_server(game_server_id) {
            return Err(FleetError::Unauthorized(game_server_id));
        }
        for status in updates {
            self.fleet.update_room_status(status)?;
        }
        Ok(())
    }
}
