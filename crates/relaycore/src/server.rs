//! `GameNodeServer` and `MasterServer`: the two runnable roles this crate
//! wires together from the lower layers. Wire framing and socket
//! acceptance are an integrator's concern (§1 non-goals); these types take
//! already-established [`Connection`]s and own everything above that.

use std::sync::Arc;

use relaycore_fleet::{Fleet, FleetConfig, LobbySurface, MasterSurface};
use relaycore_protocol::{
    ClientMessage, CreateRoomResponse, GameServerAddr, GameServerId, JoinRoomResponse, LobbyMessage,
    MasterServerMessage, RoomId, RoomStatus, ServerMessage,
};
use relaycore_room::{RoomConfig, RoomRegistry};
use relaycore_transport::Connection;

use crate::handler::handle_game_connection;
use crate::Error;

/// A game node: owns a [`RoomRegistry`] and spawns one session per
/// accepted client connection.
pub struct GameNodeServer {
    registry: Arc<RoomRegistry>,
}

impl GameNodeServer {
    pub fn new(room_config: RoomConfig) -> Self {
        Self { registry: Arc::new(RoomRegistry::new(room_config)) }
    }

    /// The room registry backing this node, e.g. for the test-only direct
    /// `CreateRoom` surface (§6) that bypasses the master's lobby.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Test-surface room creation: idempotent by name, same as the
    /// registry itself. Production room creation goes through the
    /// master's lobby and `MasterSurface::handle_update`/allocation
    /// instead.
    pub fn create_room(&self, name: &str) -> (RoomId, bool) {
        self.registry.create_room(name)
    }

    /// Spawns a task that binds `connection` to a fresh session and runs
    /// it until the stream closes or a transport-fatal error occurs.
    pub fn spawn_session<C, E>(&self, connection: C) -> tokio::task::JoinHandle<Result<(), Error>>
    where
        C: Connection<ClientMessage, ServerMessage, Error = E> + 'static,
        E: std::error::Error + Send + Sync,
    {
        let registry = Arc::clone(&self.registry);
        tokio::spawn(handle_game_connection(registry, connection))
    }
}

/// The master node: owns a [`Fleet`] and exposes the lobby surface
/// (client-facing) and the master-server surface (game-node-facing).
pub struct MasterServer {
    fleet: Arc<Fleet>,
    lobby: LobbySurface,
    master: Arc<MasterSurface>,
}

impl MasterServer {
    pub fn new(fleet_config: FleetConfig) -> Self {
        let fleet = Arc::new(Fleet::new(fleet_config));
        let lobby = LobbySurface::new(Arc::clone(&fleet));
        let master = Arc::new(MasterSurface::new(Arc::clone(&fleet)));
        Self { fleet, lobby, master }
    }

    /// Direct access to the fleet, for diagnostics or advanced embedding.
    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    // --- lobby surface (client-facing) -----------------------------

    pub fn create_room(&self, room_name: &str) -> Result<CreateRoomResponse, Error> {
        self.lobby.create_room(room_name).map_err(Error::from)
    }

    pub fn join_room(&self, room_id: RoomId) -> Result<JoinRoomResponse, Error> {
        self.lobby.join_room(room_id).map_err(Error::from)
    }

    pub async fn run_in_lobby<C, E>(&self, conn: &C) -> Result<(), Error>
    where
        C: Connection<(), LobbyMessage, Error = E>,
        E: std::error::Error + Send + Sync,
    {
        self.lobby.run_in_lobby(conn).await.map_err(Error::from)
    }

    // --- master-server surface (game-node-facing) -------------------

    pub fn register_game_server(&self, addr: GameServerAddr, capacity: u32) -> GameServerId {
        self.master.register_game_server(addr, capacity)
    }

    pub async fn run_register_stream<C, E>(
        &self,
        game_server_id: GameServerId,
        addr: &GameServerAddr,
        conn: &C,
    ) -> Result<(), Error>
    where
        C: Connection<(), MasterServerMessage, Error = E>,
        E: std::error::Error + Send + Sync,
    {
        self.master.run_register_stream(game_server_id, addr, conn).await.map_err(Error::from)
    }

    /// Applies an `Update` RPC batch. `metadata_game_server_id` is the
    /// value already extracted from the `quark-gameserver-id` header (see
    /// [`relaycore_protocol::GAMESERVER_ID_METADATA_KEY`] and
    /// [`GameServerId::from_metadata_value`]) — pass `None` when the header
    /// was absent or failed to parse; that surfaces as
    /// [`relaycore_fleet::FleetError::MissingAuth`] rather than being
    /// silently treated as a well-formed but unregistered id.
    pub fn handle_update(
        &self,
        metadata_game_server_id: Option<GameServerId>,
        updates: Vec<RoomStatus>,
    ) -> Result<(), Error> {
        self.master.handle_update(metadata_game_server_id, updates).map_err(Error::from)
    }
}
