//! # relaycore
//!
//! Two-tier realtime multiplayer session infrastructure: a master node
//! that tracks a fleet of game nodes and allocates named rooms onto them,
//! and game nodes that host in-memory rooms where every member's message
//! is broadcast to every other member.
//!
//! ```text
//! client ──Service stream──> GameNodeServer ──session──> Room (registry)
//!
//! game node ──RegisterGameServer/Update──> MasterServer ──> Fleet
//! lobby client ──CreateRoom/JoinRoom/InLobby──> MasterServer ──> Fleet
//! ```
//!
//! This crate only wires the layers below it together — [`GameNodeServer`]
//! and [`MasterServer`] — it does not open sockets or frame bytes. Both
//! take an already-established [`relaycore_transport::Connection`]; giving
//! that a real network backing (gRPC, WebSocket) is an integrator's job.

mod error;
mod handler;
mod server;

pub use error::Error;
pub use server::{GameNodeServer, MasterServer};

/// Installs a `tracing-subscriber` formatter honoring `RUST_LOG`, falling
/// back to `info` if unset. Call once at process start; an integrator
/// embedding multiple `relaycore` processes in one binary should install
/// their own subscriber instead and skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

pub mod prelude {
    pub use crate::{Error, GameNodeServer, MasterServer};
    pub use relaycore_protocol::*;
    pub use relaycore_room::{RoomConfig, RoomEntry, RoomEvent, RoomRegistry};
    pub use relaycore_session::Session;
    pub use relaycore_fleet::{Fleet, FleetConfig, RoomAllocatedEvent};
    pub use relaycore_transport::{ChannelConnection, Connection, ConnectionId};
}
