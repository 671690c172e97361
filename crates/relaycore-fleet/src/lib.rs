//! Fleet allocator, allocation event bus, and the thin lobby / master-node
//! surfaces built on top of it.
//!
//! - [`Fleet`] owns every registered game node and the RoomId → node
//!   mapping, runs the capacity-ordered placement algorithm, and fans out
//!   [`RoomAllocatedEvent`]s to subscribers — see §4.4.
//! - [`LobbySurface`] is the client-facing `CreateRoom`/`JoinRoom`/
//!   `InLobby` glue.
//! - [`MasterSurface`] is the game-node-facing `RegisterGameServer`/
//!   `Update` glue, including the `quark-gameserver-id` auth check.
//!
//! All mutable fleet state lives behind one `std::sync::RwLock` rather
//! than an async lock: no `.await` ever happens while it's held (even
//! publishing an allocation event is a non-blocking `try_send`), so a sync
//! lock is both correct and cheaper than an async one here.

mod config;
mod error;
mod fleet;
mod lobby;
mod masterserver;

pub use config::FleetConfig;
pub use error::FleetError;
pub use fleet::{Fleet, RoomAllocatedEvent, SubscriptionId};
pub use lobby::LobbySurface;
pub use masterserver::MasterSurface;
