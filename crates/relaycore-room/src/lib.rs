//! Room broadcast engine and registry for a game node.
//!
//! A [`Room`](room::RoomHandle) is a single-owner actor: joins, leaves,
//! and sends are all serialized through one mailbox, so every member sees
//! the same total order of events. The [`RoomRegistry`] sits in front of
//! it, mapping names to rooms idempotently and ids to handles.

mod config;
mod error;
mod registry;
mod room;

pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{spawn_room, RoomEntry, RoomEvent, RoomHandle, RoomInfo};
