//! Per-client session handler.
//!
//! A [`Session`] bridges one already-accepted [`Connection`](relaycore_transport::Connection)
//! to the room engine: inbound `JoinRoom`/`LeaveRoom`/`SendMessage`
//! commands are applied against the [`RoomRegistry`](relaycore_room::RoomRegistry),
//! and whatever room the session currently occupies has its event queue
//! multiplexed back onto the same stream. There is no authentication or
//! reconnection surface here — identity is a fresh [`ActorId`](relaycore_protocol::ActorId)
//! minted for the stream's lifetime, and a dropped connection is an
//! authoritative leave.

mod bridge;
mod error;

pub use bridge::Session;
pub use error::SessionError;
