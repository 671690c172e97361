//! Transport abstraction for the room/fleet stack.
//!
//! Provides the [`Connection`] trait: a typed bidirectional message stream
//! with cancellation-on-disconnect, which is exactly the substrate the core
//! presumes and nothing more. Real network framing (gRPC, WebSocket) is an
//! integrator's concern; this crate ships [`ChannelConnection`], an
//! in-process implementation used as the default substrate for embedding
//! and for tests.

mod channel;
mod error;

pub use channel::ChannelConnection;
pub use error::TransportError;

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection, scoped to one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One bidirectional stream of typed messages: `In` is what arrives from
/// the peer, `Out` is what this side sends.
///
/// This is the generalization of a raw-byte connection to the actual
/// message types the layers above exchange — the session handler speaks
/// `Connection<ClientMessage, ServerMessage>`, the game-node registration
/// stream speaks `Connection<RegisterGameServerRequest, MasterServerMessage>`,
/// and so on, all without this crate knowing what those types are.
///
/// Methods are written as `fn(..) -> impl Future<..> + Send` rather than
/// plain `async fn` so that a future spawned over a *generic* `C: Connection`
/// (as `GameNodeServer::spawn_session` and `relaycore-fleet`'s stream
/// drivers do) is provably `Send` to `tokio::spawn`. Plain `async fn` in a
/// trait carries no such bound, which only goes unnoticed as long as every
/// caller spawns a concrete connection type, the way the single-role
/// teacher server does; this crate's two-role, connection-generic servers
/// need the bound spelled out.
pub trait Connection<In, Out>: Send + Sync + 'static
where
    In: Send + 'static,
    Out: Send + 'static,
{
    type Error: std::error::Error + Send + Sync;

    /// Sends a message to the peer.
    fn send(&self, msg: Out) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next message from the peer.
    ///
    /// Returns `Ok(None)` when the stream is cleanly closed — this is the
    /// cancellation-on-disconnect signal the rest of the stack treats as
    /// authoritative shutdown (§5).
    fn recv(&self) -> impl Future<Output = Result<Option<In>, Self::Error>> + Send;

    /// Closes this side of the stream.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
