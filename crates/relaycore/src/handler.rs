//! Per-connection handler for the game node: wraps one accepted client
//! stream in a [`Session`] and drives it to completion.

use std::sync::Arc;

use relaycore_protocol::{ClientMessage, ServerMessage};
use relaycore_room::RoomRegistry;
use relaycore_session::Session;
use relaycore_transport::Connection;

use crate::Error;

/// Binds `connection` to a fresh session against `registry` and runs it
/// until the stream is cancelled or a transport-fatal error occurs.
pub(crate) async fn handle_game_connection<C, E>(registry: Arc<RoomRegistry>, connection: C) -> Result<(), Error>
where
    C: Connection<ClientMessage, ServerMessage, Error = E>,
    E: std::error::Error + Send + Sync,
{
    let session = Session::new(registry, connection);
    let actor_id = session.actor_id();
    tracing::debug!(%actor_id, "dispatching session to handler");
    session.run().await.map_err(Error::from)
}
