//! Error types for the session layer.

/// Errors that can occur while driving a session.
///
/// There is intentionally no `NotFound`/`InvalidToken`-style variant here:
/// authentication and reconnection are out of scope for this layer. The
/// only way a session dies is a transport-fatal condition — everything
/// else (missing room, stale send) is surfaced to the client as an
/// `OnCommandFailed`, never as a `Result::Err` here.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(String),
}
