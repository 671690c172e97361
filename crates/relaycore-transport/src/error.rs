/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A `send` or `recv` was attempted on a connection this side has
    /// already [`close`](crate::Connection::close)d. Distinct from a
    /// clean peer-initiated disconnect, which `recv` reports as `Ok(None)`
    /// (the cancellation-on-disconnect signal the rest of the stack treats
    /// as authoritative shutdown) rather than as an error.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a message failed because the receiving half is gone.
    #[error("send failed: peer disconnected")]
    SendFailed,
}
