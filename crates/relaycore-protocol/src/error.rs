//! Error types for the protocol layer.

/// Errors that can occur while validating a protocol-level message.
///
/// This crate does no byte encoding of its own, so there is no
/// encode/decode variant here — only messages that are well-formed as
/// Rust values but violate a protocol-level rule (e.g. an empty room name
/// reaching a context that requires a resolved one).
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
