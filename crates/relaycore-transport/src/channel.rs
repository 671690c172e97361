//! In-process duplex substrate.
//!
//! The core presumes a streaming transport providing bidirectional message
//! streams with cancellation-on-disconnect; wire framing of that transport
//! is out of scope. This module provides the simplest thing that satisfies
//! the contract: a pair of `tokio::mpsc` channels, one per direction,
//! wrapped in the [`Connection`] trait so the rest of the stack never has
//! to know whether it's talking to an in-process peer or a real socket.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, Mutex};

use crate::{Connection, ConnectionId, TransportError};

/// One end of an in-process duplex message stream.
pub struct ChannelConnection<In, Out> {
    id: ConnectionId,
    tx: mpsc::Sender<Out>,
    rx: Mutex<mpsc::Receiver<In>>,
    closed: AtomicBool,
}

impl<In, Out> ChannelConnection<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Builds a connected pair: writes on one side arrive as reads on the
    /// other, and vice versa. `buffer` bounds each direction independently.
    pub fn pair(id_a: ConnectionId, id_b: ConnectionId, buffer: usize) -> (Self, ChannelConnection<Out, In>) {
        let (tx_a_to_b, rx_a_to_b) = mpsc::channel(buffer);
        let (tx_b_to_a, rx_b_to_a) = mpsc::channel(buffer);
        let a = ChannelConnection { id: id_a, tx: tx_a_to_b, rx: Mutex::new(rx_b_to_a), closed: AtomicBool::new(false) };
        let b = ChannelConnection { id: id_b, tx: tx_b_to_a, rx: Mutex::new(rx_a_to_b), closed: AtomicBool::new(false) };
        tracing::debug!(%id_a, %id_b, "in-process connection pair established");
        (a, b)
    }
}

impl<In, Out> Connection<In, Out> for ChannelConnection<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    type Error = TransportError;

    async fn send(&self, msg: Out) -> Result<(), Self::Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed(self.id.to_string()));
        }
        self.tx.send(msg).await.map_err(|_| TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<In>, Self::Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed(self.id.to_string()));
        }
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        // Dropping the sender would require ownership we don't have through
        // `&self`; closing the receiver is enough to make the peer's next
        // `send` observe disconnection. The `closed` flag additionally
        // makes further use of *this* side an explicit error instead of
        // silently racing the now-meaningless channel state.
        tracing::debug!(id = %self.id, "closing in-process connection");
        self.closed.store(true, Ordering::Release);
        self.rx.lock().await.close();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
