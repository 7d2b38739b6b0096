//! Connection endpoint
//!
//! The race layer never touches sockets. It talks to a participant through
//! an `Endpoint`: a client id plus the sending half of the channel that the
//! connection's writer task drains onto the WebSocket.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::Outbound;
use crate::types::ClientId;

/// Outbound queue depth per connection
pub const ENDPOINT_BUFFER_SIZE: usize = 32;

/// One participant's message channel
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Server → Client message channel
    sender: mpsc::Sender<Outbound>,
}

impl Endpoint {
    pub fn new(id: ClientId, sender: mpsc::Sender<Outbound>) -> Self {
        Self { id, sender }
    }

    /// Create an endpoint along with the receiver its writer drains
    pub fn channel(id: ClientId) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(ENDPOINT_BUFFER_SIZE);
        (Self::new(id, tx), rx)
    }

    /// Queue a text frame without waiting
    ///
    /// Fails if the writer has gone away (client disconnected) or the
    /// client has stopped draining its queue. The frame is dropped in
    /// both cases.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.sender
            .try_send(Outbound::Text(text.into()))
            .map_err(|e| match e {
                TrySendError::Full(_) => SendError::QueueFull,
                TrySendError::Closed(_) => SendError::ChannelClosed,
            })
    }

    /// Ask the writer to close the connection
    ///
    /// Best effort: a writer that is already gone has nothing left to close.
    pub fn close(&self) {
        let _ = self.sender.try_send(Outbound::Close);
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
