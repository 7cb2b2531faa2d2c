//! Error types for the transport layer.

use std::time::Duration;

use parlor_protocol::ProtocolError;

/// Errors that can occur on the listener or a single connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting an incoming connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Connecting to a remote server failed (client side).
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Writing to the peer failed.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Reading from the peer failed.
    #[error("receive failed: {0}")]
    Recv(#[source] std::io::Error),

    /// The peer closed the connection mid-frame or before one.
    #[error("connection closed by peer")]
    Closed,

    /// No complete frame arrived within the receive deadline.
    #[error("receive timed out after {0:?}")]
    Timeout(Duration),

    /// The peer sent an invalid frame header.
    #[error(transparent)]
    Frame(#[from] ProtocolError),
}

impl TransportError {
    /// Whether this error is a receive timeout. Callers treat
    /// timeouts differently depending on protocol phase (recoverable
    /// during the lobby handshake, fatal mid-game).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
