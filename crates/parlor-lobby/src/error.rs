//! Error types for the lobby.

use parlor_transport::TransportError;

/// Errors that end the admission window early.
///
/// Per-connection handshake failures are not errors at this level:
/// the offending connection is notified and dropped, and admission
/// continues.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The listening socket itself failed.
    #[error("lobby listener failed: {0}")]
    Accept(#[from] TransportError),
}
