//! Top-level server errors.

use parlor_lobby::LobbyError;
use parlor_transport::TransportError;

use crate::settings::SettingsError;

/// Anything that stops the server before a game can resolve.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
