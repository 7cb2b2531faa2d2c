//! Lobby admission for Parlor.
//!
//! The lobby owns the listening socket for a fixed admission window,
//! accepting connections and running the connect/rules handshake with
//! each one. Connections that fail the handshake are told why and
//! dropped; the lobby keeps going. When the window closes the roster
//! of admitted [`Player`]s is handed to the dealer, and the listener
//! is dropped with it.

mod error;
mod lobby;
mod player;

pub use error::LobbyError;
pub use lobby::{LobbyConfig, admit_players};
pub use player::{Player, hand_contains};
