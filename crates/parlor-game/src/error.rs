//! Error types for dealing.

use parlor_protocol::PlayerId;
use parlor_transport::TransportError;

/// Errors raised while dealing. The turn loop itself never errors;
/// it resolves to an [`Outcome`](crate::Outcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A start frame could not be delivered to a player.
    #[error("could not reach player {player}: {source}")]
    Unreachable {
        player: PlayerId,
        #[source]
        source: TransportError,
    },
}
