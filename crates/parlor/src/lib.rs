//! The Parlor server: one process, one game.
//!
//! The pipeline owns everything in sequence: the listener during the
//! lobby window, then the roster through the deal, then the turn
//! engine until the game resolves. Nothing is shared; each stage hands
//! its state to the next by value.

mod error;
pub mod settings;

pub use error::ParlorError;
pub use settings::{Settings, SettingsError};

use parlor_game::{GameError, Outcome, TurnEngine, broadcast_abort, run_deal};
use parlor_lobby::{LobbyConfig, admit_players};
use parlor_protocol::PlayerId;
use parlor_transport::TcpTransport;

/// How a server run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSummary {
    /// The lobby window closed with nobody admitted.
    NoPlayers,
    /// A player solved the game.
    Won(PlayerId),
    /// The game was called off; every player was told why.
    Aborted(String),
}

/// Runs one complete game with the default lobby timings.
pub async fn run(settings: Settings) -> Result<GameSummary, ParlorError> {
    run_with_lobby(settings, &LobbyConfig::default()).await
}

/// Runs one complete game: bind, lobby, deal, turns.
pub async fn run_with_lobby(
    settings: Settings,
    lobby: &LobbyConfig,
) -> Result<GameSummary, ParlorError> {
    let mut transport = TcpTransport::bind(&format!("0.0.0.0:{}", settings.port)).await?;
    tracing::info!(
        port = settings.port,
        categories = settings.catalog.category_count(),
        cards = settings.catalog.total_cards(),
        "server up"
    );

    let mut players = admit_players(&mut transport, &settings.catalog, lobby).await?;
    // The lobby is closed; stop listening so late joiners are refused
    // outright.
    drop(transport);

    if players.is_empty() {
        tracing::info!("nobody joined, shutting down");
        return Ok(GameSummary::NoPlayers);
    }

    let mut rng = rand::rng();
    let solution = match run_deal(&settings.catalog, &mut players, &mut rng).await {
        Ok(solution) => solution,
        Err(e) => {
            let GameError::Unreachable { player, .. } = &e;
            tracing::warn!(player = %player, error = %e, "deal failed");
            let reason = "a player became unreachable during the deal";
            broadcast_abort(&mut players, reason).await;
            return Ok(GameSummary::Aborted(reason.to_string()));
        }
    };

    let engine = TurnEngine::new(&settings.catalog, players, solution);
    match engine.run().await {
        Outcome::Win { winner } => Ok(GameSummary::Won(winner)),
        Outcome::Aborted { reason } => Ok(GameSummary::Aborted(reason)),
    }
}
