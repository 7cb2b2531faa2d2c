//! Server binary: load settings, run one game, report how it ended.

use std::path::Path;
use std::process::ExitCode;

use parlor::GameSummary;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "settings.txt".to_string());
    let settings = match parlor::settings::load(Path::new(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(%path, error = %e, "could not load settings");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = parlor::run(settings) => match result {
            Ok(GameSummary::Won(winner)) => {
                tracing::info!(%winner, "game over");
                ExitCode::SUCCESS
            }
            Ok(GameSummary::NoPlayers) => ExitCode::SUCCESS,
            Ok(GameSummary::Aborted(reason)) => {
                tracing::warn!(%reason, "game aborted");
                ExitCode::FAILURE
            }
            Err(e) => {
                tracing::error!(error = %e, "server failed");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            ExitCode::SUCCESS
        }
    }
}
