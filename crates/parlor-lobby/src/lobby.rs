//! The admission window: accept, handshake, roster.

use std::time::Duration;

use parlor_protocol::{Catalog, Frame, FrameType, Notice, PlayerId, Rules, WireLimits};
use parlor_transport::{FrameConnection, TcpTransport};
use tokio::time::{Instant, timeout};

use crate::{LobbyError, Player};

/// Timing and capacity knobs for the admission window.
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// How long the lobby stays open after the listener comes up.
    pub window: Duration,
    /// How long a freshly accepted connection gets to send its
    /// connect frame.
    pub handshake_timeout: Duration,
    /// Hard cap on the roster; admission stops early when reached.
    pub max_players: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(3),
            max_players: 128,
        }
    }
}

/// Runs the admission window to completion and returns the roster in
/// admission order, with player IDs assigned sequentially from zero.
///
/// A connection that fails its handshake is sent an error frame
/// (best-effort) and dropped; admission continues. Only a failure of
/// the listener itself ends the window with an error.
pub async fn admit_players(
    transport: &mut TcpTransport,
    catalog: &Catalog,
    config: &LobbyConfig,
) -> Result<Vec<Player>, LobbyError> {
    let deadline = Instant::now() + config.window;
    let mut players: Vec<Player> = Vec::new();
    tracing::info!(window = ?config.window, "lobby open");

    while players.len() < config.max_players {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let conn = match timeout(remaining, transport.accept()).await {
            Err(_) => break,
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(e.into()),
        };

        let id = PlayerId(players.len() as u8);
        match handshake(conn, id, catalog, config.handshake_timeout).await {
            Ok(player) => {
                tracing::info!(
                    player = %player.id,
                    name = %player.name_lossy(),
                    "player admitted"
                );
                players.push(player);
            }
            Err(reason) => {
                tracing::warn!(%reason, "handshake failed, connection dropped");
            }
        }
    }

    tracing::info!(players = players.len(), "lobby closed");
    Ok(players)
}

/// Connect/rules exchange with one freshly accepted connection. On
/// failure the peer is told why (best-effort) and the connection is
/// dropped on return.
async fn handshake(
    mut conn: FrameConnection,
    id: PlayerId,
    catalog: &Catalog,
    deadline: Duration,
) -> Result<Player, String> {
    let (header, payload) = match conn.recv_frame(deadline).await {
        Ok(frame) => frame,
        Err(e) => {
            let text = if e.is_timeout() {
                "timed out waiting for a connect frame"
            } else {
                "could not read a connect frame"
            };
            reject(&mut conn, text).await;
            return Err(format!("{text}: {e}"));
        }
    };

    if header.kind() != Some(FrameType::Connect) {
        let text = "expected a connect frame";
        reject(&mut conn, text).await;
        return Err(format!("{text}, got tag {}", header.raw_kind()));
    }

    let connect = match Frame::decode(FrameType::Connect, &payload, WireLimits::NONE) {
        Ok(Frame::Connect(connect)) => connect,
        Ok(_) => {
            // decode yields the variant for the tag it was handed
            let text = "bad connect frame".to_string();
            reject(&mut conn, &text).await;
            return Err(text);
        }
        Err(e) => {
            let text = format!("bad connect frame: {e}");
            reject(&mut conn, &text).await;
            return Err(text);
        }
    };

    let rules = Frame::Rules(Rules {
        player: id,
        catalog: catalog.clone(),
    });
    if let Err(e) = conn.send_frame(&rules).await {
        return Err(format!("could not send the rules: {e}"));
    }

    Ok(Player::new(id, connect.name, conn))
}

/// Best-effort rejection notice; the peer may already be gone.
async fn reject(conn: &mut FrameConnection, text: &str) {
    let _ = conn.send_frame(&Frame::Error(Notice::new(text))).await;
}
