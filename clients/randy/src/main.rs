//! Randy, a Parlor client that mostly plays at random.
//!
//! Randy remembers its own hand and every card it has been shown.
//! Suggestions name a random unseen card per category; once only one
//! card per category remains unseen, Randy goes for the solve.

use std::collections::HashSet;
use std::process::ExitCode;

use parlor_protocol::{
    Catalog, CardId, CardSet, Connect, Frame, QueryResponse, ShownCard, WireLimits,
};
use parlor_transport::{FrameConnection, TransportError};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing_subscriber::EnvFilter;

/// Server turns are on a short clock; client reads are generous.
const RECV_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:3615".to_string());
    let name = args.next().unwrap_or_else(|| "Randy".to_string());

    match play(&addr, &name).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "connection lost");
            ExitCode::FAILURE
        }
    }
}

struct Randy {
    conn: FrameConnection,
    me: parlor_protocol::PlayerId,
    catalog: Catalog,
    limits: WireLimits,
    hand: Vec<CardId>,
    /// Cards known not to be in the solution.
    seen: HashSet<CardId>,
}

async fn play(addr: &str, name: &str) -> Result<ExitCode, TransportError> {
    let mut conn = FrameConnection::connect(addr).await?;
    conn.send_frame(&Frame::Connect(
        Connect::new(name.as_bytes().to_vec()).map_err(TransportError::Frame)?,
    ))
    .await?;

    let (header, payload) = conn.recv_frame(RECV_TIMEOUT).await?;
    let (me, catalog) = match header.kind() {
        Some(kind) => match Frame::decode(kind, &payload, WireLimits::NONE) {
            Ok(Frame::Rules(rules)) => (rules.player, rules.catalog),
            Ok(Frame::Error(notice)) => {
                tracing::error!(reason = %notice.text, "server refused us");
                return Ok(ExitCode::FAILURE);
            }
            Ok(other) => {
                tracing::error!(?other, "expected the rules");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(TransportError::Frame(e)),
        },
        None => {
            tracing::error!(tag = header.raw_kind(), "unknown frame before the rules");
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::info!(player = %me, cards = catalog.total_cards(), "joined");

    let limits = catalog.limits();
    let mut randy = Randy {
        conn,
        me,
        catalog,
        limits,
        hand: Vec::new(),
        seen: HashSet::new(),
    };
    randy.run().await
}

impl Randy {
    async fn run(&mut self) -> Result<ExitCode, TransportError> {
        loop {
            let (header, payload) = self.conn.recv_frame(RECV_TIMEOUT).await?;
            let Some(kind) = header.kind() else {
                tracing::warn!(tag = header.raw_kind(), "ignoring unknown frame");
                continue;
            };
            let frame = Frame::decode(kind, &payload, self.limits)
                .map_err(TransportError::Frame)?;

            match frame {
                Frame::Start(start) => {
                    self.hand = start.hand;
                    self.seen.extend(self.hand.iter().copied());
                    tracing::info!(
                        cards = self.hand.len(),
                        players = start.roster.len(),
                        "game started"
                    );
                }
                Frame::Turn(turn) if turn.player == self.me => {
                    self.take_turn().await?;
                }
                Frame::Query(query) if query.player == self.me => {
                    self.answer_query(&query.cards).await?;
                }
                Frame::QueryAnnouncement(ann) => {
                    if let ShownCard::Shown(card) = ann.card {
                        self.seen.insert(card);
                    }
                }
                Frame::SolveResult(result) => {
                    if result.correct {
                        let won = result.player == self.me;
                        tracing::info!(winner = %result.player, won, "game over");
                        return Ok(ExitCode::SUCCESS);
                    }
                    if result.player == self.me {
                        tracing::info!("eliminated, playing on to answer queries");
                    }
                }
                Frame::Abort(notice) => {
                    tracing::warn!(reason = %notice.text, "game aborted");
                    return Ok(ExitCode::SUCCESS);
                }
                Frame::Error(notice) => {
                    tracing::error!(reason = %notice.text, "server complaint");
                    return Ok(ExitCode::FAILURE);
                }
                _ => {}
            }
        }
    }

    /// Unseen cards of one category.
    fn unseen(&self, cat: usize) -> Vec<CardId> {
        self.catalog
            .category_span(cat)
            .map(CardId)
            .filter(|c| !self.seen.contains(c))
            .collect()
    }

    async fn take_turn(&mut self) -> Result<(), TransportError> {
        let mut rng = rand::rng();
        let mut cards = Vec::with_capacity(self.catalog.category_count());
        let mut certain = true;
        for cat in 0..self.catalog.category_count() {
            let unseen = self.unseen(cat);
            match unseen.choose(&mut rng) {
                Some(&card) => {
                    certain &= unseen.len() == 1;
                    cards.push(card);
                }
                None => {
                    // Everything seen somewhere; someone is lying, or
                    // we miscounted. Suggest at random and move on.
                    certain = false;
                    let span = self.catalog.category_span(cat);
                    cards.push(CardId(rng.random_range(span.start..span.end)));
                }
            }
        }

        let frame = if certain {
            tracing::info!(?cards, "attempting to solve");
            Frame::SolveAttempt(CardSet { cards })
        } else {
            tracing::debug!(?cards, "suggesting");
            Frame::TurnResponse(CardSet { cards })
        };
        self.conn.send_frame(&frame).await
    }

    /// Responds only when obligated, with a random held card from the
    /// suggestion.
    async fn answer_query(&mut self, suggested: &[CardId]) -> Result<(), TransportError> {
        let held: Vec<CardId> = suggested
            .iter()
            .copied()
            .filter(|c| self.hand.binary_search(c).is_ok())
            .collect();
        let Some(&card) = held.choose(&mut rand::rng()) else {
            // Nothing to show; the server announces that for us.
            return Ok(());
        };
        tracing::debug!(%card, "showing a card");
        self.conn
            .send_frame(&Frame::QueryResponse(QueryResponse { card }))
            .await
    }
}
