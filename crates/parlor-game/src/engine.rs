//! The authoritative turn loop.
//!
//! The engine owns the roster for the rest of the game and is the only
//! component talking to the players. Each iteration announces the next
//! active player's turn, awaits that player's suggestion or solve
//! attempt, and resolves it. Violations by the active player forfeit
//! the turn; violations by a player obligated to answer a query abort
//! the game, since play cannot continue without the answer.

use std::time::Duration;

use parlor_lobby::Player;
use parlor_protocol::{
    Catalog, CardId, Frame, FrameType, Notice, PlayerId, Query, QueryAnnouncement, ShownCard,
    SolveResult, Turn,
};

/// How long a player gets to answer a turn announcement or a query.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// How a game ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A player's solve attempt named the solution.
    Win { winner: PlayerId },
    /// Play could not continue; every player was told why.
    Aborted { reason: String },
}

/// Whether a solve attempt names the solution.
///
/// Judged as set membership: every solution card must appear
/// somewhere in the guess. Category order does not matter to the
/// check, but a guess that repeats one solution card while missing
/// another is wrong — coverage of the whole solution is what counts.
pub fn solve_is_correct(solution: &[CardId], guess: &[CardId]) -> bool {
    guess.len() == solution.len() && solution.iter().all(|card| guess.contains(card))
}

/// Checks that a suggestion names exactly one card from each category
/// and returns it sorted ascending, which is also category order since
/// category ID spans are ascending and disjoint.
pub fn validate_suggestion(catalog: &Catalog, cards: &[CardId]) -> Option<Vec<CardId>> {
    if cards.len() != catalog.category_count() {
        return None;
    }
    let mut sorted = cards.to_vec();
    sorted.sort_unstable();
    for (i, card) in sorted.iter().enumerate() {
        if !catalog.category_span(i).contains(&card.0) {
            return None;
        }
    }
    Some(sorted)
}

/// Tells every player the game is off. Best-effort; some peers may
/// already be gone.
pub async fn broadcast_abort(players: &mut [Player], reason: &str) {
    let frame = Frame::Abort(Notice::new(reason));
    for player in players {
        let _ = player.conn.send_frame(&frame).await;
    }
}

/// Runs turns until someone wins or play cannot continue.
pub struct TurnEngine<'a> {
    catalog: &'a Catalog,
    players: Vec<Player>,
    solution: Vec<CardId>,
    response_timeout: Duration,
}

impl<'a> TurnEngine<'a> {
    /// `players` must be in play order with dealt hands; `solution`
    /// holds one card per category in category order.
    pub fn new(catalog: &'a Catalog, players: Vec<Player>, solution: Vec<CardId>) -> Self {
        Self {
            catalog,
            players,
            solution,
            response_timeout: RESPONSE_TIMEOUT,
        }
    }

    /// Overrides the per-response deadline.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub async fn run(mut self) -> Outcome {
        let limits = self.catalog.limits();
        let n = self.players.len();
        let mut turn = 0usize;

        loop {
            if self.players.iter().all(|p| p.eliminated) {
                return self.abort("every player has been eliminated").await;
            }
            while self.players[turn].eliminated {
                turn = (turn + 1) % n;
            }

            let active = self.players[turn].id;
            tracing::info!(player = %active, "turn begins");
            self.broadcast(&Frame::Turn(Turn { player: active })).await;

            let received = self.players[turn].conn.recv_frame(self.response_timeout).await;
            let (header, payload) = match received {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(player = %active, error = %e, "active player unreachable");
                    return self.abort("lost contact with the active player").await;
                }
            };

            match header.kind() {
                Some(FrameType::SolveAttempt) => {
                    match Frame::decode(FrameType::SolveAttempt, &payload, limits) {
                        Ok(Frame::SolveAttempt(set)) => {
                            if let Some(outcome) = self.resolve_solve(turn, set.cards).await {
                                return outcome;
                            }
                        }
                        _ => self.forfeit(turn, "malformed solve attempt").await,
                    }
                }
                Some(FrameType::TurnResponse) => {
                    match Frame::decode(FrameType::TurnResponse, &payload, limits) {
                        Ok(Frame::TurnResponse(set)) => {
                            if let Some(outcome) = self.resolve_suggestion(turn, set.cards).await {
                                return outcome;
                            }
                        }
                        _ => self.forfeit(turn, "malformed suggestion").await,
                    }
                }
                _ => {
                    // The payload was already drained, so the stream
                    // stays usable next turn.
                    self.forfeit(turn, "expected a suggestion or a solve attempt").await;
                }
            }

            turn = (turn + 1) % n;
        }
    }

    /// Adjudicates a solve attempt. Returns the outcome if the game
    /// ends here.
    async fn resolve_solve(&mut self, turn: usize, guess: Vec<CardId>) -> Option<Outcome> {
        let player = self.players[turn].id;
        let correct = solve_is_correct(&self.solution, &guess);
        tracing::info!(player = %player, correct, "solve attempt");
        self.broadcast(&Frame::SolveResult(SolveResult {
            player,
            correct,
            cards: guess,
        }))
        .await;

        if correct {
            tracing::info!(winner = %player, "game won");
            Some(Outcome::Win { winner: player })
        } else {
            self.players[turn].eliminated = true;
            tracing::info!(player = %player, "eliminated");
            None
        }
    }

    /// Resolves a suggestion by querying the other players in turn
    /// order until one can show a card. Eliminated players still hold
    /// cards and still answer queries. Returns an outcome only when
    /// the game must abort.
    async fn resolve_suggestion(&mut self, turn: usize, cards: Vec<CardId>) -> Option<Outcome> {
        let suggester = self.players[turn].id;
        let Some(cards) = validate_suggestion(self.catalog, &cards) else {
            self.forfeit(turn, "a suggestion names one card from each category").await;
            return None;
        };
        tracing::info!(player = %suggester, "suggestion made");

        let n = self.players.len();
        let mut idx = (turn + 1) % n;
        while idx != turn {
            let queried = self.players[idx].id;
            self.broadcast(&Frame::Query(Query {
                player: queried,
                cards: cards.clone(),
            }))
            .await;

            if !cards.iter().any(|&c| self.players[idx].has_card(c)) {
                // Nothing to show; everyone learns that, including the
                // queried player and the suggester.
                self.broadcast(&Frame::QueryAnnouncement(QueryAnnouncement {
                    player: queried,
                    card: ShownCard::NoCard,
                }))
                .await;
                idx = (idx + 1) % n;
                continue;
            }

            let shown = match self.await_query_response(idx).await {
                Ok(card) => card,
                Err(reason) => return Some(self.abort(&reason).await),
            };
            if !self.players[idx].has_card(shown) {
                tracing::warn!(player = %queried, card = %shown, "showed a card not in hand");
                return Some(self.abort("a player showed a card it does not hold").await);
            }

            tracing::info!(player = %queried, "card shown");
            for i in 0..n {
                if i == idx {
                    continue;
                }
                let card = if i == turn {
                    ShownCard::Shown(shown)
                } else {
                    ShownCard::Hidden
                };
                let frame = Frame::QueryAnnouncement(QueryAnnouncement {
                    player: queried,
                    card,
                });
                let _ = self.players[i].conn.send_frame(&frame).await;
            }
            return None;
        }
        None
    }

    /// Awaits the obligated response to a query. Any failure here is
    /// fatal to the game.
    async fn await_query_response(&mut self, idx: usize) -> Result<CardId, String> {
        let queried = self.players[idx].id;
        let (header, payload) = self.players[idx]
            .conn
            .recv_frame(self.response_timeout)
            .await
            .map_err(|_| format!("player {queried} did not answer a query"))?;

        if header.kind() != Some(FrameType::QueryResponse) {
            return Err(format!("player {queried} answered a query with the wrong frame"));
        }
        match Frame::decode(FrameType::QueryResponse, &payload, self.catalog.limits()) {
            Ok(Frame::QueryResponse(resp)) => Ok(resp.card),
            _ => Err(format!("player {queried} sent a malformed query response")),
        }
    }

    async fn broadcast(&mut self, frame: &Frame) {
        for player in &mut self.players {
            let _ = player.conn.send_frame(frame).await;
        }
    }

    /// Tells the active player why its turn is forfeit. The turn then
    /// passes; the player stays in the game.
    async fn forfeit(&mut self, idx: usize, text: &str) {
        tracing::warn!(player = %self.players[idx].id, text, "turn forfeited");
        let frame = Frame::Error(Notice::new(text));
        let _ = self.players[idx].conn.send_frame(&frame).await;
    }

    async fn abort(&mut self, reason: &str) -> Outcome {
        tracing::warn!(reason, "game aborted");
        broadcast_abort(&mut self.players, reason).await;
        Outcome::Aborted {
            reason: reason.to_string(),
        }
    }
}
