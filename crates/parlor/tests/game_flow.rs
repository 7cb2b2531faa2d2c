//! End-to-end games over loopback sockets.
//!
//! Each test wires real clients to the lobby/deal/engine pipeline and
//! scripts their behavior, one task per client. The deal is seeded,
//! and a parallel run of the same dealing steps tells the test the
//! solution, the play order, and every hand, so scripts can play
//! perfectly or misbehave on cue.

use std::time::Duration;

use parlor_game::{
    Outcome, TurnEngine, build_deck, choose_solution, deal_round_robin, run_deal,
};
use parlor_lobby::{LobbyConfig, admit_players};
use parlor_protocol::{
    Catalog, CardId, CardSet, Connect, Frame, PlayerId, QueryResponse, ShownCard, WireLimits,
};
use parlor_transport::{FrameConnection, TcpTransport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::task::JoinHandle;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn catalog() -> Catalog {
    Catalog::new(vec![
        vec!["Rope".into(), "Pipe".into(), "Wrench".into(), "Candlestick".into()],
        vec![
            "Hall".into(),
            "Study".into(),
            "Lounge".into(),
            "Cellar".into(),
            "Ballroom".into(),
        ],
    ])
    .expect("valid catalog")
}

fn lobby_config() -> LobbyConfig {
    LobbyConfig {
        window: Duration::from_millis(600),
        handshake_timeout: Duration::from_millis(300),
        max_players: 128,
    }
}

/// Binds a listener, then runs lobby, seeded deal, and turn engine on
/// a task. Returns the address to join and the eventual outcome.
async fn spawn_server(
    catalog: Catalog,
    seed: u64,
    response_timeout: Duration,
) -> (String, JoinHandle<Outcome>) {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.expect("should bind");
    let addr = transport.local_addr().expect("should have addr").to_string();

    let handle = tokio::spawn(async move {
        let mut players = admit_players(&mut transport, &catalog, &lobby_config())
            .await
            .expect("lobby should run");
        assert!(!players.is_empty(), "tests always connect someone");
        let mut rng = StdRng::seed_from_u64(seed);
        let solution = run_deal(&catalog, &mut players, &mut rng)
            .await
            .expect("deal should complete");
        TurnEngine::new(&catalog, players, solution)
            .with_response_timeout(response_timeout)
            .run()
            .await
    });
    (addr, handle)
}

/// Re-runs the dealing steps with the same seed the server used.
/// Returns the solution, the play order (as admitted IDs), and each
/// play-order position's hand.
fn replicate_deal(
    catalog: &Catalog,
    admitted: &[PlayerId],
    seed: u64,
) -> (Vec<CardId>, Vec<PlayerId>, Vec<Vec<CardId>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let solution = choose_solution(catalog, &mut rng);
    let mut deck = build_deck(catalog, &solution);
    deck.shuffle(&mut rng);
    let mut order: Vec<PlayerId> = admitted.to_vec();
    order.shuffle(&mut rng);
    let hands = deal_round_robin(&deck, order.len());
    (solution, order, hands)
}

struct Client {
    conn: FrameConnection,
    id: PlayerId,
    limits: WireLimits,
    hand: Vec<CardId>,
}

impl Client {
    /// Connects, introduces itself, and absorbs the rules reply.
    async fn join(addr: &str, name: &[u8]) -> Self {
        let mut conn = FrameConnection::connect(addr).await.expect("should connect");
        let connect = Frame::Connect(Connect::new(name.to_vec()).expect("valid name"));
        conn.send_frame(&connect).await.expect("should send connect");

        let (header, payload) = conn.recv_frame(RECV_TIMEOUT).await.expect("should receive");
        let kind = header.kind().expect("known frame type");
        match Frame::decode(kind, &payload, WireLimits::NONE).expect("should decode") {
            Frame::Rules(rules) => Self {
                conn,
                id: rules.player,
                limits: rules.catalog.limits(),
                hand: Vec::new(),
            },
            other => panic!("expected rules, got {other:?}"),
        }
    }

    async fn recv(&mut self) -> Frame {
        let (header, payload) = self.conn.recv_frame(RECV_TIMEOUT).await.expect("should receive");
        let kind = header.kind().expect("known frame type");
        Frame::decode(kind, &payload, self.limits).expect("should decode")
    }

    async fn send(&mut self, frame: &Frame) {
        self.conn.send_frame(frame).await.expect("should send");
    }

    /// Reads until the start frame arrives and keeps the dealt hand.
    async fn await_start(&mut self) {
        loop {
            if let Frame::Start(start) = self.recv().await {
                self.hand = start.hand;
                return;
            }
        }
    }
}

/// Joins one client per name, in order, so admitted IDs are 0, 1, ...
/// by position.
async fn join_all(addr: &str, names: &[&[u8]]) -> Vec<Client> {
    let mut clients = Vec::with_capacity(names.len());
    for name in names {
        clients.push(Client::join(addr, name).await);
    }
    clients
}

#[tokio::test]
async fn test_correct_solve_wins_the_game() {
    let catalog = catalog();
    let seed = 11;
    let (addr, server) = spawn_server(catalog.clone(), seed, Duration::from_secs(2)).await;
    let (solution, order, _) = replicate_deal(&catalog, &[PlayerId(0), PlayerId(1)], seed);

    let clients = join_all(&addr, &[b"Alice", b"Bob"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            let solution = solution.clone();
            tokio::spawn(async move {
                client.await_start().await;
                loop {
                    match client.recv().await {
                        Frame::Turn(turn) if turn.player == client.id => {
                            client
                                .send(&Frame::SolveAttempt(CardSet {
                                    cards: solution.clone(),
                                }))
                                .await;
                        }
                        Frame::SolveResult(result) => return result,
                        _ => {}
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    assert_eq!(outcome, Outcome::Win { winner: order[0] });

    for task in tasks {
        let result = task.await.expect("client should finish");
        assert!(result.correct);
        assert_eq!(result.player, order[0]);
    }
}

#[tokio::test]
async fn test_wrong_solve_eliminates_and_play_continues() {
    let catalog = catalog();
    let seed = 23;
    let (addr, server) = spawn_server(catalog.clone(), seed, Duration::from_secs(2)).await;
    let (solution, order, _) = replicate_deal(&catalog, &[PlayerId(0), PlayerId(1)], seed);

    // A guess that decodes fine but names a wrong card in the first
    // category.
    let mut wrong = solution.clone();
    let span = catalog.category_span(0);
    wrong[0] = CardId(
        (span.start..span.end)
            .find(|&c| c != solution[0].0)
            .expect("category has more than one card"),
    );

    let first = order[0];
    let clients = join_all(&addr, &[b"Alice", b"Bob"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            let solution = solution.clone();
            let wrong = wrong.clone();
            tokio::spawn(async move {
                client.await_start().await;
                let mut verdicts = Vec::new();
                loop {
                    match client.recv().await {
                        Frame::Turn(turn) if turn.player == client.id => {
                            // The first player in play order guesses
                            // wrong; the survivor solves.
                            let guess = if client.id == first {
                                wrong.clone()
                            } else {
                                solution.clone()
                            };
                            client
                                .send(&Frame::SolveAttempt(CardSet { cards: guess }))
                                .await;
                        }
                        Frame::SolveResult(result) if result.correct => {
                            verdicts.push(result);
                            return verdicts;
                        }
                        Frame::SolveResult(result) => {
                            assert_eq!(result.player, first);
                            assert!(!result.correct);
                            verdicts.push(result);
                        }
                        _ => {}
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    assert_eq!(outcome, Outcome::Win { winner: order[1] });

    for task in tasks {
        let verdicts = task.await.expect("client should finish");
        // The failed attempt, then the winning one.
        assert_eq!(verdicts.len(), 2);
    }
}

#[tokio::test]
async fn test_unanswerable_suggestion_is_announced_to_everyone() {
    let catalog = catalog();
    let seed = 37;
    let (addr, server) = spawn_server(catalog.clone(), seed, Duration::from_secs(2)).await;
    let (solution, order, _) =
        replicate_deal(&catalog, &[PlayerId(0), PlayerId(1), PlayerId(2)], seed);

    // Suggesting the solution itself: no player holds those cards, so
    // every queried player passes.
    let first = order[0];
    let clients = join_all(&addr, &[b"Alice", b"Bob", b"Carol"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            let solution = solution.clone();
            tokio::spawn(async move {
                client.await_start().await;
                let mut no_shows = 0usize;
                loop {
                    match client.recv().await {
                        Frame::Turn(turn) if turn.player == client.id => {
                            let frame = if client.id == first {
                                Frame::TurnResponse(CardSet {
                                    cards: solution.clone(),
                                })
                            } else {
                                Frame::SolveAttempt(CardSet {
                                    cards: solution.clone(),
                                })
                            };
                            client.send(&frame).await;
                        }
                        Frame::QueryAnnouncement(ann) => {
                            assert_eq!(ann.card, ShownCard::NoCard);
                            no_shows += 1;
                        }
                        Frame::SolveResult(result) => {
                            assert!(result.correct);
                            return no_shows;
                        }
                        _ => {}
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    assert_eq!(outcome, Outcome::Win { winner: order[1] });

    for task in tasks {
        // Two queried players passed, and the announcement reached
        // every client.
        assert_eq!(task.await.expect("client should finish"), 2);
    }
}

#[tokio::test]
async fn test_shown_card_is_revealed_only_to_the_suggester() {
    let catalog = catalog();
    let seed = 41;
    let (addr, server) = spawn_server(catalog.clone(), seed, Duration::from_secs(2)).await;
    let (solution, order, hands) =
        replicate_deal(&catalog, &[PlayerId(0), PlayerId(1), PlayerId(2)], seed);

    // A suggestion where the only card the next player in rotation
    // holds is `held`, so the first query resolves it and the shown
    // card is predictable.
    let held = hands[1][0];
    let held_cat = catalog.category_of(held).expect("card is in the catalog");
    let other_cat = 1 - held_cat;
    let filler = catalog
        .category_span(other_cat)
        .map(CardId)
        .find(|c| !hands[1].contains(c))
        .expect("a hand cannot cover a whole category");
    let suggestion = vec![held, filler];

    let first = order[0];
    let responder = order[1];
    let clients = join_all(&addr, &[b"Alice", b"Bob", b"Carol"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            let solution = solution.clone();
            let suggestion = suggestion.clone();
            tokio::spawn(async move {
                client.await_start().await;
                let mut seen: Option<ShownCard> = None;
                loop {
                    match client.recv().await {
                        Frame::Turn(turn) if turn.player == client.id => {
                            let frame = if client.id == first {
                                Frame::TurnResponse(CardSet {
                                    cards: suggestion.clone(),
                                })
                            } else {
                                Frame::SolveAttempt(CardSet {
                                    cards: solution.clone(),
                                })
                            };
                            client.send(&frame).await;
                        }
                        Frame::Query(query) if query.player == client.id => {
                            if let Some(card) = query
                                .cards
                                .iter()
                                .copied()
                                .find(|c| client.hand.contains(c))
                            {
                                client
                                    .send(&Frame::QueryResponse(QueryResponse { card }))
                                    .await;
                            }
                        }
                        Frame::QueryAnnouncement(ann) => {
                            assert_eq!(ann.player, responder);
                            seen = Some(ann.card);
                        }
                        Frame::SolveResult(result) => {
                            assert!(result.correct);
                            return (client.id, seen);
                        }
                        _ => {}
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    assert_eq!(outcome, Outcome::Win { winner: order[1] });

    let mut seen_by_id = std::collections::HashMap::new();
    for task in tasks {
        let (id, seen) = task.await.expect("client should finish");
        seen_by_id.insert(id, seen);
    }
    assert_eq!(seen_by_id[&order[0]], Some(ShownCard::Shown(held)));
    assert_eq!(seen_by_id[&order[1]], None, "the responder hears nothing back");
    assert_eq!(seen_by_id[&order[2]], Some(ShownCard::Hidden));
}

#[tokio::test]
async fn test_responder_showing_unheld_card_aborts_for_everyone() {
    let catalog = catalog();
    let seed = 53;
    let (addr, server) = spawn_server(catalog.clone(), seed, Duration::from_secs(2)).await;
    let (_, _, hands) = replicate_deal(&catalog, &[PlayerId(0), PlayerId(1)], seed);

    // The other player holds this, so the first query obligates them.
    let responder_hand = hands[1].clone();
    let held = responder_hand[0];
    let held_cat = catalog.category_of(held).expect("card is in the catalog");
    let other_cat = 1 - held_cat;
    let suggestion = vec![held, CardId(catalog.category_span(other_cat).start)];

    // Any card the responder does not hold will do for the lie.
    let lie = (0..catalog.total_cards())
        .map(CardId)
        .find(|c| !responder_hand.contains(c))
        .expect("the responder does not hold the whole deck");

    let clients = join_all(&addr, &[b"Alice", b"Bob"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            let suggestion = suggestion.clone();
            tokio::spawn(async move {
                client.await_start().await;
                loop {
                    match client.recv().await {
                        Frame::Turn(turn) if turn.player == client.id => {
                            client
                                .send(&Frame::TurnResponse(CardSet {
                                    cards: suggestion.clone(),
                                }))
                                .await;
                        }
                        Frame::Query(query) if query.player == client.id => {
                            client
                                .send(&Frame::QueryResponse(QueryResponse { card: lie }))
                                .await;
                        }
                        Frame::Abort(notice) => return notice.text,
                        _ => {}
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    match outcome {
        Outcome::Aborted { reason } => assert!(!reason.is_empty()),
        other => panic!("expected an abort, got {other:?}"),
    }

    for task in tasks {
        let reason = task.await.expect("client should finish");
        assert!(!reason.is_empty());
    }
}

#[tokio::test]
async fn test_silent_active_player_aborts_the_game() {
    let catalog = catalog();
    let (addr, server) = spawn_server(catalog.clone(), 61, Duration::from_millis(300)).await;

    let clients = join_all(&addr, &[b"Alice", b"Bob"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            tokio::spawn(async move {
                client.await_start().await;
                // Never answer the turn announcement; just wait for
                // the server to call the game off.
                loop {
                    if let Frame::Abort(_) = client.recv().await {
                        return;
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    assert!(matches!(outcome, Outcome::Aborted { .. }));
    for task in tasks {
        task.await.expect("client should finish");
    }
}

#[tokio::test]
async fn test_unexpected_frame_forfeits_the_turn_only() {
    let catalog = catalog();
    let seed = 71;
    let (addr, server) = spawn_server(catalog.clone(), seed, Duration::from_secs(2)).await;
    let (solution, order, _) = replicate_deal(&catalog, &[PlayerId(0), PlayerId(1)], seed);

    let first = order[0];
    let clients = join_all(&addr, &[b"Alice", b"Bob"]).await;
    let tasks: Vec<JoinHandle<_>> = clients
        .into_iter()
        .map(|mut client| {
            let solution = solution.clone();
            tokio::spawn(async move {
                client.await_start().await;
                let mut got_error = false;
                loop {
                    match client.recv().await {
                        Frame::Turn(turn) if turn.player == client.id => {
                            let frame = if client.id == first {
                                // Nonsense instead of a suggestion or
                                // a solve attempt.
                                Frame::Connect(
                                    Connect::new(b"again".to_vec()).expect("valid name"),
                                )
                            } else {
                                Frame::SolveAttempt(CardSet {
                                    cards: solution.clone(),
                                })
                            };
                            client.send(&frame).await;
                        }
                        Frame::Error(_) => got_error = true,
                        Frame::SolveResult(result) => {
                            assert!(result.correct);
                            return (client.id, got_error);
                        }
                        _ => {}
                    }
                }
            })
        })
        .collect();

    let outcome = server.await.expect("server should finish");
    assert_eq!(outcome, Outcome::Win { winner: order[1] });

    for task in tasks {
        let (id, got_error) = task.await.expect("client should finish");
        assert_eq!(got_error, id == first, "only the offender is told off");
    }
}
