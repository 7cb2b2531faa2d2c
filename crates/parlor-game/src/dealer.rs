//! Solution draw, deck shuffle, and the round-robin deal.

use parlor_lobby::Player;
use parlor_protocol::{Catalog, CardId, Frame, RosterEntry, Start};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::GameError;

/// Draws the hidden solution: one uniformly chosen card per category.
pub fn choose_solution<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Vec<CardId> {
    (0..catalog.category_count())
        .map(|i| {
            let span = catalog.category_span(i);
            CardId(rng.random_range(span.start..span.end))
        })
        .collect()
}

/// Every catalog card except the solution, in ID order.
pub fn build_deck(catalog: &Catalog, solution: &[CardId]) -> Vec<CardId> {
    (0..catalog.total_cards())
        .map(CardId)
        .filter(|card| !solution.contains(card))
        .collect()
}

/// Distributes the deck round-robin over `hands` hands, first card to
/// hand 0, and sorts each hand ascending. Hand sizes differ by at
/// most one, earlier hands getting the extras.
pub fn deal_round_robin(deck: &[CardId], hands: usize) -> Vec<Vec<CardId>> {
    assert!(hands > 0, "cannot deal to zero hands");
    let mut out = vec![Vec::with_capacity(deck.len() / hands + 1); hands];
    for (i, &card) in deck.iter().enumerate() {
        out[i % hands].push(card);
    }
    for hand in &mut out {
        hand.sort_unstable();
    }
    out
}

/// Runs the whole deal: draws the solution, shuffles the rest of the
/// deck and the seating order, fills each player's hand, and sends
/// every player its start frame. The roster order after this call is
/// the play order.
///
/// Returns the solution. A start frame that cannot be delivered is
/// fatal; the caller aborts the game.
pub async fn run_deal<R: Rng + ?Sized>(
    catalog: &Catalog,
    players: &mut [Player],
    rng: &mut R,
) -> Result<Vec<CardId>, GameError> {
    let solution = choose_solution(catalog, rng);
    let mut deck = build_deck(catalog, &solution);
    deck.shuffle(rng);
    players.shuffle(rng);

    let hands = deal_round_robin(&deck, players.len());
    for (player, hand) in players.iter_mut().zip(hands) {
        tracing::debug!(player = %player.id, cards = hand.len(), "hand dealt");
        player.hand = hand;
    }

    let roster: Vec<RosterEntry> = players
        .iter()
        .map(|p| RosterEntry {
            player: p.id,
            hand_size: p.hand.len() as u16,
            name: p.name.clone(),
        })
        .collect();

    for player in players.iter_mut() {
        let start = Frame::Start(Start {
            hand: player.hand.clone(),
            roster: roster.clone(),
        });
        player
            .conn
            .send_frame(&start)
            .await
            .map_err(|e| GameError::Unreachable {
                player: player.id,
                source: e,
            })?;
    }

    tracing::info!(players = players.len(), "cards dealt, game starting");
    Ok(solution)
}
