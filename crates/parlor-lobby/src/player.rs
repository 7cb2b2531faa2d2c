//! An admitted player: identity, connection, and (once dealt) hand.

use parlor_protocol::{CardId, PlayerId};
use parlor_transport::FrameConnection;

/// Membership test over a hand kept sorted ascending.
pub fn hand_contains(hand: &[CardId], card: CardId) -> bool {
    hand.binary_search(&card).is_ok()
}

/// One admitted player.
///
/// Owns its connection exclusively; whoever holds the `Player` is the
/// only component talking to that peer. The hand is empty until the
/// dealer fills it, and stays sorted ascending from then on.
pub struct Player {
    pub id: PlayerId,
    pub name: Vec<u8>,
    pub conn: FrameConnection,
    pub hand: Vec<CardId>,
    pub eliminated: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: Vec<u8>, conn: FrameConnection) -> Self {
        Self {
            id,
            name,
            conn,
            hand: Vec::new(),
            eliminated: false,
        }
    }

    /// Whether this player was dealt `card`.
    pub fn has_card(&self, card: CardId) -> bool {
        debug_assert!(self.hand.is_sorted());
        hand_contains(&self.hand, card)
    }

    /// The player's name as text, with invalid UTF-8 replaced, for
    /// logging.
    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_contains_matches_linear_scan() {
        let hand: Vec<CardId> = [2u16, 5, 9, 11, 30].iter().map(|&c| CardId(c)).collect();
        for raw in 0u16..40 {
            let card = CardId(raw);
            assert_eq!(
                hand_contains(&hand, card),
                hand.iter().any(|&c| c == card),
                "disagreement on card {raw}"
            );
        }
    }

    #[test]
    fn test_hand_contains_empty_hand() {
        assert!(!hand_contains(&[], CardId(0)));
    }
}
