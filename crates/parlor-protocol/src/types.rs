//! Identity types and frame type tags.

use std::fmt;

/// A player's identity for the duration of one game.
///
/// Assigned sequentially from 0 at connect time and stable until the
/// process exits. Newtype over `u8` — the wire carries player IDs in a
/// single byte and the lobby caps admission well below 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A card's identity: an index into the flattened, category-major
/// enumeration of all cards in the catalog.
///
/// IDs are dense, zero-based, and contiguous per category, so a
/// category is a span `[base, base + len)` of consecutive IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Frame type tags.
///
/// The legacy protocol assigned Connect and Abort the same tag (2),
/// disambiguated only by direction. Connect gets its own tag here so
/// every tag names exactly one frame shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Error = 1,
    Abort = 2,
    Rules = 3,
    Start = 4,
    Turn = 5,
    TurnResponse = 6,
    Query = 7,
    QueryResponse = 8,
    QueryAnnouncement = 9,
    SolveAttempt = 10,
    SolveResult = 11,
    Connect = 12,
}

impl FrameType {
    /// Converts a raw tag byte into a frame type, if it names one.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Error),
            2 => Some(Self::Abort),
            3 => Some(Self::Rules),
            4 => Some(Self::Start),
            5 => Some(Self::Turn),
            6 => Some(Self::TurnResponse),
            7 => Some(Self::Query),
            8 => Some(Self::QueryResponse),
            9 => Some(Self::QueryAnnouncement),
            10 => Some(Self::SolveAttempt),
            11 => Some(Self::SolveResult),
            12 => Some(Self::Connect),
            _ => None,
        }
    }

    /// Returns the raw tag byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What a query announcement tells one observer about a shown card.
///
/// The wire encodes this in a single `u16`:
/// - `0xFFFF` — nobody showed a card (a "pass" in the rotation)
/// - `0` — a card was shown, but this observer isn't allowed to see it
/// - anything else — the shown card's ID (suggester and responder only)
///
/// Card 0 is a real card, so a suggester receiving `0` cannot tell it
/// apart from the hidden sentinel. The legacy wire format has the same
/// ambiguity; it is preserved because the sentinel values are the only
/// signal non-participants get about suggestion outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShownCard {
    /// The queried player held none of the suggested cards.
    NoCard,
    /// A card was shown to the suggester, hidden from this observer.
    Hidden,
    /// The shown card itself.
    Shown(CardId),
}

impl ShownCard {
    /// Sentinel for "no card shown".
    pub const NO_CARD_WIRE: u16 = 0xFFFF;

    /// Sentinel for "shown but hidden from you".
    pub const HIDDEN_WIRE: u16 = 0;

    /// Decodes the wire value.
    pub fn from_wire(raw: u16) -> Self {
        match raw {
            Self::NO_CARD_WIRE => Self::NoCard,
            Self::HIDDEN_WIRE => Self::Hidden,
            id => Self::Shown(CardId(id)),
        }
    }

    /// Encodes to the wire value.
    pub fn to_wire(self) -> u16 {
        match self {
            Self::NoCard => Self::NO_CARD_WIRE,
            Self::Hidden => Self::HIDDEN_WIRE,
            Self::Shown(card) => card.0,
        }
    }
}

/// The catalog bounds a decoder validates IDs against.
///
/// Carried separately from the full [`Catalog`](crate::Catalog) so a
/// client can decode pre-catalog frames (rules, error, abort) before
/// it knows any bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLimits {
    /// Number of categories; the element count of every suggestion,
    /// solve attempt, and query card array.
    pub categories: u8,
    /// Total card count; the exclusive upper bound for card IDs.
    pub total_cards: u16,
}

impl WireLimits {
    /// No known bounds yet (before the rules frame has been seen).
    pub const NONE: Self = Self { categories: 0, total_cards: 0 };
}
