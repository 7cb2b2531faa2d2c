//! The twelve frame payloads and their byte-exact codecs.
//!
//! Payloads are variable-length and tightly packed; every field width
//! is explicit (1, 2, or 4 bytes, big-endian) and decoding walks the
//! buffer through the bounds-checked [`Reader`] — never a structure
//! overlay, since several fields are deliberately sub-word-aligned.
//!
//! Decoding validates more than shape: card IDs are range-checked
//! against the catalog bounds in [`WireLimits`], embedded counts and
//! length prefixes are checked against the bytes actually available,
//! and a payload with leftover bytes is rejected.

use crate::catalog::{Catalog, MAX_NAME_LEN};
use crate::error::ProtocolError;
use crate::header::FrameHeader;
use crate::types::{CardId, FrameType, PlayerId, ShownCard, WireLimits};
use crate::wire::Reader;

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// Free-text diagnostic carried by error and abort frames.
///
/// Wire layout: text length (u32) | raw text bytes (not NUL-terminated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
}

impl Notice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The first frame a client sends: its display name.
///
/// Wire layout: name length (u8) | raw name bytes.
///
/// Names may contain arbitrary non-NUL bytes, at most
/// [`MAX_NAME_LEN`] of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    pub name: Vec<u8>,
}

impl Connect {
    /// Creates a connect payload, enforcing the name rules.
    pub fn new(name: impl Into<Vec<u8>>) -> Result<Self, ProtocolError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name })
    }

    /// The name as text, with invalid UTF-8 replaced, for logging.
    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

fn validate_name(name: &[u8]) -> Result<(), ProtocolError> {
    if name.len() > MAX_NAME_LEN {
        return Err(ProtocolError::InvalidName("longer than 127 bytes"));
    }
    if name.contains(&0) {
        return Err(ProtocolError::InvalidName("contains a NUL byte"));
    }
    Ok(())
}

/// The server's reply to a successful connect: the game's catalog,
/// personalized with the recipient's assigned player ID.
///
/// Wire layout: player ID (u8) | category count (u8) | total cards
/// (u16) | per-category card counts (u16 each) | per-card name table
/// (u8 length + raw bytes each, category-major, IDs by position).
///
/// The legacy format also carried a flattened card-ID array whose
/// position equaled its value; it carried no information and is
/// omitted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub player: PlayerId,
    pub catalog: Catalog,
}

/// One roster entry in a start frame, in (shuffled) play order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub player: PlayerId,
    pub hand_size: u16,
    pub name: Vec<u8>,
}

/// The game-start frame: the recipient's own hand plus the full
/// roster metadata, identical for every recipient except the hand.
///
/// Wire layout: hand size (u16) | player count (u8) | 1 reserved byte
/// | own hand (u16 card IDs) | player order (u8 IDs) | per-player hand
/// sizes (u16 each) | per-player name table (u8 length + raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Start {
    pub hand: Vec<CardId>,
    pub roster: Vec<RosterEntry>,
}

/// Announces whose turn it is. The named player must respond with a
/// suggestion or a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub player: PlayerId,
}

/// One card per category. The payload shape shared by suggestions
/// (turn responses) and solve attempts: exactly `category_count` card
/// IDs (u16 each), positionally assigned to categories by the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSet {
    pub cards: Vec<CardId>,
}

/// Asks a specific player whether they can refute the suggestion.
///
/// Wire layout: queried player ID (u8) | 1 reserved byte | suggested
/// cards (u16 each, one per category).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub player: PlayerId,
    pub cards: Vec<CardId>,
}

/// A queried player's choice of held card to show (u16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryResponse {
    pub card: CardId,
}

/// Broadcast after each query: who was asked and what this observer
/// may know about the outcome (see [`ShownCard`] for the sentinels).
///
/// Wire layout: responder ID (u8) | 1 reserved byte | card (u16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryAnnouncement {
    pub player: PlayerId,
    pub card: ShownCard,
}

/// Broadcast verdict on a solve attempt. Carries the guessed cards —
/// never the true solution.
///
/// Wire layout: player ID (u8) | correct flag (u8) | guessed cards
/// (u16 each, one per category).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub player: PlayerId,
    pub correct: bool,
    pub cards: Vec<CardId>,
}

// ---------------------------------------------------------------------------
// Frame envelope
// ---------------------------------------------------------------------------

/// A discriminated frame: one of the twelve typed payloads.
///
/// [`encode`](Self::encode) produces the full wire bytes (header +
/// payload); [`decode`](Self::decode) interprets a payload that has
/// already been read to its declared length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Error(Notice),
    Abort(Notice),
    Connect(Connect),
    Rules(Rules),
    Start(Start),
    Turn(Turn),
    TurnResponse(CardSet),
    Query(Query),
    QueryResponse(QueryResponse),
    QueryAnnouncement(QueryAnnouncement),
    SolveAttempt(CardSet),
    SolveResult(SolveResult),
}

impl Frame {
    /// The frame's type tag.
    pub fn kind(&self) -> FrameType {
        match self {
            Self::Error(_) => FrameType::Error,
            Self::Abort(_) => FrameType::Abort,
            Self::Connect(_) => FrameType::Connect,
            Self::Rules(_) => FrameType::Rules,
            Self::Start(_) => FrameType::Start,
            Self::Turn(_) => FrameType::Turn,
            Self::TurnResponse(_) => FrameType::TurnResponse,
            Self::Query(_) => FrameType::Query,
            Self::QueryResponse(_) => FrameType::QueryResponse,
            Self::QueryAnnouncement(_) => FrameType::QueryAnnouncement,
            Self::SolveAttempt(_) => FrameType::SolveAttempt,
            Self::SolveResult(_) => FrameType::SolveResult,
        }
    }

    /// Serializes header and payload into one buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.write_payload(&mut payload);

        let header = FrameHeader::new(self.kind(), payload.len() as u32);
        let mut bytes = Vec::with_capacity(FrameHeader::SIZE + payload.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }

    fn write_payload(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Error(n) | Self::Abort(n) => {
                put_u32(buf, n.text.len() as u32);
                buf.extend_from_slice(n.text.as_bytes());
            }
            Self::Connect(c) => {
                buf.push(c.name.len() as u8);
                buf.extend_from_slice(&c.name);
            }
            Self::Rules(r) => {
                let cat = &r.catalog;
                buf.push(r.player.0);
                buf.push(cat.category_count() as u8);
                put_u16(buf, cat.total_cards());
                for i in 0..cat.category_count() {
                    put_u16(buf, cat.category_len(i));
                }
                for name in cat.card_names() {
                    buf.push(name.len() as u8);
                    buf.extend_from_slice(name.as_bytes());
                }
            }
            Self::Start(s) => {
                put_u16(buf, s.hand.len() as u16);
                buf.push(s.roster.len() as u8);
                buf.push(0); // reserved
                for card in &s.hand {
                    put_u16(buf, card.0);
                }
                for entry in &s.roster {
                    buf.push(entry.player.0);
                }
                for entry in &s.roster {
                    put_u16(buf, entry.hand_size);
                }
                for entry in &s.roster {
                    buf.push(entry.name.len() as u8);
                    buf.extend_from_slice(&entry.name);
                }
            }
            Self::Turn(t) => {
                buf.push(t.player.0);
            }
            Self::TurnResponse(set) | Self::SolveAttempt(set) => {
                for card in &set.cards {
                    put_u16(buf, card.0);
                }
            }
            Self::Query(q) => {
                buf.push(q.player.0);
                buf.push(0); // reserved
                for card in &q.cards {
                    put_u16(buf, card.0);
                }
            }
            Self::QueryResponse(r) => {
                put_u16(buf, r.card.0);
            }
            Self::QueryAnnouncement(a) => {
                buf.push(a.player.0);
                buf.push(0); // reserved
                put_u16(buf, a.card.to_wire());
            }
            Self::SolveResult(r) => {
                buf.push(r.player.0);
                buf.push(u8::from(r.correct));
                for card in &r.cards {
                    put_u16(buf, card.0);
                }
            }
        }
    }

    /// Decodes a payload of the given type.
    ///
    /// `payload` must already be exactly the header's declared length
    /// (the transport reads it that way); `limits` supplies the
    /// catalog bounds to validate IDs and array counts against. Before
    /// a catalog is known, pass [`WireLimits::NONE`] — only the frames
    /// that precede the catalog (error, abort, connect, rules) decode
    /// without bounds.
    pub fn decode(
        kind: FrameType,
        payload: &[u8],
        limits: WireLimits,
    ) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(payload);
        let frame = match kind {
            FrameType::Error => Self::Error(decode_notice(&mut r)?),
            FrameType::Abort => Self::Abort(decode_notice(&mut r)?),
            FrameType::Connect => {
                let len = r.u8()? as usize;
                let name = r.bytes(len)?.to_vec();
                validate_name(&name)?;
                Self::Connect(Connect { name })
            }
            FrameType::Rules => Self::Rules(decode_rules(&mut r)?),
            FrameType::Start => Self::Start(decode_start(&mut r, limits)?),
            FrameType::Turn => Self::Turn(Turn { player: PlayerId(r.u8()?) }),
            FrameType::TurnResponse => {
                Self::TurnResponse(CardSet { cards: decode_cards(&mut r, limits)? })
            }
            FrameType::Query => {
                let player = PlayerId(r.u8()?);
                let _reserved = r.u8()?;
                Self::Query(Query { player, cards: decode_cards(&mut r, limits)? })
            }
            FrameType::QueryResponse => {
                let card = decode_card(&mut r, limits)?;
                Self::QueryResponse(QueryResponse { card })
            }
            FrameType::QueryAnnouncement => {
                let player = PlayerId(r.u8()?);
                let _reserved = r.u8()?;
                let card = ShownCard::from_wire(r.u16()?);
                if let ShownCard::Shown(id) = card {
                    check_card(id, limits)?;
                }
                Self::QueryAnnouncement(QueryAnnouncement { player, card })
            }
            FrameType::SolveAttempt => {
                Self::SolveAttempt(CardSet { cards: decode_cards(&mut r, limits)? })
            }
            FrameType::SolveResult => {
                let player = PlayerId(r.u8()?);
                let correct = r.u8()? != 0;
                let cards = decode_cards(&mut r, limits)?;
                Self::SolveResult(SolveResult { player, correct, cards })
            }
        };
        r.finish()?;
        Ok(frame)
    }
}

// ---------------------------------------------------------------------------
// Decode helpers
// ---------------------------------------------------------------------------

fn decode_notice(r: &mut Reader<'_>) -> Result<Notice, ProtocolError> {
    let len = r.u32()? as usize;
    let text = String::from_utf8_lossy(r.bytes(len)?).into_owned();
    Ok(Notice { text })
}

fn decode_rules(r: &mut Reader<'_>) -> Result<Rules, ProtocolError> {
    let player = PlayerId(r.u8()?);
    let category_count = r.u8()? as usize;
    let declared_total = r.u16()?;

    let mut counts = Vec::with_capacity(category_count);
    let mut sum: u32 = 0;
    for _ in 0..category_count {
        let count = r.u16()?;
        sum += u32::from(count);
        counts.push(count);
    }
    if sum != u32::from(declared_total) {
        return Err(ProtocolError::CardCountMismatch {
            sum,
            declared: u32::from(declared_total),
        });
    }

    let mut categories = Vec::with_capacity(category_count);
    for count in counts {
        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = r.u8()? as usize;
            let name = String::from_utf8_lossy(r.bytes(len)?).into_owned();
            names.push(name);
        }
        categories.push(names);
    }

    let catalog = Catalog::new(categories)?;
    Ok(Rules { player, catalog })
}

fn decode_start(
    r: &mut Reader<'_>,
    limits: WireLimits,
) -> Result<Start, ProtocolError> {
    let hand_size = r.u16()? as usize;
    let player_count = r.u8()? as usize;
    let _reserved = r.u8()?;

    let mut hand = Vec::with_capacity(hand_size.min(r.remaining() / 2));
    for _ in 0..hand_size {
        hand.push(decode_card(r, limits)?);
    }

    let mut order = Vec::with_capacity(player_count);
    for _ in 0..player_count {
        order.push(PlayerId(r.u8()?));
    }
    let mut sizes = Vec::with_capacity(player_count);
    for _ in 0..player_count {
        sizes.push(r.u16()?);
    }

    let mut roster = Vec::with_capacity(player_count);
    for i in 0..player_count {
        let len = r.u8()? as usize;
        let name = r.bytes(len)?.to_vec();
        roster.push(RosterEntry { player: order[i], hand_size: sizes[i], name });
    }

    Ok(Start { hand, roster })
}

/// Reads exactly one card ID per category and range-checks each
/// against the catalog's total. Positional per-category validation is
/// the turn engine's job; the codec only enforces catalog bounds.
fn decode_cards(
    r: &mut Reader<'_>,
    limits: WireLimits,
) -> Result<Vec<CardId>, ProtocolError> {
    let count = limits.categories as usize;
    let mut cards = Vec::with_capacity(count);
    for _ in 0..count {
        cards.push(decode_card(r, limits)?);
    }
    Ok(cards)
}

fn decode_card(
    r: &mut Reader<'_>,
    limits: WireLimits,
) -> Result<CardId, ProtocolError> {
    let card = CardId(r.u16()?);
    check_card(card, limits)?;
    Ok(card)
}

fn check_card(card: CardId, limits: WireLimits) -> Result<(), ProtocolError> {
    if card.0 >= limits.total_cards {
        return Err(ProtocolError::OutOfRange {
            what: "card ID",
            value: u32::from(card.0),
            limit: u32::from(limits.total_cards),
        });
    }
    Ok(())
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

// =========================================================================
// Tests
// =========================================================================
