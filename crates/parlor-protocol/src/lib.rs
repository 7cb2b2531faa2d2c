//! Wire protocol for Parlor.
//!
//! This crate defines the "language" that the game server and its
//! clients speak:
//!
//! - **Frames** ([`Frame`], [`FrameHeader`], [`FrameType`]) — the
//!   twelve typed messages and their byte-exact binary codecs.
//! - **Catalog** ([`Catalog`]) — the immutable category/card structure
//!   every card ID is an index into.
//! - **Identity** ([`PlayerId`], [`CardId`], [`ShownCard`]) — the
//!   small values that travel inside payloads.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while
//!   encoding or decoding.
//!
//! # Wire format
//!
//! Every message is a fixed 8-byte header (type tag, 3 reserved
//! bytes, big-endian u32 payload length) followed by exactly that many
//! payload bytes. Payloads are variable-length and tightly packed;
//! decoding is cursor-based and fails closed on truncated or
//! out-of-range input. The protocol layer knows nothing about sockets
//! or game rules — it only turns frames into bytes and back.

mod catalog;
mod error;
mod frames;
mod header;
mod types;
mod wire;

pub use catalog::{Catalog, CatalogError, MAX_NAME_LEN, MAX_TOTAL_CARDS};
pub use error::ProtocolError;
pub use frames::{
    CardSet, Connect, Frame, Notice, Query, QueryAnnouncement, QueryResponse,
    RosterEntry, Rules, SolveResult, Start, Turn,
};
pub use header::FrameHeader;
pub use types::{CardId, FrameType, PlayerId, ShownCard, WireLimits};
