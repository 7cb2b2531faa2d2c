//! Error types for the protocol layer.
//!
//! Every decode path fails closed: a header or payload that doesn't
//! account for every byte it claims produces one of these instead of
//! a partially-read value.

use crate::catalog::CatalogError;

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Fewer bytes than the fixed 8-byte frame header requires.
    #[error("frame header too short: {actual} of 8 bytes")]
    HeaderTooShort { actual: usize },

    /// The header declares a payload larger than we will ever accept.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u32, max: u32 },

    /// A structure inside the payload requires more bytes than remain.
    ///
    /// This covers both a payload shorter than the header's declared
    /// length and an embedded length prefix (name length, category
    /// count) that overruns the buffer.
    #[error("truncated payload: needed {needed} byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// The payload has bytes left over after the structure was fully
    /// read. Payloads are tightly packed; trailing garbage means the
    /// sender and receiver disagree about the layout.
    #[error("{0} trailing byte(s) after payload")]
    TrailingBytes(usize),

    /// A card ID, player ID, or count falls outside catalog bounds.
    #[error("{what} {value} out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        value: u32,
        limit: u32,
    },

    /// Per-category counts don't add up to the declared total.
    #[error("category counts sum to {sum}, frame declares {declared}")]
    CardCountMismatch { sum: u32, declared: u32 },

    /// A connect-frame name violates the name rules.
    #[error("invalid name: {0}")]
    InvalidName(&'static str),

    /// A decoded rules frame describes an invalid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
