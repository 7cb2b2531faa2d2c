//! Transport layer for Parlor.
//!
//! A thin abstraction over a TCP stream socket carrying whole frames:
//! [`TcpTransport`] accepts connections, [`FrameConnection`] sends
//! frames and performs blocking-with-timeout receives of exactly one
//! frame at a time. The transport knows frame boundaries (the fixed
//! header and its declared payload length) but nothing about payload
//! contents or game rules.

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{FrameConnection, TcpTransport};

use std::fmt;

/// Opaque identifier for a connection, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
