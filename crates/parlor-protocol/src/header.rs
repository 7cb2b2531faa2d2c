//! The fixed 8-byte frame header.
//!
//! Every message on the wire starts with this header, followed by
//! exactly `payload_len` payload bytes. Multi-byte fields are
//! big-endian — a fixed wire byte order rather than whatever the
//! sender's host happens to use.

use crate::error::ProtocolError;
use crate::types::FrameType;

/// Fixed frame header: type tag (1 byte), 3 reserved bytes, payload
/// length (4 bytes, big-endian).
///
/// The raw tag byte is kept even when it names no known frame type:
/// a receiver must be able to learn the declared payload length of a
/// frame it doesn't understand, so it can drain exactly that many
/// bytes and keep the stream in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    raw_kind: u8,
    payload_len: u32,
}

impl FrameHeader {
    /// Size of the serialized header.
    pub const SIZE: usize = 8;

    /// Maximum accepted payload length (4 MiB). A full-size catalog's
    /// rules frame stays well under this; anything larger is a broken
    /// or hostile peer, rejected before any allocation.
    pub const MAX_PAYLOAD_LEN: u32 = 4 * 1024 * 1024;

    /// Creates a header for a known frame type.
    pub fn new(kind: FrameType, payload_len: u32) -> Self {
        Self { raw_kind: kind.to_u8(), payload_len }
    }

    /// Parses a header from the first [`SIZE`](Self::SIZE) bytes.
    ///
    /// Accepts unknown type tags (see the type-level doc) but rejects
    /// short buffers and oversized payload declarations.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < Self::SIZE {
            return Err(ProtocolError::HeaderTooShort { actual: bytes.len() });
        }
        let payload_len =
            u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if payload_len > Self::MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_len,
                max: Self::MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self { raw_kind: bytes[0], payload_len })
    }

    /// Serializes the header. Reserved bytes are written as zero.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.raw_kind;
        bytes[4..8].copy_from_slice(&self.payload_len.to_be_bytes());
        bytes
    }

    /// The frame type, if the tag names one.
    pub fn kind(self) -> Option<FrameType> {
        FrameType::from_u8(self.raw_kind)
    }

    /// The raw type tag byte.
    pub fn raw_kind(self) -> u8 {
        self.raw_kind
    }

    /// Declared payload length in bytes.
    pub fn payload_len(self) -> u32 {
        self.payload_len
    }
}
