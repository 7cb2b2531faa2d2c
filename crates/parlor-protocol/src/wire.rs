//! Bounds-checked payload reader.
//!
//! Frame payloads are tightly packed with no alignment padding, and
//! several fields are deliberately sub-word-aligned (a one-byte length
//! prefix immediately followed by a byte run). Decoders therefore walk
//! payloads through this cursor, which tracks remaining bytes and
//! fails closed instead of over-reading.

use crate::error::ProtocolError;

/// A reading cursor over a payload buffer.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, ProtocolError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, ProtocolError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads exactly `n` raw bytes.
    pub(crate) fn bytes(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        self.take(n)
    }

    /// Asserts the payload was consumed exactly.
    pub(crate) fn finish(self) -> Result<(), ProtocolError> {
        if self.remaining() != 0 {
            return Err(ProtocolError::TrailingBytes(self.remaining()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reads_in_order() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, b'h', b'i'];
        let mut r = Reader::new(&buf);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.u16().unwrap(), 0x0203);
        assert_eq!(r.u32().unwrap(), 0x0405_0607);
        assert_eq!(r.bytes(2).unwrap(), b"hi");
        r.finish().unwrap();
    }

    #[test]
    fn test_reader_fails_closed_on_overread() {
        let mut r = Reader::new(&[0x01]);
        assert_eq!(
            r.u16(),
            Err(ProtocolError::Truncated { needed: 2, remaining: 1 })
        );
    }

    #[test]
    fn test_reader_rejects_trailing_bytes() {
        let mut r = Reader::new(&[1, 2, 3]);
        r.u8().unwrap();
        assert_eq!(r.finish(), Err(ProtocolError::TrailingBytes(2)));
    }

    #[test]
    fn test_reader_bytes_respects_declared_length() {
        // An embedded length prefix larger than the remaining buffer
        // must not be trusted.
        let buf = [200u8, b'a', b'b'];
        let mut r = Reader::new(&buf);
        let len = r.u8().unwrap() as usize;
        assert_eq!(
            r.bytes(len),
            Err(ProtocolError::Truncated { needed: 200, remaining: 2 })
        );
    }
}
