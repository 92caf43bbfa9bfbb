//! The cursor over the data to be decoded.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use super::error::{DecodeError, ErrorKind, Pos};


//------------ Source --------------------------------------------------------

/// A cursor over an immutable buffer of encoded data.
///
/// The source keeps the full buffer around and moves a read position over
/// it. Payload slices are handed out as [`Bytes`] values sharing the
/// buffer's allocation, so decoding never copies content octets.
///
/// A limit caps how far reading may progress. Entering a definite length
/// value narrows the limit to the end of that value's content; leaving it
/// restores the previous limit. Reading past the limit is a truncation
/// error, not a panic.
///
/// The whole decoder backtracks through [`state`][Self::state] and
/// [`restore`][Self::restore]: a scan that does not pan out rewinds the
/// source to exactly where it started.
#[derive(Clone, Debug)]
pub struct Source {
    /// The underlying data.
    data: Bytes,

    /// The current read position.
    pos: usize,

    /// The position one past the last octet we may read.
    limit: usize,

    /// Offset added to positions reported in errors.
    ///
    /// Non-zero only for synthetic buffers built by the implicit-tag
    /// rewrite, so their errors still point into the caller's input.
    offset: usize,
}

/// The saved state of a source for later backtracking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourceState {
    pos: usize,
    limit: usize,
}

impl Source {
    /// Creates a source over the given data.
    pub fn new(data: Bytes) -> Self {
        let limit = data.len();
        Source { data, pos: 0, limit, offset: 0 }
    }

    /// Creates a source whose error positions start at `offset`.
    pub(crate) fn with_offset(data: Bytes, offset: usize) -> Self {
        let limit = data.len();
        Source { data, pos: 0, limit, offset }
    }

    /// Returns the position of the next octet to be read.
    pub fn pos(&self) -> Pos {
        Pos::from(self.pos + self.offset)
    }

    /// Returns the number of octets left before the current limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// Returns whether the source is exhausted up to the current limit.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.limit
    }

    /// Saves the current state for a later [`restore`][Self::restore].
    pub(crate) fn state(&self) -> SourceState {
        SourceState { pos: self.pos, limit: self.limit }
    }

    /// Rewinds the source to a previously saved state.
    pub(crate) fn restore(&mut self, state: SourceState) {
        self.pos = state.pos;
        self.limit = state.limit;
    }

    /// Takes a single octet from the source.
    pub(crate) fn take_u8(&mut self) -> Result<u8, DecodeError> {
        if self.pos >= self.limit {
            return Err(self.truncated())
        }
        let res = self.data[self.pos];
        self.pos += 1;
        Ok(res)
    }

    /// Peeks at the next octet without advancing.
    pub(crate) fn peek_u8(&self) -> Option<u8> {
        if self.pos >= self.limit {
            None
        }
        else {
            Some(self.data[self.pos])
        }
    }

    /// Takes the next `len` octets as a shared slice of the buffer.
    pub(crate) fn take_bytes(
        &mut self, len: usize,
    ) -> Result<Bytes, DecodeError> {
        if len > self.remaining() {
            return Err(self.truncated())
        }
        let res = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(res)
    }

    /// Narrows the limit to the next `len` octets.
    ///
    /// Returns the old limit which needs to be handed back to
    /// [`unlimit`][Self::unlimit] when the caller is done with the region.
    /// Fails if fewer than `len` octets remain, since a definite length
    /// promising more data than the input has is a truncation.
    pub(crate) fn limit_to(
        &mut self, len: usize,
    ) -> Result<usize, DecodeError> {
        if len > self.remaining() {
            return Err(self.truncated())
        }
        let old = self.limit;
        self.limit = self.pos + len;
        Ok(old)
    }

    /// Restores a limit previously returned by [`limit_to`][Self::limit_to].
    pub(crate) fn unlimit(&mut self, limit: usize) {
        debug_assert!(limit >= self.limit);
        self.limit = limit;
    }

    /// Skips ahead over `len` octets.
    pub(crate) fn advance(&mut self, len: usize) -> Result<(), DecodeError> {
        if len > self.remaining() {
            return Err(self.truncated())
        }
        self.pos += len;
        Ok(())
    }

    /// Returns the slice of the buffer between `start` and the position.
    ///
    /// The `start` state must have been taken from this source earlier.
    pub(crate) fn bytes_since(&self, start: SourceState) -> Bytes {
        self.data.slice(start.pos..self.pos)
    }

    /// Creates a truncation error at the current position.
    pub(crate) fn truncated(&self) -> DecodeError {
        DecodeError::new(ErrorKind::Truncated, self.pos())
    }

    /// Creates a malformed-encoding error at the current position.
    pub(crate) fn malformed(&self, msg: &'static str) -> DecodeError {
        DecodeError::new(ErrorKind::Malformed(msg), self.pos())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn source(data: &[u8]) -> Source {
        Source::new(Bytes::copy_from_slice(data))
    }

    #[test]
    fn take_and_peek() {
        let mut src = source(b"\x01\x02\x03");
        assert_eq!(src.peek_u8(), Some(1));
        assert_eq!(src.take_u8().unwrap(), 1);
        assert_eq!(src.take_bytes(2).unwrap().as_ref(), b"\x02\x03");
        assert_eq!(src.peek_u8(), None);
        assert!(src.is_exhausted());
        assert!(matches!(
            src.take_u8().unwrap_err().kind(), ErrorKind::Truncated
        ));
    }

    #[test]
    fn limits() {
        let mut src = source(b"\x01\x02\x03\x04");
        let old = src.limit_to(2).unwrap();
        assert_eq!(src.remaining(), 2);
        assert!(src.take_bytes(3).is_err());
        src.take_u8().unwrap();
        src.take_u8().unwrap();
        assert!(src.is_exhausted());
        src.unlimit(old);
        assert_eq!(src.remaining(), 2);
        assert!(src.limit_to(3).is_err());
    }

    #[test]
    fn rewind() {
        let mut src = source(b"\x01\x02\x03");
        let state = src.state();
        src.take_u8().unwrap();
        src.take_u8().unwrap();
        src.restore(state);
        assert_eq!(src.take_u8().unwrap(), 1);
    }

    #[test]
    fn bytes_since() {
        let mut src = source(b"\x01\x02\x03");
        src.take_u8().unwrap();
        let state = src.state();
        src.take_u8().unwrap();
        src.take_u8().unwrap();
        assert_eq!(src.bytes_since(state).as_ref(), b"\x02\x03");
    }

    #[test]
    fn offset_positions() {
        let mut src = Source::with_offset(
            Bytes::copy_from_slice(b"\x01"), 40
        );
        src.take_u8().unwrap();
        assert_eq!(src.take_u8().unwrap_err().pos(), 41.into());
    }
}
