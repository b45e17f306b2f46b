//! Bounds-checked sequential reader over an in-memory buffer.

use byteorder::{ByteOrder, LittleEndian};

use super::error::ParseError;

/// Sequential little-endian reader over a borrowed byte buffer.
///
/// Every successful read advances the offset by exactly the decoded width.
/// A read that needs more bytes than remain fails with
/// [`ParseError::UnexpectedEndOfData`] and leaves the offset untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize) -> Result<(), ParseError> {
        if needed > self.remaining() {
            return Err(ParseError::UnexpectedEndOfData {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        self.take(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64, ParseError> {
        self.take(8).map(LittleEndian::read_u64)
    }

    /// Read a little-endian `i64`.
    pub fn read_i64(&mut self) -> Result<i64, ParseError> {
        self.take(8).map(LittleEndian::read_i64)
    }

    /// Read a little-endian IEEE-754 single and widen it to `f64`.
    pub fn read_f32(&mut self) -> Result<f64, ParseError> {
        self.take(4).map(|b| f64::from(LittleEndian::read_f32(b)))
    }

    /// Read a little-endian IEEE-754 double.
    pub fn read_f64(&mut self) -> Result<f64, ParseError> {
        self.take(8).map(LittleEndian::read_f64)
    }

    /// Borrow the next `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.take(n)
    }

    /// Advance past `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.take(n).map(|_| ())
    }

    /// Decode the next `u32` without advancing.
    pub fn peek_u32(&self) -> Result<u32, ParseError> {
        self.ensure(4)?;
        Ok(LittleEndian::read_u32(&self.buf[self.pos..self.pos + 4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance_by_width() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
        bytes.extend_from_slice(&2.5f64.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(b"abc");

        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.read_u32().unwrap(), 7);
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.read_u64().unwrap(), 1u64 << 40);
        assert_eq!(cursor.position(), 12);
        assert_eq!(cursor.read_f64().unwrap(), 2.5);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_bytes(3).unwrap(), b"abc");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let bytes = 0xDEAD_BEEFu32.to_le_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.peek_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u32().unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_short_read_is_end_of_data() {
        let bytes = [1u8, 2, 3];
        let mut cursor = ByteCursor::new(&bytes);
        cursor.skip(1).unwrap();

        match cursor.read_u32() {
            Err(ParseError::UnexpectedEndOfData {
                offset,
                needed,
                remaining,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected end of data, got {:?}", other),
        }
        // A failed read leaves the cursor where it was
        assert_eq!(cursor.position(), 1);
        assert!(cursor.peek_u32().is_err());
        assert!(cursor.skip(3).is_err());
        assert!(cursor.skip(2).is_ok());
    }
}
