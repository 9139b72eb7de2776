//! Canonical byte layout writer and reader.
//!
//! Every transaction shares one layout:
//!
//! ```text
//! size u32 | signature 64 | signer 32 | version u32 | type u16 |
//! max_fee u64 | deadline u64 | payload...
//! ```
//!
//! Integers are little-endian. A u64 is written as its two 32-bit words,
//! low first, which is the same bytes as a little-endian u64. The buffer is
//! built front to back; counts are written before the records they cover.

use bytes::{Buf, BufMut, BytesMut};

use super::TransactionError;
use crate::config::{HASH_SIZE, KEY_SIZE, SIGNATURE_SIZE};
use crate::uint64::Uint64Dto;

/// Narrows a list length to its u16 wire count, failing instead of wrapping.
pub fn wire_count(field: &str, count: usize) -> Result<u16, TransactionError> {
    u16::try_from(count).map_err(|_| TransactionError::Validation {
        reason: format!("{field} has {count} entries, at most {} fit", u16::MAX),
    })
}

/// Append-only writer for one transaction.
pub struct TransactionWriter {
    buf: BytesMut,
}

impl TransactionWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Writes a u64 as its `[low, high]` word pair.
    pub fn put_u64(&mut self, value: u64) {
        let words = Uint64Dto::from(value);
        self.buf.put_u32_le(words.low());
        self.buf.put_u32_le(words.high());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Writes a record count. Counts are u16 on the wire.
    pub fn put_count(&mut self, field: &'static str, count: usize) -> Result<(), TransactionError> {
        self.put_u16(wire_count(field, count)?);
        Ok(())
    }

    /// Finishes the buffer, checking it against the size the transaction
    /// announced in its size slot.
    pub fn finish(self, expected: usize) -> Result<Vec<u8>, TransactionError> {
        let actual = self.buf.len();
        debug_assert_eq!(actual, expected, "announced size disagrees with encoded length");
        if actual != expected {
            return Err(TransactionError::SizeMismatch { expected, actual });
        }
        Ok(self.buf.to_vec())
    }
}

/// Forward cursor over an encoded transaction.
///
/// Every read checks the remaining length first, so a short buffer surfaces
/// as [`TransactionError::Truncated`] instead of a panic.
pub struct TransactionReader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> TransactionReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, needed: usize) -> Result<(), TransactionError> {
        if self.buf.remaining() < needed {
            return Err(TransactionError::Truncated {
                offset: self.consumed,
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn get_u8(&mut self) -> Result<u8, TransactionError> {
        self.need(1)?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    pub fn get_u16(&mut self) -> Result<u16, TransactionError> {
        self.need(2)?;
        self.consumed += 2;
        Ok(self.buf.get_u16_le())
    }

    pub fn get_u32(&mut self) -> Result<u32, TransactionError> {
        self.need(4)?;
        self.consumed += 4;
        Ok(self.buf.get_u32_le())
    }

    /// Reads a u32 without consuming it.
    pub fn peek_u32(&self) -> Result<u32, TransactionError> {
        self.need(4)?;
        let mut head = &self.buf[..4];
        Ok(head.get_u32_le())
    }

    pub fn get_u64(&mut self) -> Result<u64, TransactionError> {
        let low = self.get_u32()?;
        let high = self.get_u32()?;
        Ok(Uint64Dto::new(low, high).to_u64())
    }

    pub fn get_array<const N: usize>(&mut self) -> Result<[u8; N], TransactionError> {
        self.need(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        self.consumed += N;
        Ok(out)
    }

    pub fn get_key(&mut self) -> Result<[u8; KEY_SIZE], TransactionError> {
        self.get_array::<KEY_SIZE>()
    }

    pub fn get_hash(&mut self) -> Result<[u8; HASH_SIZE], TransactionError> {
        self.get_array::<HASH_SIZE>()
    }

    pub fn get_signature(&mut self) -> Result<[u8; SIGNATURE_SIZE], TransactionError> {
        self.get_array::<SIGNATURE_SIZE>()
    }

    /// Splits off the next `len` bytes as an independent reader.
    pub fn split(&mut self, len: usize) -> Result<TransactionReader<'a>, TransactionError> {
        self.need(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        let offset = self.consumed;
        self.consumed += len;
        Ok(TransactionReader {
            buf: head,
            consumed: offset,
        })
    }

    /// Fails unless every byte has been consumed.
    pub fn expect_end(&self) -> Result<(), TransactionError> {
        if self.buf.has_remaining() {
            return Err(TransactionError::TrailingBytes {
                offset: self.consumed,
                count: self.buf.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u64_written_as_word_pair() {
        let mut w = TransactionWriter::with_capacity(8);
        w.put_u64(0x0000_0002_0000_0001);
        let bytes = w.finish(8).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn reader_reports_truncation_offset() {
        let data = [1u8, 0, 0, 0, 9];
        let mut r = TransactionReader::new(&data);
        assert_eq!(r.get_u32().unwrap(), 1);
        match r.get_u16() {
            Err(TransactionError::Truncated {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn split_tracks_absolute_offset() {
        let data = [0u8; 10];
        let mut r = TransactionReader::new(&data);
        r.get_u32().unwrap();
        let mut inner = r.split(4).unwrap();
        assert_eq!(inner.position(), 4);
        inner.get_u32().unwrap();
        assert!(inner.expect_end().is_ok());
        assert_eq!(r.remaining(), 2);
        assert!(r.expect_end().is_err());
    }

    #[test]
    fn count_over_u16_rejected() {
        let mut w = TransactionWriter::with_capacity(2);
        assert!(w.put_count("files", 70_000).is_err());
        assert!(w.put_count("files", 3).is_ok());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "announced size"))]
    fn finish_detects_size_mismatch() {
        let mut w = TransactionWriter::with_capacity(4);
        w.put_u16(7);
        assert!(matches!(
            w.finish(4),
            Err(TransactionError::SizeMismatch { expected: 4, actual: 2 })
        ));
    }
}
