//! MSB-first bit packing.
//!
//! Bit `i` of a stream lives in byte `i / 8` at position `7 - i % 8`. The
//! final byte is zero-padded; the writer reports how many bits are
//! significant so readers never mistake padding for data.

use crate::code_table::Code;
use crate::error::{HuffmanError, Result};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BitWriter {
    bits: Vec<u8>,
    bit_count: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bits: Vec::new(),
            bit_count: 0,
        }
    }

    pub fn with_capacity(bit_capacity: usize) -> Self {
        BitWriter {
            bits: Vec::with_capacity(bit_capacity.div_ceil(8)),
            bit_count: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn push_bit(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8;
        let bit_offset = self.bit_count % 8;

        if byte_index >= self.bits.len() {
            self.bits.push(0);
        }

        if bit {
            self.bits[byte_index] |= 1 << (7 - bit_offset);
        }

        self.bit_count += 1;
    }

    /// Writes the low `width` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 64);
        for bit_pos in (0..width).rev() {
            self.push_bit((value >> bit_pos) & 1 == 1);
        }
    }

    pub fn push_code(&mut self, code: &Code) {
        for &bit in code.bits() {
            self.push_bit(bit);
        }
    }

    /// Packed bytes and the number of significant bits in them.
    pub fn into_parts(self) -> (Vec<u8>, usize) {
        (self.bits, self.bit_count)
    }
}

/// Bounded bit stream over packed bytes.
///
/// Yields exactly `bit_count` bits and then stops, regardless of padding.
/// To restart, build a new reader over the same slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_count: usize,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8], bit_count: usize) -> Result<Self> {
        let available = bytes.len().saturating_mul(8);
        if bit_count > available {
            return Err(HuffmanError::corrupt(format!(
                "declared {bit_count} bits but only {available} are present"
            )));
        }
        Ok(BitReader {
            bytes,
            bit_count,
            position: 0,
        })
    }

    /// Reader over every bit of `bytes`, padding included.
    pub fn whole(bytes: &'a [u8]) -> Self {
        BitReader {
            bytes,
            bit_count: bytes.len() * 8,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bit_count - self.position
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        if self.position >= self.bit_count {
            return None;
        }
        let byte = self.bytes[self.position / 8];
        let bit = (byte >> (7 - self.position % 8)) & 1 == 1;
        self.position += 1;
        Some(bit)
    }

    /// Reads `width` bits as an MSB-first integer, or `None` if the stream
    /// ends first.
    pub fn read_bits(&mut self, width: usize) -> Option<u64> {
        debug_assert!(width <= 64);
        if self.remaining() < width {
            return None;
        }
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Some(value)
    }
}

impl Iterator for BitReader<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        self.read_bit()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for BitReader<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_packing() {
        let mut writer = BitWriter::new();
        for bit in [true, false, true, true] {
            writer.push_bit(bit);
        }
        assert_eq!(writer.bit_count(), 4);
        assert_eq!(writer.as_bytes(), &[0b1011_0000]);
    }

    #[test]
    fn test_push_bits_spans_bytes() {
        let mut writer = BitWriter::new();
        writer.push_bits(0b101, 3);
        writer.push_bits(0xff, 8);
        writer.push_bits(0, 2);
        let (bytes, bit_count) = writer.into_parts();
        assert_eq!(bit_count, 13);
        assert_eq!(bytes, vec![0b1011_1111, 0b1110_0000]);
    }

    #[test]
    fn test_reader_stops_at_declared_count() {
        let bytes = [0b1011_0000];
        let bits: Vec<bool> = BitReader::new(&bytes, 4).unwrap().collect();
        assert_eq!(bits, vec![true, false, true, true]);
    }

    #[test]
    fn test_reader_rejects_overlong_count() {
        let err = BitReader::new(&[0u8; 2], 17).unwrap_err();
        assert!(err.is_corrupt());
        assert!(BitReader::new(&[0u8; 2], 16).is_ok());
    }

    #[test]
    fn test_read_bits_and_exhaustion() {
        let bytes = [0b0100_0001, 0b1000_0000];
        let mut reader = BitReader::new(&bytes, 9).unwrap();
        assert_eq!(reader.read_bits(1), Some(0));
        assert_eq!(reader.read_bits(8), Some(0b1000_0011));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read_bit(), None);
        assert_eq!(reader.read_bits(1), None);
    }

    #[test]
    fn test_restart_from_same_bytes() {
        let bytes = [0b1100_1010];
        let first: Vec<bool> = BitReader::whole(&bytes).take(5).collect();
        let again: Vec<bool> = BitReader::whole(&bytes).take(5).collect();
        assert_eq!(first, again);
        assert_eq!(BitReader::whole(&bytes).len(), 8);
    }
}
