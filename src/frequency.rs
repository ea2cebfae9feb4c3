use std::io::{ErrorKind, Read};

use crate::error::{HuffmanError, Result};

const READ_CHUNK: usize = 64 * 1024;

/// Occurrence count of every byte value in one input.
///
/// Built in a single pass and never mutated afterwards. A symbol is present
/// when its count is at least one; the counts always sum to the input length.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl FrequencyTable {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = FrequencyTable {
            counts: [0; 256],
            total: 0,
        };
        table.absorb(bytes);
        table
    }

    /// Table from explicit counts; repeated symbols accumulate. Fails if the
    /// total would not fit in a `u64`.
    pub fn from_counts(counts: impl IntoIterator<Item = (u8, u64)>) -> Result<Self> {
        let mut table = FrequencyTable::from_bytes(&[]);
        for (symbol, count) in counts {
            table.total = table
                .total
                .checked_add(count)
                .ok_or(HuffmanError::CountOverflow)?;
            // a single count never exceeds the total
            table.counts[symbol as usize] += count;
        }
        Ok(table)
    }

    /// Counts a stream without buffering it whole.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut table = FrequencyTable::from_bytes(&[]);
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.absorb(&chunk[..n]);
        }
        Ok(table)
    }

    fn absorb(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.counts[byte as usize] += 1;
        }
        self.total += bytes.len() as u64;
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Number of distinct symbols present.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Present symbols with their counts, ascending by symbol value.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}

impl std::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
