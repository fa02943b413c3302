use std::collections::BTreeMap;
use std::io::Read;

use tracing::debug;

use crate::bit_io::BitReader;
use crate::error::Result;

/// Occurrence counts of the byte values present in a source.
///
/// Only bytes that occur are stored, so every count is at least 1.
/// Iteration is in ascending byte order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable {
            counts: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, byte: u8) {
        *self.counts.entry(byte).or_insert(0) += 1;
    }

    pub fn count(&self, byte: u8) -> Option<u64> {
        self.counts.get(&byte).copied()
    }

    /// Number of distinct byte values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&byte, &count)| (byte, count))
    }
}

impl From<&[u8]> for FrequencyTable {
    fn from(bytes: &[u8]) -> Self {
        bytes.iter().copied().fold(FrequencyTable::new(), |mut table, byte| {
            table.record(byte);
            table
        })
    }
}

/// Counts every byte of `source`, reading it 8 bits at a time until exhausted.
pub fn count_frequencies<R: Read>(source: &mut BitReader<R>) -> Result<FrequencyTable> {
    let mut table = FrequencyTable::new();
    while let Some(byte) = source.read_byte()? {
        table.record(byte);
    }
    debug!(distinct = table.len(), total = table.total(), "counted byte frequencies");
    Ok(table)
}
