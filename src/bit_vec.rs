use std::fmt;

/// A growable string of bits, packed MSB-first into bytes.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    bits: Vec<u8>,
    bit_count: usize,
}

impl BitVec {
    pub fn new() -> Self {
        BitVec {
            bits: Vec::new(),
            bit_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bit_count
    }

    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    pub fn push_bit(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8; // which byte is target?
        let bit_offset = self.bit_count % 8; // which bit position is target?

        // make a new byte if needed
        if byte_index >= self.bits.len() {
            self.bits.push(0);
        }

        if bit {
            self.bits[byte_index] |= 1 << (7 - bit_offset);
        }

        self.bit_count += 1;
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.bit_count {
            return None;
        }
        Some(self.bits[index / 8] & (1 << (7 - index % 8)) != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_count).map(move |i| self.bits[i / 8] & (1 << (7 - i % 8)) != 0)
    }

    pub fn starts_with(&self, prefix: &BitVec) -> bool {
        prefix.len() <= self.len() && prefix.iter().zip(self.iter()).all(|(a, b)| a == b)
    }

    /// Copy of this bit string with one more bit appended.
    pub fn with_bit(&self, bit: bool) -> BitVec {
        let mut extended = self.clone();
        extended.push_bit(bit);
        extended
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bit_vec = BitVec::new();
        for bit in iter {
            bit_vec.push_bit(bit);
        }
        bit_vec
    }
}
