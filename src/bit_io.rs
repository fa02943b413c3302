//! Bit-granular reading and writing over byte-oriented streams.
//!
//! Bits are packed most-significant first: the first bit written lands in
//! bit 7 of the first byte. Multi-bit fields are big-endian.

use std::io::{self, ErrorKind, Read, Write};

/// Reads single bits or bit groups from an underlying reader.
pub struct BitReader<R> {
    inner: R,
    current: u8,
    // unread bits left in `current`
    remaining: u8,
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        BitReader {
            inner,
            current: 0,
            remaining: 0,
            bits_read: 0,
        }
    }

    /// Returns true if at least one more bit can be read.
    pub fn has_bits(&mut self) -> io::Result<bool> {
        self.fill()
    }

    /// Reads one bit, or `None` at end of stream.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if !self.fill()? {
            return Ok(None);
        }
        self.remaining -= 1;
        self.bits_read += 1;
        Ok(Some((self.current >> self.remaining) & 1 == 1))
    }

    /// Reads `count` bits (at most 32) as an unsigned value, MSB first.
    ///
    /// Returns `None` if the stream ends before all `count` bits are read;
    /// the bits that were available are consumed.
    pub fn read_bits(&mut self, count: u32) -> io::Result<Option<u32>> {
        debug_assert!(count <= 32, "cannot read {} bits into a u32", count);
        let mut value = 0u32;
        for _ in 0..count {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | u32::from(bit),
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.remaining == 0 {
            // byte aligned, skip the per-bit loop
            if !self.fill()? {
                return Ok(None);
            }
            self.remaining = 0;
            self.bits_read += 8;
            return Ok(Some(self.current));
        }
        Ok(self.read_bits(8)?.map(|value| value as u8))
    }

    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    fn fill(&mut self) -> io::Result<bool> {
        if self.remaining > 0 {
            return Ok(true);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(false),
                Ok(_) => {
                    self.current = byte[0];
                    self.remaining = 8;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Writes single bits or bit groups to an underlying writer.
///
/// Call [`BitWriter::finish`] to flush the trailing partial byte; dropping the
/// writer without finishing discards it.
pub struct BitWriter<W: Write> {
    inner: W,
    current: u8,
    // bits already packed into `current`
    filled: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        BitWriter {
            inner,
            current: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.current = (self.current << 1) | u8::from(bit);
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            self.inner.write_all(&[self.current])?;
            self.current = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Writes the low `count` bits of `value` (at most 32), MSB first.
    pub fn write_bits(&mut self, value: u32, count: u32) -> io::Result<()> {
        debug_assert!(count <= 32, "cannot write {} bits from a u32", count);
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if self.filled == 0 {
            self.bits_written += 8;
            return self.inner.write_all(&[byte]);
        }
        self.write_bits(u32::from(byte), 8)
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pads the final byte with zero bits, flushes, and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.filled > 0 {
            let byte = self.current << (8 - self.filled);
            self.inner.write_all(&[byte])?;
            self.current = 0;
            self.filled = 0;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_packed_msb_first() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_bits(0b01, 2).unwrap();
        writer.write_bits(0b1_0000_0001, 9).unwrap();
        assert_eq!(writer.bits_written(), 12);

        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, vec![0b1011_0000, 0b0001_0000]);
    }

    #[test]
    fn test_reader_reports_end_of_stream() {
        let data = [0b1010_0000u8];
        let mut reader = BitReader::new(&data[..]);

        assert_eq!(reader.read_bits(3).unwrap(), Some(0b101));
        assert!(reader.has_bits().unwrap());
        assert_eq!(reader.read_bits(5).unwrap(), Some(0));
        assert!(!reader.has_bits().unwrap());
        assert_eq!(reader.read_bit().unwrap(), None);
        assert_eq!(reader.bits_read(), 8);
    }

    #[test]
    fn test_read_bits_past_end_is_none() {
        let data = [0xffu8];
        let mut reader = BitReader::new(&data[..]);
        assert_eq!(reader.read_bits(9).unwrap(), None);
    }

    #[test]
    fn test_unaligned_bytes() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(false).unwrap();
        for byte in [0x00u8, 0xff, 0x5a, 0xa5] {
            writer.write_byte(byte).unwrap();
        }
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 5);

        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bit().unwrap(), Some(false));
        for expected in [0x00u8, 0xff, 0x5a, 0xa5] {
            assert_eq!(reader.read_byte().unwrap(), Some(expected));
        }
        // padding only
        assert_eq!(reader.read_bits(7).unwrap(), Some(0));
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[test]
    fn test_32_bit_field() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0xdead_beef, 32).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);

        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bits(32).unwrap(), Some(0xdead_beef));
    }
}
