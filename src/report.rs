use std::fmt;

/// Outcome of one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    pub source_bytes: u64,
    /// Bits written before padding the final byte.
    pub compressed_bits: u64,
    /// Distinct byte values in the source (EOF not included).
    pub distinct_symbols: usize,
}

impl EncodeReport {
    pub fn compressed_bytes(&self) -> u64 {
        self.compressed_bits.div_ceil(8)
    }

    /// Compressed size over source size, or `None` for an empty source.
    pub fn ratio(&self) -> Option<f64> {
        if self.source_bytes == 0 {
            return None;
        }
        Some(self.compressed_bytes() as f64 / self.source_bytes as f64)
    }
}

impl fmt::Display for EncodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes -> {} bytes, {} distinct symbols",
            self.source_bytes,
            self.compressed_bytes(),
            self.distinct_symbols
        )?;
        if let Some(ratio) = self.ratio() {
            write!(f, " ({:.1}% of original)", ratio * 100.0)?;
        }
        Ok(())
    }
}

/// Outcome of one decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeReport {
    /// Bits consumed up to and including the EOF code.
    pub compressed_bits: u64,
    pub decoded_bytes: u64,
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes -> {} bytes",
            self.compressed_bits.div_ceil(8),
            self.decoded_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_report() {
        let report = EncodeReport {
            source_bytes: 200,
            compressed_bits: 801,
            distinct_symbols: 12,
        };
        assert_eq!(report.compressed_bytes(), 101);
        assert_eq!(report.ratio(), Some(0.505));
        assert_eq!(
            report.to_string(),
            "200 bytes -> 101 bytes, 12 distinct symbols (50.5% of original)"
        );
    }

    #[test]
    fn test_empty_source_has_no_ratio() {
        let report = EncodeReport {
            source_bytes: 0,
            compressed_bits: 42,
            distinct_symbols: 0,
        };
        assert_eq!(report.ratio(), None);
        assert_eq!(report.to_string(), "0 bytes -> 6 bytes, 0 distinct symbols");
    }
}
