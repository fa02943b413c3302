use std::io::{Read, Write};

use crate::bit_io::{BitReader, BitWriter};
use crate::error::{GrinError, Result};

/// Leading value of every grin file.
pub const MAGIC_NUMBER: u32 = 1846;
pub const MAGIC_BITS: u32 = 32;

pub fn write_header<W: Write>(out: &mut BitWriter<W>) -> Result<()> {
    out.write_bits(MAGIC_NUMBER, MAGIC_BITS)?;
    Ok(())
}

/// Consumes the magic number, failing with [`GrinError::Format`] on mismatch.
///
/// A stream shorter than the magic number is a mismatch too; `found` then
/// holds whatever bits were present.
pub fn read_header<R: Read>(input: &mut BitReader<R>) -> Result<()> {
    let mut found = 0u32;
    let mut complete = true;
    for _ in 0..MAGIC_BITS {
        match input.read_bit()? {
            Some(bit) => found = (found << 1) | u32::from(bit),
            None => {
                complete = false;
                break;
            }
        }
    }
    if !complete || found != MAGIC_NUMBER {
        return Err(GrinError::Format {
            expected: MAGIC_NUMBER,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let mut writer = BitWriter::new(Vec::new());
        write_header(&mut writer).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x07, 0x36]);
        assert!(read_header(&mut BitReader::new(bytes.as_slice())).is_ok());
    }

    #[test]
    fn test_wrong_magic() {
        let err = read_header(&mut BitReader::new(&b"PK\x03\x04"[..])).unwrap_err();
        match err {
            GrinError::Format { expected, found } => {
                assert_eq!(expected, MAGIC_NUMBER);
                assert_eq!(found, 0x504b_0304);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_header_is_format_error() {
        // the first three bytes of a real header are still not a grin file
        let err = read_header(&mut BitReader::new(&[0x00u8, 0x00, 0x07][..])).unwrap_err();
        assert!(matches!(err, GrinError::Format { found: 0x07, .. }), "{:?}", err);

        let err = read_header(&mut BitReader::new(&b""[..])).unwrap_err();
        assert!(matches!(err, GrinError::Format { found: 0, .. }), "{:?}", err);
    }
}
