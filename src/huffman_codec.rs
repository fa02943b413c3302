use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::bit_io::{BitReader, BitWriter};
use crate::bit_vec::BitVec;
use crate::code_table::CodeTable;
use crate::error::{GrinError, Result};
use crate::frequency::{count_frequencies, FrequencyTable};
use crate::header::{read_header, write_header};
use crate::hufftree::{HuffNode, HuffmanTree, Symbol, EOF};
use crate::report::{DecodeReport, EncodeReport};

/// A Huffman tree together with the code table derived from it.
pub struct HuffmanCodec {
    tree: HuffmanTree,
    codes: CodeTable,
}

impl HuffmanCodec {
    pub fn new(tree: HuffmanTree) -> Self {
        let codes = tree.code_table();
        HuffmanCodec { tree, codes }
    }

    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        Ok(Self::new(HuffmanTree::build(frequencies)?))
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.codes
    }

    /// Writes the magic number followed by the serialized tree.
    pub fn write_preamble<W: Write>(&self, out: &mut BitWriter<W>) -> Result<()> {
        write_header(out)?;
        self.tree.serialize(out)
    }

    /// Checks the magic number and reads the tree that follows it.
    pub fn read_preamble<R: Read>(input: &mut BitReader<R>) -> Result<Self> {
        read_header(input)?;
        Ok(Self::new(HuffmanTree::deserialize(input)?))
    }

    /// Writes the code of every byte of `source`, then the EOF code.
    /// Returns the frequencies of the bytes actually emitted.
    pub fn encode_symbols<R: Read, W: Write>(
        &self,
        source: &mut BitReader<R>,
        out: &mut BitWriter<W>,
    ) -> Result<FrequencyTable> {
        let eof_code = self
            .codes
            .get(EOF)
            .ok_or_else(|| GrinError::InvalidTree("no EOF leaf".to_string()))?;
        let mut emitted = FrequencyTable::new();
        while let Some(byte) = source.read_byte()? {
            let code = self
                .codes
                .get(Symbol::from(byte))
                .ok_or(GrinError::UnknownSymbol(byte))?;
            write_code(out, code)?;
            emitted.record(byte);
        }
        write_code(out, eof_code)?;
        Ok(emitted)
    }

    /// Walks the tree once per symbol until the EOF leaf, writing each byte.
    /// Returns the number of bytes written.
    pub fn decode_symbols<R: Read, W: Write>(
        &self,
        input: &mut BitReader<R>,
        out: &mut BitWriter<W>,
    ) -> Result<u64> {
        let mut decoded = 0u64;
        loop {
            let mut node = self.tree.root();
            let symbol = loop {
                match node {
                    HuffNode::Leaf { symbol } => break *symbol,
                    HuffNode::Internal { left, right } => {
                        let bit = input
                            .read_bit()?
                            .ok_or_else(|| GrinError::truncated("symbol code"))?;
                        node = if bit { right } else { left };
                    }
                }
            };
            if symbol == EOF {
                return Ok(decoded);
            }
            // every non-EOF leaf is a byte value
            out.write_byte(symbol as u8)?;
            decoded += 1;
        }
    }
}

fn write_code<W: Write>(out: &mut BitWriter<W>, code: &BitVec) -> Result<()> {
    for bit in code.iter() {
        out.write_bit(bit)?;
    }
    Ok(())
}

// `counting` and `emitting` must yield the same bytes.
fn encode_passes<C: Read, E: Read, W: Write>(
    counting: C,
    emitting: E,
    out: &mut BitWriter<W>,
) -> Result<EncodeReport> {
    let frequencies = count_frequencies(&mut BitReader::new(counting))?;
    let codec = HuffmanCodec::from_frequencies(&frequencies)?;
    codec.write_preamble(out)?;
    let tree_end = out.bits_written();
    let emitted = codec.encode_symbols(&mut BitReader::new(emitting), out)?;
    if emitted != frequencies {
        return Err(GrinError::SourceChanged {
            counted: frequencies.total(),
            emitted: emitted.total(),
        });
    }
    let source_bytes = emitted.total();
    debug!(
        source_bytes,
        header_and_tree_bits = tree_end,
        total_bits = out.bits_written(),
        "encoded stream"
    );
    Ok(EncodeReport {
        source_bytes,
        compressed_bits: out.bits_written(),
        distinct_symbols: frequencies.len(),
    })
}

fn decode_body<R: Read, W: Write>(
    codec: &HuffmanCodec,
    input: &mut BitReader<R>,
    out: &mut BitWriter<W>,
) -> Result<DecodeReport> {
    let decoded_bytes = codec.decode_symbols(input, out)?;
    debug!(decoded_bytes, bits_read = input.bits_read(), "decoded stream");
    Ok(DecodeReport {
        compressed_bits: input.bits_read(),
        decoded_bytes,
    })
}

/// Compresses everything `source` yields into `dest`.
///
/// A generic reader cannot be rewound, so the source is buffered in memory and
/// both the counting and the emission pass run over that buffer.
pub fn encode<R: Read, W: Write>(mut source: R, dest: W) -> Result<EncodeReport> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    let mut out = BitWriter::new(dest);
    let report = encode_passes(data.as_slice(), data.as_slice(), &mut out)?;
    out.finish()?;
    Ok(report)
}

/// Decompresses a grin stream from `source` into `dest`.
///
/// Nothing is written to `dest` unless the magic number matches.
pub fn decode<R: Read, W: Write>(source: R, dest: W) -> Result<DecodeReport> {
    let mut input = BitReader::new(source);
    let codec = HuffmanCodec::read_preamble(&mut input)?;
    let mut out = BitWriter::new(dest);
    let report = decode_body(&codec, &mut input, &mut out)?;
    out.finish()?;
    Ok(report)
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = BitWriter::new(Vec::new());
    encode_passes(data, data, &mut out)?;
    Ok(out.finish()?)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    decode(data, &mut decoded)?;
    Ok(decoded)
}

fn temp_file_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

fn persist(out: BitWriter<BufWriter<NamedTempFile>>, path: &Path) -> Result<()> {
    let temp = out.finish()?.into_inner().map_err(|e| e.into_error())?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Compresses the file at `input` into `output`.
///
/// The source is read twice from disk, once to count and once to emit. Output
/// goes to a temporary file that replaces `output` only on success.
pub fn encode_file(input: &Path, output: &Path) -> Result<EncodeReport> {
    let counting = BufReader::new(File::open(input)?);
    let emitting = BufReader::new(File::open(input)?);
    let mut out = BitWriter::new(BufWriter::new(temp_file_beside(output)?));
    let report = encode_passes(counting, emitting, &mut out)?;
    persist(out, output)?;
    info!(input = %input.display(), output = %output.display(), %report, "encoded file");
    Ok(report)
}

/// Decompresses the grin file at `input` into `output`.
///
/// The magic number and tree are checked before any output is created, and
/// `output` is only replaced once the EOF code has been decoded.
pub fn decode_file(input: &Path, output: &Path) -> Result<DecodeReport> {
    let mut reader = BitReader::new(BufReader::new(File::open(input)?));
    let codec = HuffmanCodec::read_preamble(&mut reader)?;
    let mut out = BitWriter::new(BufWriter::new(temp_file_beside(output)?));
    let report = decode_body(&codec, &mut reader, &mut out)?;
    persist(out, output)?;
    info!(input = %input.display(), output = %output.display(), %report, "decoded file");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MAGIC_NUMBER;

    #[test]
    fn test_aab_exact_bytes() {
        let compressed = compress(b"aab").unwrap();
        // magic, then the tree (32 bits), then codes 0 0 10 11
        assert_eq!(
            compressed,
            vec![
                0x00, 0x00, 0x07, 0x36, //
                0b1000_1100, 0b0011_0001, 0b1000_1001, 0b0000_0000, //
                0b0010_1100,
            ]
        );
        assert_eq!(decompress(&compressed).unwrap(), b"aab");
    }

    #[test]
    fn test_empty_input() {
        let mut compressed = Vec::new();
        let report = encode(&b""[..], &mut compressed).unwrap();
        assert_eq!(report.source_bytes, 0);
        // magic + lone EOF leaf, no code bits
        assert_eq!(report.compressed_bits, 32 + 10);
        assert_eq!(compressed, vec![0x00, 0x00, 0x07, 0x36, 0b0100_0000, 0x00]);

        let mut decoded = Vec::new();
        let report = decode(compressed.as_slice(), &mut decoded).unwrap();
        assert_eq!(report.decoded_bytes, 0);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_single_repeated_byte() {
        let data = vec![b'a'; 1000];
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < 200);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_report_counts() {
        let mut sink = Vec::new();
        let report = encode(&b"abracadabra"[..], &mut sink).unwrap();
        assert_eq!(report.source_bytes, 11);
        assert_eq!(report.distinct_symbols, 5);
        assert_eq!(report.compressed_bytes(), sink.len() as u64);

        let mut decoded = Vec::new();
        let report = decode(sink.as_slice(), &mut decoded).unwrap();
        assert_eq!(report.decoded_bytes, 11);
        assert_eq!(decoded, b"abracadabra");
    }

    #[test]
    fn test_bad_magic_writes_nothing() {
        let mut decoded = Vec::new();
        let err = decode(&b"hello, world"[..], &mut decoded).unwrap_err();
        assert!(matches!(err, GrinError::Format { found: 0x6865_6c6c, .. }));
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_stream_without_codes_is_truncation() {
        let mut compressed = compress(b"aab").unwrap();
        // drop the byte holding the codes
        compressed.pop();
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, GrinError::Truncated { .. }));
    }

    #[test]
    fn test_unknown_symbol() {
        let codec = HuffmanCodec::from_frequencies(&FrequencyTable::from(&b"abc"[..])).unwrap();
        let mut out = BitWriter::new(Vec::new());
        let err = codec
            .encode_symbols(&mut BitReader::new(&b"abd"[..]), &mut out)
            .unwrap_err();
        assert!(matches!(err, GrinError::UnknownSymbol(b'd')));
    }

    #[test]
    fn test_passes_over_different_bytes_fail() {
        // same alphabet and length, different counts
        let mut out = BitWriter::new(Vec::new());
        let err = encode_passes(&b"aab"[..], &b"abb"[..], &mut out).unwrap_err();
        assert!(matches!(err, GrinError::SourceChanged { counted: 3, emitted: 3 }), "{:?}", err);

        // source grew between the passes
        let mut out = BitWriter::new(Vec::new());
        let err = encode_passes(&b"aab"[..], &b"aabab"[..], &mut out).unwrap_err();
        assert!(matches!(err, GrinError::SourceChanged { counted: 3, emitted: 5 }), "{:?}", err);

        // source shrank
        let mut out = BitWriter::new(Vec::new());
        let err = encode_passes(&b"aab"[..], &b"a"[..], &mut out).unwrap_err();
        assert!(matches!(err, GrinError::SourceChanged { counted: 3, emitted: 1 }), "{:?}", err);
    }

    #[test]
    fn test_emitted_frequencies() {
        let codec = HuffmanCodec::from_frequencies(&FrequencyTable::from(&b"abc"[..])).unwrap();
        let mut out = BitWriter::new(Vec::new());
        let emitted = codec
            .encode_symbols(&mut BitReader::new(&b"cab"[..]), &mut out)
            .unwrap();
        assert_eq!(emitted, FrequencyTable::from(&b"abc"[..]));
    }

    #[test]
    fn test_missing_eof_code_is_rejected() {
        // a tree read from a stream always has EOF, so build the codec by hand
        let mut codec = HuffmanCodec::new(HuffmanTree::from_bytes(b"ab").unwrap());
        codec.codes = codec.codes.clone().without(EOF);

        let mut out = BitWriter::new(Vec::new());
        let err = codec
            .encode_symbols(&mut BitReader::new(&b"ab"[..]), &mut out)
            .unwrap_err();
        assert!(matches!(err, GrinError::InvalidTree(_)), "{:?}", err);
        assert_eq!(out.bits_written(), 0);
    }

    #[test]
    fn test_preamble_roundtrip() {
        let codec = HuffmanCodec::from_frequencies(&FrequencyTable::from(&b"preamble"[..])).unwrap();
        let mut out = BitWriter::new(Vec::new());
        codec.write_preamble(&mut out).unwrap();
        let bytes = out.finish().unwrap();
        assert_eq!(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), MAGIC_NUMBER);

        let read = HuffmanCodec::read_preamble(&mut BitReader::new(bytes.as_slice())).unwrap();
        assert_eq!(read.tree(), codec.tree());
    }
}
