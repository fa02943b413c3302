//! # grin
//!
//! Lossless file compression with Huffman coding.
//!
//! A grin file is a 32-bit magic number, the Huffman tree serialized in
//! preorder, and the code of every source byte followed by the code of a
//! reserved end-of-stream symbol. No length field is stored.
//!
//! ## Quick Start
//!
//! ```rust
//! use grin::{compress, decompress};
//!
//! let compressed = compress(b"abracadabra")?;
//! assert_eq!(decompress(&compressed)?, b"abracadabra");
//! # Ok::<(), grin::GrinError>(())
//! ```
//!
//! Files are handled with [`encode_file`] and [`decode_file`], which only
//! replace the output path once the whole stream has been processed.

pub mod bit_io;
pub mod code_table;
pub mod error;
pub mod frequency;
pub mod header;
pub mod huffman_codec;
pub mod hufftree;
pub mod report;

// Internal modules - not part of public API
mod bit_vec;
mod min_heap;

pub use bit_vec::BitVec;
pub use error::{GrinError, Result};
pub use huffman_codec::{
    compress, decode, decode_file, decompress, encode, encode_file, HuffmanCodec,
};
pub use hufftree::{HuffmanTree, Symbol, EOF};
pub use report::{DecodeReport, EncodeReport};
