use std::io;

use thiserror::Error;

use crate::min_heap::HeapError;

/// Errors returned by the grin codec.
#[derive(Debug, Error)]
pub enum GrinError {
    /// The leading 32 bits are not the grin magic number.
    #[error("not a grin file: expected magic number {expected:#010x}, found {found:#010x}")]
    Format { expected: u32, found: u32 },
    /// The bit stream ended in the middle of a field.
    #[error("compressed stream truncated while reading {context}")]
    Truncated { context: &'static str },
    /// A deserialized tree breaks one of the tree invariants.
    #[error("invalid huffman tree: {0}")]
    InvalidTree(String),
    /// A source byte has no code, i.e. the source changed between the
    /// counting pass and the emission pass.
    #[error("byte {0:#04x} has no code in the huffman tree")]
    UnknownSymbol(u8),
    /// The emission pass read different bytes than the counting pass.
    #[error("source changed between passes: {counted} bytes counted, {emitted} bytes emitted")]
    SourceChanged { counted: u64, emitted: u64 },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("heap error: {0}")]
    Heap(#[from] HeapError),
}

impl GrinError {
    pub(crate) fn truncated(context: &'static str) -> Self {
        GrinError::Truncated { context }
    }
}

pub type Result<T> = std::result::Result<T, GrinError>;
