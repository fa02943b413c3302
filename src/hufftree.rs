use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::bit_io::{BitReader, BitWriter};
use crate::code_table::CodeTable;
use crate::error::{GrinError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

/// A decoded unit: a byte value `0..=255` or [`EOF`].
pub type Symbol = u16;

/// End-of-stream sentinel. Never a byte of the source.
pub const EOF: Symbol = 256;

/// Width of a serialized leaf symbol.
pub const SYMBOL_BITS: u32 = 9;

/// Deepest leaf possible in a tree over at most 257 distinct symbols.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: Symbol,
    },
    Internal {
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: Symbol) -> Self {
        HuffNode::Leaf { symbol }
    }

    pub fn merge(left: Self, right: Self) -> Self {
        HuffNode::Internal {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }
}

// Queue entry used only while building. `seq` is unique and strictly
// increasing in insertion order, so equal weights pop in insertion order.
struct Weighted {
    weight: u64,
    seq: usize,
    node: HuffNode,
}

impl PartialEq for Weighted {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl Eq for Weighted {}

impl PartialOrd for Weighted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weighted {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Builds the tree for `frequencies` plus an [`EOF`] leaf of weight 1.
    ///
    /// Leaves enter the queue in ascending byte order followed by EOF, and
    /// merged nodes after them, so the same table always yields the same tree.
    /// The first node taken from the queue becomes the left child.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        let mut nodes: Vec<Weighted> = frequencies
            .iter()
            .enumerate()
            .map(|(seq, (byte, count))| Weighted {
                weight: count,
                seq,
                node: HuffNode::leaf(Symbol::from(byte)),
            })
            .collect();
        let mut next_seq = nodes.len();
        nodes.push(Weighted {
            weight: 1,
            seq: next_seq,
            node: HuffNode::leaf(EOF),
        });
        next_seq += 1;

        let mut heap = MinHeap::build(nodes);
        while heap.heap_size() > 1 {
            let first = heap.extract_min()?;
            let second = heap.extract_min()?;
            heap.insert(Weighted {
                weight: first.weight + second.weight,
                seq: next_seq,
                node: HuffNode::merge(first.node, second.node),
            });
            next_seq += 1;
        }
        let root = heap.extract_min()?.node;

        let tree = HuffmanTree { root };
        debug!(leaves = tree.leaf_count(), "built huffman tree");
        trace!("huffman tree:\n{}", tree);
        Ok(tree)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::build(&FrequencyTable::from(bytes))
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Leaf symbols in preorder (left before right).
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol } => symbols.push(*symbol),
                HuffNode::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        symbols
    }

    pub fn leaf_count(&self) -> usize {
        self.symbols().len()
    }

    pub fn code_table(&self) -> CodeTable {
        CodeTable::from_tree(self)
    }

    /// Writes the tree in preorder: `1` then left then right for an internal
    /// node, `0` then the 9-bit symbol for a leaf.
    pub fn serialize<W: Write>(&self, out: &mut BitWriter<W>) -> Result<()> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol } => {
                    out.write_bit(false)?;
                    out.write_bits(u32::from(*symbol), SYMBOL_BITS)?;
                }
                HuffNode::Internal { left, right } => {
                    out.write_bit(true)?;
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Ok(())
    }

    /// Reads a tree written by [`HuffmanTree::serialize`].
    ///
    /// Rejects symbols above [`EOF`], repeated symbols, a missing EOF leaf,
    /// and nesting deeper than [`MAX_DEPTH`].
    pub fn deserialize<R: Read>(input: &mut BitReader<R>) -> Result<Self> {
        // internal nodes still waiting for children; `Some` once the left one is done
        let mut pending: Vec<Option<HuffNode>> = Vec::new();
        let mut seen = [false; EOF as usize + 1];

        loop {
            let is_internal = input
                .read_bit()?
                .ok_or_else(|| GrinError::truncated("tree node tag"))?;
            if is_internal {
                if pending.len() >= MAX_DEPTH {
                    return Err(GrinError::InvalidTree(format!(
                        "nesting exceeds {} levels",
                        MAX_DEPTH
                    )));
                }
                pending.push(None);
                continue;
            }

            let raw = input
                .read_bits(SYMBOL_BITS)?
                .ok_or_else(|| GrinError::truncated("leaf symbol"))?;
            let symbol = Symbol::try_from(raw)
                .ok()
                .filter(|&symbol| symbol <= EOF)
                .ok_or_else(|| GrinError::InvalidTree(format!("symbol {} out of range", raw)))?;
            if std::mem::replace(&mut seen[usize::from(symbol)], true) {
                return Err(GrinError::InvalidTree(format!(
                    "symbol {} appears twice",
                    symbol
                )));
            }

            // attach the finished subtree, closing every parent it completes
            let mut completed = HuffNode::leaf(symbol);
            loop {
                match pending.pop() {
                    None => {
                        if !seen[usize::from(EOF)] {
                            return Err(GrinError::InvalidTree("no EOF leaf".to_string()));
                        }
                        let tree = HuffmanTree { root: completed };
                        debug!(leaves = tree.leaf_count(), "deserialized huffman tree");
                        return Ok(tree);
                    }
                    Some(None) => {
                        pending.push(Some(completed));
                        break;
                    }
                    Some(Some(left)) => completed = HuffNode::merge(left, completed),
                }
            }
        }
    }
}

fn symbol_label(symbol: Symbol) -> String {
    match symbol {
        EOF => "EOF".to_string(),
        s if (s as u8).is_ascii_graphic() => format!("'{}' ({})", s as u8 as char, s),
        s => format!("({})", s),
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(&self.root, 0usize, "root")];
        while let Some((node, depth, label)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node {
                HuffNode::Leaf { symbol } => {
                    writeln!(f, "{}{}-> Leaf: {}", indent, label, symbol_label(*symbol))?;
                }
                HuffNode::Internal { left, right } => {
                    writeln!(f, "{}{}-> Internal", indent, label)?;
                    stack.push((&**right, depth + 1, "R"));
                    stack.push((&**left, depth + 1, "L"));
                }
            }
        }
        Ok(())
    }
}
