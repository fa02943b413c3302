use crate::bit_vec::BitVec;
use crate::hufftree::{HuffNode, HuffmanTree, Symbol, EOF};

/// Root-to-leaf bit path of every symbol in a tree, indexed by symbol.
///
/// Left is `0`, right is `1`. A tree that is a single leaf gives that
/// symbol the empty code.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<BitVec>>,
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; usize::from(EOF) + 1];
        let mut stack = vec![(tree.root(), BitVec::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol } => codes[usize::from(*symbol)] = Some(path),
                HuffNode::Internal { left, right } => {
                    stack.push((&**right, path.with_bit(true)));
                    stack.push((&**left, path.with_bit(false)));
                }
            }
        }
        CodeTable { codes }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&BitVec> {
        self.codes.get(usize::from(symbol))?.as_ref()
    }

    /// Codes present in the table, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &BitVec)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as Symbol, code)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn without(mut self, symbol: Symbol) -> Self {
        self.codes[usize::from(symbol)] = None;
        self
    }
}
