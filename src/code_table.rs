use std::collections::BTreeMap;
use std::fmt;

use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};

/// A variable-length bit string, first bit first.
///
/// Not bounded by a machine word: skewed trees over 256 symbols reach depth
/// 255.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({self})")
    }
}

/// Symbol to code mapping extracted from a tree's leaf paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// Depth-first walk with an explicit stack: left appends `0`, right `1`.
    /// A root that is itself a leaf gets the code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();

        if let HuffNode::Leaf { byte, .. } = tree.root {
            codes.insert(byte, Code { bits: vec![false] });
            return CodeTable { codes };
        }

        let mut stack: Vec<(&HuffNode, Vec<bool>)> = vec![(&tree.root, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                HuffNode::Leaf { byte, .. } => {
                    codes.insert(*byte, Code { bits: path });
                }
                HuffNode::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((right, right_path));
                    stack.push((left, left_path));
                }
            }
        }

        CodeTable { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Sum of `count × code length` over the table's symbols, i.e. the
    /// payload size in bits for input with these frequencies.
    pub fn weighted_length(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .map(|(symbol, count)| count * self.get(symbol).map_or(0, |c| c.len() as u64))
            .sum()
    }

    pub fn is_prefix_free(&self) -> bool {
        // in lexicographic order a prefix sorts directly before its extensions
        let mut sorted: Vec<&Code> = self.codes.values().collect();
        sorted.sort_by(|a, b| a.bits.cmp(&b.bits));
        sorted.windows(2).all(|w| !w[0].is_prefix_of(w[1]))
    }
}
