use std::cmp::Ordering;
use std::fmt::Write as _;

use crate::bit_vec::{BitReader, BitWriter};
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::{HeapErr, MinHeap};

const SHAPE_INTERNAL: bool = false;
const SHAPE_LEAF: bool = true;

/// Bits needed to serialize the shape of a tree with `leaf_count` leaves:
/// one marker per node plus eight symbol bits per leaf.
pub fn shape_bit_len(leaf_count: usize) -> usize {
    (2 * leaf_count - 1) + 8 * leaf_count
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(byte: u8, weight: u64) -> Self {
        HuffNode::Leaf { weight, byte }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// `a` becomes the left (bit 0) child. The weight saturates at
    /// `u64::MAX`; trees built from a [`FrequencyTable`] never reach it since
    /// the table's total fits in a `u64`.
    pub fn merge(a: Self, b: Self) -> Self {
        let weight = a.weight().saturating_add(b.weight());
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }
}

/// Position in the build queue. Equal weights are ordered by sequence:
/// leaves take 0..k in ascending symbol order, merged nodes take k, k+1, ...
/// in creation order.
struct Pending {
    weight: u64,
    sequence: usize,
    node: HuffNode,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// An owned prefix-code tree.
///
/// A tree built from a single distinct symbol has that leaf as its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    /// Greedy minimum-merge over the table's symbols. Returns `None` for an
    /// empty table.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Option<Self> {
        let nodes: Vec<Pending> = frequencies
            .iter()
            .enumerate()
            .map(|(sequence, (byte, weight))| Pending {
                weight,
                sequence,
                node: HuffNode::new(byte, weight),
            })
            .collect();

        let mut next_sequence = nodes.len();
        let mut heap = MinHeap::build(nodes);

        // every pass either returns or pushes a node back, so the heap only
        // starts a pass empty when the table was empty
        while let Ok(x) = heap.extract_min() {
            let y = match heap.extract_min() {
                Ok(y) => y,
                Err(HeapErr::Underflow) => return Some(HuffmanTree { root: x.node }),
            };
            let node = HuffNode::merge(x.node, y.node);
            heap.insert(Pending {
                weight: node.weight(),
                sequence: next_sequence,
                node,
            });
            next_sequence += 1;
        }
        None
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::from_frequencies(&FrequencyTable::from_bytes(bytes))
    }

    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn is_single_symbol(&self) -> bool {
        matches!(self.root, HuffNode::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { .. } => count += 1,
                HuffNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        count
    }

    /// Pre-order shape: `0` for an internal node followed by its left then
    /// right subtree, `1` for a leaf followed by its 8-bit symbol.
    pub fn write_shape(&self, writer: &mut BitWriter) {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { byte, .. } => {
                    writer.push_bit(SHAPE_LEAF);
                    writer.push_bits(u64::from(*byte), 8);
                }
                HuffNode::Internal { left, right, .. } => {
                    writer.push_bit(SHAPE_INTERNAL);
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }

    /// Inverse of [`write_shape`](Self::write_shape). Leaves come back with
    /// weight 0 since frequencies are not stored.
    pub fn read_shape(reader: &mut BitReader<'_>, leaf_count: usize) -> Result<Self> {
        if leaf_count == 0 {
            return Err(HuffmanError::format("tree must have at least one leaf"));
        }
        let mut state = ShapeState {
            leaves_left: leaf_count,
            internals_left: leaf_count - 1,
            seen: [false; 256],
        };
        let root = state.read_node(reader)?;
        if state.leaves_left != 0 {
            return Err(HuffmanError::format(format!(
                "tree description holds {} leaves, header says {leaf_count}",
                leaf_count - state.leaves_left
            )));
        }
        Ok(HuffmanTree { root })
    }

    /// Indented dump of the tree, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_node(&self.root, 0, "root", &mut out);
        out
    }
}

struct ShapeState {
    leaves_left: usize,
    internals_left: usize,
    seen: [bool; 256],
}

impl ShapeState {
    // recursion depth is bounded by `internals_left`, at most 255
    fn read_node(&mut self, reader: &mut BitReader<'_>) -> Result<HuffNode> {
        let marker = reader
            .read_bit()
            .ok_or_else(|| HuffmanError::format("tree description ends mid-node"))?;

        if marker == SHAPE_LEAF {
            if self.leaves_left == 0 {
                return Err(HuffmanError::format("tree description has too many leaves"));
            }
            let byte = reader
                .read_bits(8)
                .ok_or_else(|| HuffmanError::format("tree description ends mid-symbol"))?
                as u8;
            if std::mem::replace(&mut self.seen[byte as usize], true) {
                return Err(HuffmanError::format(format!(
                    "symbol {byte:#04x} appears twice in tree description"
                )));
            }
            self.leaves_left -= 1;
            return Ok(HuffNode::new(byte, 0));
        }

        if self.internals_left == 0 {
            return Err(HuffmanError::format(
                "tree description has too many internal nodes",
            ));
        }
        self.internals_left -= 1;
        let left = self.read_node(reader)?;
        let right = self.read_node(reader)?;
        Ok(HuffNode::merge(left, right))
    }
}

fn render_node(node: &HuffNode, depth: usize, label: &str, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        HuffNode::Leaf { byte, weight } => {
            let shown = if byte.is_ascii_graphic() {
                *byte as char
            } else {
                '.'
            };
            let _ = writeln!(
                out,
                "{indent}{label}-> Leaf: '{shown}' ({byte}) [weight: {weight}]"
            );
        }
        HuffNode::Internal {
            weight,
            left,
            right,
        } => {
            let _ = writeln!(out, "{indent}{label}-> Internal [weight: {weight}]");
            render_node(left, depth + 1, "L", out);
            render_node(right, depth + 1, "R", out);
        }
    }
}
