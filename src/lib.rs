//! # huffpack
//!
//! Reversible Huffman coding for byte streams. Input is counted, a prefix
//! code tree is built by greedy minimum-merge, and the bytes are re-expressed
//! as MSB-first packed codes inside a self-describing container that embeds
//! the tree shape and the exact original length.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffpack::{compress, decompress};
//!
//! let text = b"the quick brown fox jumps over the lazy dog";
//! let packed = compress(text);
//! assert_eq!(decompress(&packed)?, text);
//! # Ok::<(), huffpack::HuffmanError>(())
//! ```
//!
//! Ties between equal weights are broken by ascending symbol value for
//! leaves and by creation order for merged nodes, so the same input always
//! yields the same container.

pub mod bit_vec;
pub mod code_table;
pub mod container;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod metadata;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use code_table::{Code, CodeTable};
pub use container::{Body, Container};
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use huffman_codec::{
    compress, compress_stream, decode, decompress, decompress_stream, embedded_tree, encode,
    HuffmanCodec,
};
pub use hufftree::{HuffNode, HuffmanTree};
pub use metadata::Mode;
