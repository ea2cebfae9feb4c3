use std::io::{Read, Write};

use log::{debug, trace};

use crate::bit_vec::{BitReader, BitWriter};
use crate::code_table::{Code, CodeTable};
use crate::container::{Body, Container, MAX_LEAVES, MIN_LEAVES};
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::{shape_bit_len, HuffNode, HuffmanTree};

/// A tree with its extracted code table, ready to encode bytes.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    tree: HuffmanTree,
    code_table: CodeTable,
    // indexed by byte; absent symbols hold an empty code
    lookup: Vec<Code>,
}

impl HuffmanCodec {
    pub fn new(tree: HuffmanTree) -> Self {
        let code_table = CodeTable::from_tree(&tree);
        let mut lookup = vec![Code::default(); 256];
        for (symbol, code) in code_table.iter() {
            lookup[symbol as usize] = code.clone();
        }
        HuffmanCodec {
            tree,
            code_table,
            lookup,
        }
    }

    /// Codec fitted to `sample`, or `None` if the sample is empty.
    pub fn from_bytes(sample: &[u8]) -> Option<Self> {
        HuffmanTree::from_bytes(sample).map(Self::new)
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.code_table
    }

    /// Encodes `data` with this codec's codes. Every byte of `data` must
    /// have a code.
    pub fn encode(&self, data: &[u8]) -> Result<Container> {
        if let Some(&byte) = data
            .iter()
            .find(|&&byte| self.lookup[byte as usize].is_empty())
        {
            return Err(HuffmanError::UnknownSymbol(byte));
        }
        Ok(self.pack(data))
    }

    fn pack(&self, data: &[u8]) -> Container {
        let original_length = data.len() as u64;
        if data.is_empty() {
            return Container::empty();
        }

        let root = match &self.tree.root {
            HuffNode::Leaf { byte, .. } => {
                return Container {
                    original_length,
                    body: Body::Single { symbol: *byte },
                };
            }
            root => root,
        };

        let leaf_count = self.code_table.len();
        let mut shape = BitWriter::with_capacity(shape_bit_len(leaf_count));
        self.tree.write_shape(&mut shape);

        let mut payload = BitWriter::with_capacity(data.len());
        for &byte in data {
            payload.push_code(&self.lookup[byte as usize]);
        }
        let (payload, payload_bits) = payload.into_parts();

        debug!(
            "packed {} bytes into {} payload bits over {} symbols (root weight {})",
            data.len(),
            payload_bits,
            leaf_count,
            root.weight()
        );

        Container {
            original_length,
            body: Body::General {
                leaf_count: leaf_count as u16,
                tree_shape: shape.into_parts().0,
                payload_bits: payload_bits as u64,
                payload,
            },
        }
    }
}

/// Builds codes fitted to `data` and encodes it.
pub fn encode(data: &[u8]) -> Container {
    let frequencies = FrequencyTable::from_bytes(data);
    debug!(
        "encoding {} bytes with {} distinct symbols",
        frequencies.total(),
        frequencies.distinct()
    );

    match HuffmanTree::from_frequencies(&frequencies) {
        None => Container::empty(),
        Some(tree) => {
            trace!("huffman tree:\n{}", tree.render());
            HuffmanCodec::new(tree).pack(data)
        }
    }
}

/// Recovers the original bytes. Nothing is returned unless the whole
/// container decodes cleanly.
pub fn decode(container: &Container) -> Result<Vec<u8>> {
    let original_length = usize::try_from(container.original_length).map_err(|_| {
        HuffmanError::format(format!(
            "original length {} does not fit in memory",
            container.original_length
        ))
    })?;

    match &container.body {
        Body::Empty => {
            if original_length != 0 {
                return Err(HuffmanError::format(format!(
                    "empty container declares {original_length} bytes"
                )));
            }
            Ok(Vec::new())
        }
        Body::Single { symbol } => {
            if original_length == 0 {
                return Err(HuffmanError::format(
                    "single-symbol container declares zero bytes",
                ));
            }
            debug!("expanding {original_length} copies of {symbol:#04x}");
            let mut out = Vec::new();
            out.try_reserve_exact(original_length).map_err(|e| {
                HuffmanError::format(format!(
                    "cannot hold {original_length} decoded bytes: {e}"
                ))
            })?;
            out.resize(original_length, *symbol);
            Ok(out)
        }
        Body::General {
            leaf_count,
            tree_shape,
            payload_bits,
            payload,
        } => {
            let leaf_count = *leaf_count as usize;
            let tree = rebuild_tree(leaf_count, tree_shape)?;
            let payload_bits = usize::try_from(*payload_bits).map_err(|_| {
                HuffmanError::format(format!("payload of {payload_bits} bits is too large"))
            })?;
            let reader = BitReader::new(payload, payload_bits)?;
            let decoded = walk(&tree, reader, original_length)?;
            debug!(
                "decoded {} payload bits into {} bytes",
                payload_bits,
                decoded.len()
            );
            Ok(decoded)
        }
    }
}

/// The tree a container carries: `None` for an empty container, a lone
/// leaf for single-symbol mode.
pub fn embedded_tree(container: &Container) -> Result<Option<HuffmanTree>> {
    match &container.body {
        Body::Empty => Ok(None),
        Body::Single { symbol } => Ok(Some(HuffmanTree {
            root: HuffNode::new(*symbol, container.original_length),
        })),
        Body::General {
            leaf_count,
            tree_shape,
            ..
        } => rebuild_tree(*leaf_count as usize, tree_shape).map(Some),
    }
}

fn rebuild_tree(leaf_count: usize, tree_shape: &[u8]) -> Result<HuffmanTree> {
    if !(MIN_LEAVES..=MAX_LEAVES).contains(&leaf_count) {
        return Err(HuffmanError::format(format!(
            "leaf count {leaf_count} outside {MIN_LEAVES}..={MAX_LEAVES}"
        )));
    }
    let shape_bits = shape_bit_len(leaf_count);
    if tree_shape.len() != shape_bits.div_ceil(8) {
        return Err(HuffmanError::format(format!(
            "tree description is {} bytes, {leaf_count} leaves need {}",
            tree_shape.len(),
            shape_bits.div_ceil(8)
        )));
    }
    let mut reader = BitReader::new(tree_shape, shape_bits)?;
    HuffmanTree::read_shape(&mut reader, leaf_count)
}

/// Walks from the root per bit (0 left, 1 right), emitting a symbol at each
/// leaf, until `original_length` symbols are out.
fn walk(tree: &HuffmanTree, mut reader: BitReader<'_>, original_length: usize) -> Result<Vec<u8>> {
    // every symbol costs at least one bit, so the payload bounds the output
    let mut out = Vec::with_capacity(original_length.min(reader.remaining()));

    while out.len() < original_length {
        let mut node = &tree.root;
        loop {
            match node {
                HuffNode::Leaf { byte, .. } => {
                    out.push(*byte);
                    break;
                }
                HuffNode::Internal { left, right, .. } => {
                    let bit = reader.read_bit().ok_or_else(|| {
                        HuffmanError::corrupt(format!(
                            "ran out of bits after {} of {original_length} bytes",
                            out.len()
                        ))
                    })?;
                    node = if bit { right } else { left };
                }
            }
        }
    }

    if reader.remaining() != 0 {
        return Err(HuffmanError::corrupt(format!(
            "{} payload bits left over after {original_length} bytes",
            reader.remaining()
        )));
    }

    Ok(out)
}

pub fn compress(data: &[u8]) -> Vec<u8> {
    encode(data).serialize()
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    decode(&Container::deserialize(bytes)?)
}

/// Reads all of `reader`, then writes one container to `writer`. Returns
/// the number of bytes written.
pub fn compress_stream<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<u64> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let bytes = compress(&data);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len() as u64)
}

/// Decodes the whole container before writing anything, so a malformed
/// input leaves `writer` untouched. Returns the number of bytes written.
pub fn decompress_stream<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<u64> {
    let container = Container::read_from(&mut reader)?;
    let data = decode(&container)?;
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(data.len() as u64)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::metadata::Mode;

    const TEXT: &[u8] = b"It was the best of times, it was the worst of times, \
        it was the age of wisdom, it was the age of foolishness";

    #[test]
    fn test_text_roundtrip() {
        let container = encode(TEXT);
        assert_eq!(container.mode(), Mode::General);
        assert_eq!(decode(&container).unwrap(), TEXT);
    }

    #[test]
    fn test_serialized_roundtrip() {
        let bytes = compress(TEXT);
        assert_eq!(decompress(&bytes).unwrap(), TEXT);
    }

    #[test]
    fn test_codec_rejects_unknown_symbol() {
        let codec = HuffmanCodec::from_bytes(b"abc").unwrap();
        let err = codec.encode(b"abd").unwrap_err();
        assert!(matches!(err, HuffmanError::UnknownSymbol(b'd')));
    }

    #[test]
    fn test_codec_encodes_subset_of_sample() {
        let codec = HuffmanCodec::from_bytes(TEXT).unwrap();
        let container = codec.encode(b"the age").unwrap();
        assert_eq!(decode(&container).unwrap(), b"the age");
        assert_eq!(codec.encode(b"").unwrap(), Container::empty());
    }

    #[test]
    fn test_single_symbol_codec() {
        let codec = HuffmanCodec::from_bytes(b"zz").unwrap();
        assert!(codec.tree().is_single_symbol());
        assert_eq!(codec.code_table().get(b'z').unwrap().to_string(), "0");
        let container = codec.encode(b"zzzzz").unwrap();
        assert_eq!(container.body, Body::Single { symbol: b'z' });
        assert_eq!(decode(&container).unwrap(), b"zzzzz");
    }

    #[test]
    fn test_absurd_single_symbol_length_is_format_error() {
        let container = Container {
            original_length: u64::MAX,
            body: Body::Single { symbol: b'x' },
        };
        assert!(decode(&container).unwrap_err().is_format());
        assert!(decompress(&container.serialize()).unwrap_err().is_format());
    }

    #[test]
    fn test_leftover_bits_are_corrupt() {
        let mut container = encode(b"aab");
        if let Body::General {
            payload_bits,
            payload,
            ..
        } = &mut container.body
        {
            *payload_bits += 1;
            assert!(payload.len() * 8 >= *payload_bits as usize);
        }
        assert!(decode(&container).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_short_payload_is_corrupt() {
        let mut container = encode(TEXT);
        if let Body::General { payload_bits, .. } = &mut container.body {
            *payload_bits -= 5;
        }
        assert!(decode(&container).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_bad_shape_length_is_format_error() {
        let mut container = encode(TEXT);
        if let Body::General { tree_shape, .. } = &mut container.body {
            tree_shape.pop();
        }
        assert!(decode(&container).unwrap_err().is_format());
    }

    #[test]
    fn test_embedded_tree_matches_encoder_codes() {
        let codec = HuffmanCodec::from_bytes(TEXT).unwrap();
        let container = codec.encode(TEXT).unwrap();
        let tree = embedded_tree(&container).unwrap().unwrap();
        assert_eq!(&CodeTable::from_tree(&tree), codec.code_table());

        assert!(embedded_tree(&Container::empty()).unwrap().is_none());
        let single = embedded_tree(&encode(b"qqq")).unwrap().unwrap();
        assert!(single.is_single_symbol());
    }

    #[test]
    fn test_streams() {
        let mut compressed = Vec::new();
        let written = compress_stream(Cursor::new(TEXT), &mut compressed).unwrap();
        assert_eq!(written, compressed.len() as u64);

        let mut restored = Vec::new();
        let written = decompress_stream(Cursor::new(&compressed), &mut restored).unwrap();
        assert_eq!(written, TEXT.len() as u64);
        assert_eq!(restored, TEXT);
    }

    #[test]
    fn test_failed_decompress_writes_nothing() {
        let mut compressed = compress(TEXT);
        compressed.truncate(compressed.len() - 2);

        let mut restored = Vec::new();
        let err = decompress_stream(Cursor::new(&compressed), &mut restored).unwrap_err();
        assert!(err.is_corrupt());
        assert!(restored.is_empty());
    }
}
