//! Self-describing compressed stream.
//!
//! ```text
//! header    magic "HUFF" | version u8 | mode u8 | original length u64 LE
//! empty     (nothing)
//! single    symbol u8
//! general   leaf count u16 LE | tree shape | payload bits u64 LE | payload
//! ```
//!
//! The tree shape is the pre-order encoding from
//! [`HuffmanTree::write_shape`](crate::hufftree::HuffmanTree::write_shape),
//! padded to a byte. The payload is MSB-first and zero-padded.

use std::io::{self, Cursor, Read, Write};

use crate::error::{HuffmanError, Result};
use crate::hufftree::shape_bit_len;
use crate::metadata::{read_field, Header, Mode, HEADER_LEN};

pub const MIN_LEAVES: usize = 2;
pub const MAX_LEAVES: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    Single {
        symbol: u8,
    },
    General {
        leaf_count: u16,
        tree_shape: Vec<u8>,
        payload_bits: u64,
        payload: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub original_length: u64,
    pub body: Body,
}

impl Container {
    pub fn empty() -> Self {
        Container {
            original_length: 0,
            body: Body::Empty,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.body {
            Body::Empty => Mode::Empty,
            Body::Single { .. } => Mode::SingleSymbol,
            Body::General { .. } => Mode::General,
        }
    }

    fn header(&self) -> Header {
        Header {
            mode: self.mode(),
            original_length: self.original_length,
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.serialize())
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.serialized_len());
        bytes.extend_from_slice(&self.header().to_bytes());

        match &self.body {
            Body::Empty => {}
            Body::Single { symbol } => bytes.push(*symbol),
            Body::General {
                leaf_count,
                tree_shape,
                payload_bits,
                payload,
            } => {
                bytes.extend_from_slice(&leaf_count.to_le_bytes());
                bytes.extend_from_slice(tree_shape);
                bytes.extend_from_slice(&payload_bits.to_le_bytes());
                bytes.extend_from_slice(payload);
            }
        }

        bytes
    }

    pub fn serialized_len(&self) -> usize {
        HEADER_LEN
            + match &self.body {
                Body::Empty => 0,
                Body::Single { .. } => 1,
                Body::General {
                    tree_shape,
                    payload,
                    ..
                } => 2 + tree_shape.len() + 8 + payload.len(),
            }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::deserialize(&bytes)
    }

    /// Parses exactly one container occupying all of `bytes`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = Header::read_from(&mut cursor)?;
        let original_length = header.original_length;

        let body = match header.mode {
            Mode::Empty => {
                if original_length != 0 {
                    return Err(HuffmanError::format(format!(
                        "empty container declares {original_length} bytes"
                    )));
                }
                Body::Empty
            }
            Mode::SingleSymbol => {
                if original_length == 0 {
                    return Err(HuffmanError::format(
                        "single-symbol container declares zero bytes",
                    ));
                }
                let [symbol]: [u8; 1] = read_field(&mut cursor, "symbol")?;
                Body::Single { symbol }
            }
            Mode::General => {
                if original_length == 0 {
                    return Err(HuffmanError::format("general container declares zero bytes"));
                }
                let leaf_count = u16::from_le_bytes(read_field(&mut cursor, "leaf count")?);
                if !(MIN_LEAVES..=MAX_LEAVES).contains(&(leaf_count as usize)) {
                    return Err(HuffmanError::format(format!(
                        "leaf count {leaf_count} outside {MIN_LEAVES}..={MAX_LEAVES}"
                    )));
                }

                let shape_len = shape_bit_len(leaf_count as usize).div_ceil(8);
                let tree_shape = take(&mut cursor, shape_len).ok_or_else(|| {
                    HuffmanError::format("container ends inside tree description")
                })?;

                let payload_bits =
                    u64::from_le_bytes(read_field(&mut cursor, "payload bit count")?);
                let payload_len = usize::try_from(payload_bits.div_ceil(8)).map_err(|_| {
                    HuffmanError::format(format!("payload of {payload_bits} bits is too large"))
                })?;
                let payload = take(&mut cursor, payload_len).ok_or_else(|| {
                    HuffmanError::corrupt(format!(
                        "payload declares {payload_bits} bits but only {} bytes follow",
                        remaining(&cursor)
                    ))
                })?;

                Body::General {
                    leaf_count,
                    tree_shape,
                    payload_bits,
                    payload,
                }
            }
        };

        let trailing = remaining(&cursor);
        if trailing != 0 {
            return Err(HuffmanError::format(format!(
                "{trailing} unexpected bytes after container"
            )));
        }

        Ok(Container {
            original_length,
            body,
        })
    }
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len() - cursor.position() as usize
}

fn take(cursor: &mut Cursor<&[u8]>, n: usize) -> Option<Vec<u8>> {
    let start = cursor.position() as usize;
    let slice = cursor.get_ref().get(start..start.checked_add(n)?)?;
    cursor.set_position((start + n) as u64);
    Some(slice.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general() -> Container {
        Container {
            original_length: 3,
            body: Body::General {
                leaf_count: 2,
                // shape for two leaves is 19 bits
                tree_shape: vec![0b0110_0001, 0b0101_1000, 0b1000_0000],
                payload_bits: 3,
                payload: vec![0b0100_0000],
            },
        }
    }

    #[test]
    fn test_empty_layout() {
        let bytes = Container::empty().serialize();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(Container::deserialize(&bytes).unwrap(), Container::empty());
    }

    #[test]
    fn test_single_layout() {
        let container = Container {
            original_length: 4,
            body: Body::Single { symbol: b'a' },
        };
        let bytes = container.serialize();
        assert_eq!(bytes.len(), HEADER_LEN + 1);
        assert_eq!(*bytes.last().unwrap(), b'a');
        assert_eq!(container.mode(), Mode::SingleSymbol);
        assert_eq!(Container::deserialize(&bytes).unwrap(), container);
    }

    #[test]
    fn test_general_layout() {
        let container = general();
        let bytes = container.serialize();
        assert_eq!(bytes.len(), HEADER_LEN + 2 + 3 + 8 + 1);
        assert_eq!(Container::deserialize(&bytes).unwrap(), container);
    }

    #[test]
    fn test_writer_matches_serialize() {
        for container in [Container::empty(), general()] {
            let mut written = Vec::new();
            container.write_to(&mut written).unwrap();
            assert_eq!(written, container.serialize());
            assert_eq!(written.len(), container.serialized_len());
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = general().serialize();
        bytes.push(0);
        assert!(Container::deserialize(&bytes).unwrap_err().is_format());
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let mut bytes = general().serialize();
        bytes.pop();
        assert!(Container::deserialize(&bytes).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_truncated_tree_is_format_error() {
        let bytes = general().serialize();
        let err = Container::deserialize(&bytes[..HEADER_LEN + 3]).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_mode_length_mismatch() {
        let mut bytes = Container {
            original_length: 5,
            body: Body::Empty,
        }
        .serialize();
        assert!(Container::deserialize(&bytes).unwrap_err().is_format());

        bytes = Container {
            original_length: 0,
            body: Body::Single { symbol: 1 },
        }
        .serialize();
        assert!(Container::deserialize(&bytes).unwrap_err().is_format());
    }

    #[test]
    fn test_leaf_count_bounds() {
        let mut bytes = general().serialize();
        bytes[HEADER_LEN] = 1;
        assert!(Container::deserialize(&bytes).unwrap_err().is_format());

        bytes[HEADER_LEN] = 0x01;
        bytes[HEADER_LEN + 1] = 0x01;
        assert!(Container::deserialize(&bytes).unwrap_err().is_format());
    }
}
