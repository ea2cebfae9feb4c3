use std::io::{self, Read, Write};

use crate::error::{HuffmanError, Result};

pub const MAGIC: [u8; 4] = *b"HUFF";
pub const FORMAT_VERSION: u8 = 1;
/// Magic, version, mode flag and the u64 original length.
pub const HEADER_LEN: usize = 4 + 1 + 1 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Empty,
    SingleSymbol,
    General,
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> u8 {
        match mode {
            Mode::Empty => 0,
            Mode::SingleSymbol => 1,
            Mode::General => 2,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = HuffmanError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Mode::Empty),
            1 => Ok(Mode::SingleSymbol),
            2 => Ok(Mode::General),
            b => Err(HuffmanError::format(format!("unknown mode flag {b}"))),
        }
    }
}

/// Fixed-size prefix of every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub mode: Mode,
    pub original_length: u64,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&MAGIC);
        bytes[4] = FORMAT_VERSION;
        bytes[5] = self.mode.into();
        bytes[6..].copy_from_slice(&self.original_length.to_le_bytes());
        bytes
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Header> {
        let magic: [u8; 4] = read_field(reader, "magic tag")?;
        if magic != MAGIC {
            return Err(HuffmanError::format(format!(
                "bad magic tag {magic:02x?}, expected {MAGIC:02x?}"
            )));
        }

        let [version, mode]: [u8; 2] = read_field(reader, "version and mode")?;
        if version != FORMAT_VERSION {
            return Err(HuffmanError::format(format!(
                "unsupported format version {version}"
            )));
        }
        let mode = Mode::try_from(mode)?;

        let original_length = u64::from_le_bytes(read_field(reader, "original length")?);

        Ok(Header {
            mode,
            original_length,
        })
    }
}

/// Reads a fixed-width field; a short read is a format error naming the
/// field, anything else stays an I/O error.
pub fn read_field<R: Read, const N: usize>(reader: &mut R, field: &str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(buf),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(HuffmanError::format(format!("container ends before {field}")))
        }
        Err(e) => Err(e.into()),
    }
}
