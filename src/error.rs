use thiserror::Error;

/// Failures surfaced by encoding and decoding.
///
/// None of these are retried internally: they come from unreadable streams
/// or malformed containers, never from transient conditions.
#[derive(Error, Debug)]
pub enum HuffmanError {
    /// The underlying stream could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not in this format, or its header/tree description
    /// is structurally malformed.
    #[error("invalid container format: {0}")]
    Format(String),

    /// The payload ends before the declared length, or its bits do not
    /// decode cleanly against the embedded tree.
    #[error("corrupt payload: {0}")]
    CorruptData(String),

    #[error("byte {0:#04x} has no code in this table")]
    UnknownSymbol(u8),

    /// Explicit symbol counts sum past `u64::MAX`.
    #[error("symbol counts overflow a 64-bit total")]
    CountOverflow,
}

impl HuffmanError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        HuffmanError::Format(message.into())
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        HuffmanError::CorruptData(message.into())
    }

    pub fn is_format(&self) -> bool {
        matches!(self, HuffmanError::Format(_))
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, HuffmanError::CorruptData(_))
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
