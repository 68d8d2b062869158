//! Error types for compressing and decompressing Huffman streams.

use thiserror::Error;

/// Error variants produced by the codec and its bit-stream ports.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream does not start with the tree-header magic number.
    #[error("invalid magic number {0:#010x}")]
    InvalidMagic(u32),

    /// The serialized tree could not be read back.
    #[error("malformed tree header: {0}")]
    MalformedHeader(String),

    /// The payload ran out before the end-of-stream symbol was decoded.
    #[error("truncated stream, missing end marker")]
    TruncatedPayload,

    /// A symbol appeared on the second pass over the input that the first pass never saw.
    #[error("no code for symbol {0}, input changed while compressing")]
    MissingCode(u16),

    /// A field width outside 1..=32 bits was requested.
    #[error("invalid bit width {0}")]
    InvalidWidth(u32),

    /// A value does not fit in the requested number of bits.
    #[error("value {value} does not fit in {width} bits")]
    ValueOutOfRange { width: u32, value: u32 },

    /// The output port was written to after being closed.
    #[error("write after close")]
    Closed,

    /// An I/O error from the underlying resource.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for errors caused by a stream that is not a valid compressed file.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::InvalidMagic(_) | Error::MalformedHeader(_))
    }
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
