//! # Huffproc
//!
//! `huffproc` Library module, a lossless Huffman compressor whose output carries the
//! coding tree itself as its header.
//!
//! ## Usage
//!
//! ```rust
//! let packed = huffproc::compress_bytes(b"abracadabra").unwrap();
//! assert_eq!(huffproc::decompress_bytes(&packed).unwrap(), b"abracadabra");
//! ```
//!
//! Streams are processed through [`BitInput`] and [`BitOutput`] ports, so the same
//! [`compress`] and [`decompress`] functions work on files and in memory.

/// Bit-level input and output ports
pub mod bitio;

/// Configuration module for the huffproc cli tool
mod config;

mod error;

/// Tree header serialization
pub mod header;

/// File-level huff and puff
mod huffman_utils;

/// Compression and decompression
mod processor;

/// Tree building and code tables
pub mod tree;

pub use bitio::{BitInput, BitInputStream, BitOutput, BitOutputStream, MemoryBitInput, MemoryBitOutput};
pub use config::{Command, Config, DebugLevel};
pub use error::{Error, Result};
pub use huffman_utils::{huff, huff_path, puff, puff_path};
pub use processor::{
    compress, compress_bytes, compress_with, count_weights, decompress, decompress_bytes,
    decompress_with, Summary, BITS_PER_INT, BITS_PER_WORD, HUFF_NUMBER, HUFF_TREE,
};
pub use tree::{Code, CodeTable, HuffNode, Weights, ALPH_SIZE, PSEUDO_EOF};

/// Runs the huffproc cli tool with the provided configuration
///
/// # Arguments
///
/// * `config` - The configuration for the huffproc cli tool
///
/// # Returns
///
/// A Result containing the bits read and written if successful, or an error if not
pub fn run(config: Config) -> Result<Summary> {
    match &config.cmd {
        Command::Huff { file_path, output } => huff(file_path, output.as_deref(), config.debug),
        Command::Puff { file_path, output } => puff(file_path, output.as_deref(), config.debug),
    }
}
