//! Compression and decompression over bit-stream ports.
//!
//! A compressed stream is the 32-bit [`HUFF_TREE`] magic number, the serialized tree,
//! then the code of every input byte followed by the code of the end-of-stream symbol,
//! zero-padded to a whole byte.
use crate::bitio::{BitInput, BitOutput, MemoryBitInput, MemoryBitOutput};
use crate::config::DebugLevel;
use crate::error::{Error, Result};
use crate::header::{read_tree, write_tree};
use crate::tree::{Code, HuffNode, Weights, PSEUDO_EOF};

pub const BITS_PER_WORD: u32 = 8;
pub const BITS_PER_INT: u32 = 32;

/// Base magic number of the format family.
pub const HUFF_NUMBER: u32 = 0xFACE_8200;

/// Magic number of streams whose header is a serialized tree.
pub const HUFF_TREE: u32 = HUFF_NUMBER | 1;

/// Bits consumed from the input and produced on the output by one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub bits_read: u64,
    pub bits_written: u64,
}

/// Counts every 8-bit field of `input` until it runs out.
///
/// The input is left at its end; rewind it before reading it again.
///
/// # Errors
///
/// Returns an error if the input port fails.
pub fn count_weights(input: &mut impl BitInput) -> Result<Weights> {
    let mut weights = Weights::new();
    while let Some(value) = input.read_bits(BITS_PER_WORD)? {
        weights.record(value as u8);
    }
    Ok(weights)
}

/// Compresses `input` into `output` without diagnostics. See [`compress_with`].
pub fn compress(input: &mut impl BitInput, output: &mut impl BitOutput) -> Result<Summary> {
    compress_with(input, output, DebugLevel::Off)
}

/// Compresses `input` into `output`, then closes `output`.
///
/// The input is read twice: once to count weights and, after a rewind, once to encode.
///
/// # Arguments
///
/// * `input` - The bits to compress, positioned at the start.
///
/// * `output` - Receives the compressed stream.
///
/// * `debug` - How much to log; the output is the same at every level.
///
/// # Errors
///
/// Returns an error if either port fails, or [`Error::MissingCode`] if the input
/// yields a byte on the second pass that it did not yield on the first.
pub fn compress_with(
    input: &mut impl BitInput,
    output: &mut impl BitOutput,
    debug: DebugLevel,
) -> Result<Summary> {
    let weights = count_weights(input)?;
    let root = HuffNode::build(&weights);
    let table = root.code_table();

    if debug >= DebugLevel::High {
        for (symbol, code) in table.iter() {
            log::debug!("symbol {:3} weight {:10} code {}", symbol, weights.get(symbol), code);
        }
    }

    output.write_bits(BITS_PER_INT, HUFF_TREE)?;
    write_tree(&root, output)?;
    let header_bits = output.bits_written();

    input.rewind()?;
    while let Some(value) = input.read_bits(BITS_PER_WORD)? {
        let symbol = value as u16;
        let code = table.get(symbol).ok_or(Error::MissingCode(symbol))?;
        write_code(code, output)?;
    }
    let eof = table.get(PSEUDO_EOF).ok_or(Error::MissingCode(PSEUDO_EOF))?;
    write_code(eof, output)?;

    let summary = Summary {
        bits_read: input.bits_read(),
        bits_written: output.bits_written(),
    };
    output.close()?;

    if debug >= DebugLevel::Low {
        log::info!(
            "compressed: {} leaves, {} header bits, {} bits read, {} bits written",
            root.leaf_count(),
            header_bits,
            summary.bits_read,
            summary.bits_written
        );
    }

    Ok(summary)
}

fn write_code(code: &Code, output: &mut impl BitOutput) -> Result<()> {
    for (width, value) in code.fields() {
        output.write_bits(width, value)?;
    }
    Ok(())
}

/// Decompresses `input` into `output` without diagnostics. See [`decompress_with`].
pub fn decompress(input: &mut impl BitInput, output: &mut impl BitOutput) -> Result<Summary> {
    decompress_with(input, output, DebugLevel::Off)
}

/// Decompresses `input` into `output`, then closes `output`.
///
/// Bytes decoded before an error have already been written; callers should discard
/// the output when this returns an error.
///
/// # Errors
///
/// * [`Error::InvalidMagic`] if the stream does not start with [`HUFF_TREE`]
///
/// * [`Error::MalformedHeader`] if the stream is too short for a magic number or the
///   tree cannot be read
///
/// * [`Error::TruncatedPayload`] if the input ends before the end-of-stream symbol
///
/// * Any error from either port
pub fn decompress_with(
    input: &mut impl BitInput,
    output: &mut impl BitOutput,
    debug: DebugLevel,
) -> Result<Summary> {
    match input.read_bits(BITS_PER_INT)? {
        Some(HUFF_TREE) => {}
        Some(magic) => return Err(Error::InvalidMagic(magic)),
        None => return Err(Error::MalformedHeader("stream ended before the magic number".into())),
    }

    let root = read_tree(input)?;
    let header_bits = input.bits_read();
    let mut decoder = Decoder::new(&root);
    let mut symbols = 0u64;

    loop {
        let bit = input.read_bits(1)?.ok_or(Error::TruncatedPayload)?;
        match decoder.step(bit) {
            Step::Pending => {}
            Step::Emit(byte) => {
                if debug >= DebugLevel::High {
                    log::trace!("decoded {:#04x}", byte);
                }
                output.write_bits(BITS_PER_WORD, u32::from(byte))?;
                symbols += 1;
            }
            Step::Halt => break,
        }
    }

    let summary = Summary {
        bits_read: input.bits_read(),
        bits_written: output.bits_written(),
    };
    output.close()?;

    if debug >= DebugLevel::Low {
        log::info!(
            "decompressed: {} leaves, {} header bits, {} bytes, {} bits read, {} bits written",
            root.leaf_count(),
            header_bits,
            symbols,
            summary.bits_read,
            summary.bits_written
        );
    }

    Ok(summary)
}

/// Outcome of feeding one payload bit to a [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Still inside the tree.
    Pending,
    /// Reached a byte leaf; traversal restarts at the root.
    Emit(u8),
    /// Reached the end-of-stream leaf.
    Halt,
}

/// Walks the tree one payload bit at a time. `current` is always an internal node.
struct Decoder<'t> {
    root: &'t HuffNode,
    current: &'t HuffNode,
}

impl<'t> Decoder<'t> {
    fn new(root: &'t HuffNode) -> Decoder<'t> {
        Decoder {
            root,
            current: root,
        }
    }

    fn step(&mut self, bit: u32) -> Step {
        let current: &'t HuffNode = self.current;
        let next = match current {
            HuffNode::Internal { left, right, .. } => {
                if bit == 0 {
                    left.as_ref()
                } else {
                    right.as_ref()
                }
            }
            HuffNode::Leaf { .. } => unreachable!("decoder never rests on a leaf"),
        };

        match next {
            HuffNode::Leaf { symbol, .. } if *symbol == PSEUDO_EOF => Step::Halt,
            HuffNode::Leaf { symbol, .. } => {
                self.current = self.root;
                Step::Emit(*symbol as u8)
            }
            HuffNode::Internal { .. } => {
                self.current = next;
                Step::Pending
            }
        }
    }
}

/// Compresses a byte slice in memory.
pub fn compress_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut input = MemoryBitInput::new(bytes);
    let mut output = MemoryBitOutput::new();
    compress(&mut input, &mut output)?;
    Ok(output.into_bytes())
}

/// Decompresses a byte slice in memory.
pub fn decompress_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut input = MemoryBitInput::new(bytes);
    let mut output = MemoryBitOutput::new();
    decompress(&mut input, &mut output)?;
    Ok(output.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_text() {
        let text = b"she sells sea shells by the sea shore";
        let packed = compress_bytes(text).unwrap();
        assert_eq!(decompress_bytes(&packed).unwrap(), text);
    }

    #[test]
    fn test_magic_comes_first() {
        let packed = compress_bytes(b"x").unwrap();
        assert_eq!(&packed[..4], &HUFF_TREE.to_be_bytes());
        assert_eq!(HUFF_TREE, 0xFACE_8201);
    }

    #[test]
    fn test_empty_input_layout() {
        // magic, 0, 1 000000000, 1 100000000, then the one-bit end code "1"
        let mut input = MemoryBitInput::new(&[]);
        let mut output = MemoryBitOutput::new();
        let summary = compress(&mut input, &mut output).unwrap();

        assert_eq!(summary.bits_read, 0);
        assert_eq!(summary.bits_written, 32 + 21 + 1);

        let packed = output.into_bytes();
        assert_eq!(packed.len(), 7);
        assert!(decompress_bytes(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_single_symbol_shrinks() {
        let input = vec![0x41u8; 1000];
        let packed = compress_bytes(&input).unwrap();

        // one bit per byte plus the end code, after a 53-bit prefix
        assert_eq!(packed.len(), (32 + 21 + 1000 + 1 + 7) / 8);
        assert!(packed.len() * 8 < input.len() * 8);
        assert_eq!(decompress_bytes(&packed).unwrap(), input);
    }

    #[test]
    fn test_count_weights() {
        let mut input = MemoryBitInput::new(b"aab");
        let weights = count_weights(&mut input).unwrap();
        assert_eq!(weights.get(b'a' as u16), 2);
        assert_eq!(weights.get(b'b' as u16), 1);
        assert_eq!(weights.get(PSEUDO_EOF), 1);
        assert_eq!(input.read_bits(8).unwrap(), None);
    }

    #[test]
    fn test_bad_magic() {
        let mut packed = compress_bytes(b"payload").unwrap();
        packed[0] ^= 0x01;
        let err = decompress_bytes(&packed).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic(0xFBCE_8201)));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_short_stream_is_format_error() {
        let err = decompress_bytes(&[0xFA, 0xCE]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_truncated_payload() {
        // magic and a two-leaf header, padded with zeros instead of a payload
        let mut output = MemoryBitOutput::new();
        output.write_bits(BITS_PER_INT, HUFF_TREE).unwrap();
        let root = HuffNode::combine(HuffNode::leaf(b'A' as u16, 0), HuffNode::leaf(PSEUDO_EOF, 0));
        write_tree(&root, &mut output).unwrap();
        while output.bits_written() % 8 != 0 {
            output.write_bits(1, 0).unwrap();
        }
        output.close().unwrap();
        let mut bytes = output.into_bytes();

        // Zero bits decode as 'A', never the end leaf, so the stream runs dry.
        let err = decompress_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::TruncatedPayload));

        bytes.truncate(6);
        assert!(decompress_bytes(&bytes).is_err());
    }

    #[test]
    fn test_cut_payload_fails() {
        let text: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let packed = compress_bytes(&text).unwrap();
        let err = decompress_bytes(&packed[..packed.len() - 64]).unwrap_err();
        assert!(matches!(err, Error::TruncatedPayload));
    }

    #[test]
    fn test_debug_level_does_not_change_output() {
        let text = b"debug output must not leak into the stream";
        let mut outputs = Vec::new();
        for level in [DebugLevel::Off, DebugLevel::Low, DebugLevel::High] {
            let mut input = MemoryBitInput::new(text);
            let mut output = MemoryBitOutput::new();
            compress_with(&mut input, &mut output, level).unwrap();
            outputs.push(output.into_bytes());
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[1], outputs[2]);
    }

    #[test]
    fn test_decoder_steps() {
        let root = HuffNode::build(&Weights::from_bytes(b"abc"));
        let mut decoder = Decoder::new(&root);

        // a = 00, c = 10, end = 11
        assert_eq!(decoder.step(0), Step::Pending);
        assert_eq!(decoder.step(0), Step::Emit(b'a'));
        assert_eq!(decoder.step(1), Step::Pending);
        assert_eq!(decoder.step(0), Step::Emit(b'c'));
        assert_eq!(decoder.step(1), Step::Pending);
        assert_eq!(decoder.step(1), Step::Halt);
    }
}
