//! Serialization of the Huffman tree that precedes the payload.
//!
//! The tree is written in pre-order: an internal node is a single 0 bit followed by
//! its left and right subtrees, a leaf is a single 1 bit followed by its symbol as a
//! 9-bit field. The encoding is self-delimiting, so no length is stored.
use crate::bitio::{BitInput, BitOutput};
use crate::error::{Error, Result};
use crate::tree::{HuffNode, PSEUDO_EOF};

/// Width of a leaf symbol, wide enough for the end-of-stream symbol.
pub const SYMBOL_BITS: u32 = 8 + 1;

/// Deepest nesting a tree over 257 symbols can have.
pub const MAX_DEPTH: usize = PSEUDO_EOF as usize;

/// Writes `node` and everything below it.
///
/// # Errors
///
/// Returns an error if the output port fails.
pub fn write_tree(node: &HuffNode, out: &mut impl BitOutput) -> Result<()> {
    match node {
        HuffNode::Internal { left, right, .. } => {
            out.write_bits(1, 0)?;
            write_tree(left, out)?;
            write_tree(right, out)
        }
        HuffNode::Leaf { symbol, .. } => {
            out.write_bits(1, 1)?;
            out.write_bits(SYMBOL_BITS, u32::from(*symbol))
        }
    }
}

/// Reads a tree written by [`write_tree`]. The returned nodes all weigh zero.
///
/// # Errors
///
/// Returns [`Error::MalformedHeader`] if the input ends inside the tree, a leaf carries
/// a symbol outside the alphabet, the nesting exceeds what 257 symbols allow, or the
/// root is a lone leaf.
pub fn read_tree(input: &mut impl BitInput) -> Result<HuffNode> {
    let root = read_node(input, 0)?;
    if root.is_leaf() {
        return Err(Error::MalformedHeader("root is a leaf".into()));
    }
    Ok(root)
}

fn read_node(input: &mut impl BitInput, depth: usize) -> Result<HuffNode> {
    if depth > MAX_DEPTH {
        return Err(Error::MalformedHeader(format!(
            "tree deeper than {} levels",
            MAX_DEPTH
        )));
    }

    match input.read_bits(1)? {
        None => Err(Error::MalformedHeader("stream ended inside the tree".into())),
        Some(0) => {
            let left = read_node(input, depth + 1)?;
            let right = read_node(input, depth + 1)?;
            Ok(HuffNode::combine(left, right))
        }
        Some(_) => match input.read_bits(SYMBOL_BITS)? {
            None => Err(Error::MalformedHeader("stream ended inside a leaf".into())),
            Some(symbol) if symbol > u32::from(PSEUDO_EOF) => Err(Error::MalformedHeader(
                format!("leaf symbol {} out of range", symbol),
            )),
            Some(symbol) => Ok(HuffNode::leaf(symbol as u16, 0)),
        },
    }
}
