//! Huffman tree construction and code derivation.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Number of literal byte values.
pub const ALPH_SIZE: usize = 1 << 8;

/// The end-of-stream symbol, one past the last byte value.
pub const PSEUDO_EOF: u16 = ALPH_SIZE as u16;

/// Number of symbols in the alphabet, bytes plus the end-of-stream symbol.
pub const SYMBOL_COUNT: usize = ALPH_SIZE + 1;

/// Occurrence counts for every symbol of the alphabet.
///
/// The end-of-stream symbol always has a weight of at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weights {
    counts: [u64; SYMBOL_COUNT],
}

impl Weights {
    /// Creates a table where only the end-of-stream symbol has been seen, once.
    pub fn new() -> Weights {
        let mut counts = [0; SYMBOL_COUNT];
        counts[PSEUDO_EOF as usize] = 1;
        Weights { counts }
    }

    /// Builds a table from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Weights {
        let mut weights = Weights::new();
        for &byte in bytes {
            weights.record(byte);
        }
        weights
    }

    /// Counts one more occurrence of `byte`.
    pub fn record(&mut self, byte: u8) {
        self.counts[byte as usize] += 1;
    }

    pub fn get(&self, symbol: u16) -> u64 {
        self.counts.get(symbol as usize).copied().unwrap_or(0)
    }

    /// Iterates `(symbol, weight)` over symbols with a non-zero weight, in symbol order.
    pub fn present(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u16, count))
    }
}

impl Default for Weights {
    fn default() -> Self {
        Weights::new()
    }
}

/// A variable-length code, stored as its length and its bits read most-significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub bits: u128,
    pub len: u32,
}

impl Code {
    const ROOT: Code = Code { bits: 0, len: 0 };

    fn child(self, bit: u128) -> Code {
        Code {
            bits: (self.bits << 1) | bit,
            len: self.len + 1,
        }
    }

    /// Returns true if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }

    /// Splits the code into `(width, value)` fields of at most 32 bits, in write order.
    pub fn fields(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let mut remaining = self.len;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let width = remaining.min(32);
            remaining -= width;
            let value = (self.bits >> remaining) & ((1u128 << width) - 1);
            Some((width, value as u32))
        })
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shift in (0..self.len).rev() {
            write!(f, "{}", (self.bits >> shift) & 1)?;
        }
        Ok(())
    }
}

/// Symbol to code mapping, indexed by symbol.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    pub fn get(&self, symbol: u16) -> Option<&Code> {
        self.codes.get(symbol as usize).and_then(Option::as_ref)
    }

    /// Iterates `(symbol, code)` in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as u16, code)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node in a Huffman tree. Each internal node owns exactly two children.
///
/// Weights only matter while the tree is being built; trees read back from a
/// header carry zero weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: u16,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: u16, weight: u64) -> HuffNode {
        HuffNode::Leaf { symbol, weight }
    }

    /// Combines two nodes into an internal node weighing their sum.
    pub fn combine(left: HuffNode, right: HuffNode) -> HuffNode {
        HuffNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } | HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// Builds a Huffman tree by repeatedly combining the two lightest nodes until one
    /// remains.
    ///
    /// Ties are broken by age: leaves enter the queue in symbol order, and every
    /// combined node is younger than all nodes created before it. The first node taken
    /// becomes the left child.
    ///
    /// # Arguments
    ///
    /// * `weights` - The symbol weights; every symbol with a non-zero weight gets a leaf.
    ///
    /// # Returns
    ///
    /// The root of the tree. Because the end-of-stream symbol is always present, a table
    /// with a single byte value still yields a tree with two leaves.
    pub fn build(weights: &Weights) -> HuffNode {
        let mut queue = BinaryHeap::new();
        let mut sequence = 0;

        for (symbol, weight) in weights.present() {
            queue.push(Queued::new(HuffNode::leaf(symbol, weight), &mut sequence));
        }

        // Empty input leaves the end-of-stream symbol alone; give it a zero-weight
        // sibling so that it still has a one-bit code.
        if queue.len() == 1 {
            queue.push(Queued::new(HuffNode::leaf(0, 0), &mut sequence));
        }

        while queue.len() > 1 {
            if let (Some(left), Some(right)) = (queue.pop(), queue.pop()) {
                let node = HuffNode::combine(left.node, right.node);
                queue.push(Queued::new(node, &mut sequence));
            }
        }

        queue
            .pop()
            .map(|queued| queued.node)
            .expect("weights always include the end-of-stream symbol")
    }

    /// Derives the code of every leaf, appending 0 for each left branch and 1 for
    /// each right branch on the way down from this node.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = vec![None; SYMBOL_COUNT];
        self.gather_codes(Code::ROOT, &mut codes);
        CodeTable { codes }
    }

    fn gather_codes(&self, code: Code, codes: &mut [Option<Code>]) {
        match self {
            HuffNode::Leaf { symbol, .. } => {
                if let Some(slot) = codes.get_mut(*symbol as usize) {
                    *slot = Some(code);
                }
            }
            HuffNode::Internal { left, right, .. } => {
                left.gather_codes(code.child(0), codes);
                right.gather_codes(code.child(1), codes);
            }
        }
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Returns the same tree with every weight set to zero.
    pub fn shape(&self) -> HuffNode {
        match self {
            HuffNode::Leaf { symbol, .. } => HuffNode::leaf(*symbol, 0),
            HuffNode::Internal { left, right, .. } => HuffNode::Internal {
                weight: 0,
                left: Box::new(left.shape()),
                right: Box::new(right.shape()),
            },
        }
    }
}

/// A node waiting in the build queue, ordered lightest and then oldest first.
struct Queued {
    weight: u64,
    sequence: usize,
    node: HuffNode,
}

impl Queued {
    fn new(node: HuffNode, sequence: &mut usize) -> Queued {
        let queued = Queued {
            weight: node.weight(),
            sequence: *sequence,
            node,
        };
        *sequence += 1;
        queued
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so compare in reverse.
        (other.weight, other.sequence).cmp(&(self.weight, self.sequence))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}
