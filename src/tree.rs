use derivative::Derivative;
use std::io::{self, Read};

use crate::error::{Error, Result};
use crate::heap::MinHeap;

/// Number of distinct symbols in the byte alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// Heap slots needed to build any tree: every leaf plus every merge.
const HEAP_CAPACITY: usize = ALPHABET_SIZE + (ALPHABET_SIZE - 1);

/// Byte histogram of an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = Self::new();
        table.add(bytes);
        table
    }

    /// Counts every byte of `reader`, reading `buffer_size` bytes at a time.
    pub fn from_reader<R: Read>(mut reader: R, buffer_size: usize) -> io::Result<Self> {
        let mut table = Self::new();
        let mut buf = vec![0u8; buffer_size.max(1)];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            table.add(&buf[..n]);
        }
        Ok(table)
    }

    pub fn add(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.counts[b as usize] += 1;
        }
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Symbols with a nonzero count, in byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(u8),
    Internal { left: Box<Node>, right: Box<Node> },
}

/// Tree node ordered by frequency alone, so it can sit in a min-heap.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
pub struct Node {
    frequency: u64,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    kind: NodeKind,
}

impl Node {
    pub fn leaf(symbol: u8, frequency: u64) -> Self {
        Self {
            frequency,
            kind: NodeKind::Leaf(symbol),
        }
    }

    pub fn from_children(left: Node, right: Node) -> Self {
        Self {
            frequency: left.frequency + right.frequency,
            kind: NodeKind::Internal {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn symbol(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Leaf(s) => Some(s),
            NodeKind::Internal { .. } => None,
        }
    }

    fn leaf_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(_) => 1,
            NodeKind::Internal { left, right } => left.leaf_count() + right.leaf_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lightest nodes. The first
    /// node removed becomes the left child. A single distinct symbol yields a
    /// tree whose root is that leaf.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let mut heap = MinHeap::with_capacity(HEAP_CAPACITY, Node::leaf(0, 0));
        for (symbol, count) in frequencies.iter() {
            heap.insert(Node::leaf(symbol, count));
        }

        while heap.len() > 1 {
            if let (Some(left), Some(right)) = (heap.remove(), heap.remove()) {
                heap.insert(Node::from_children(left, right));
            }
        }

        heap.remove().map(Self::from_root).ok_or(Error::EmptyInput { path: None })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_frequencies(&FrequencyTable::from_bytes(bytes))
    }

    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn is_single_symbol(&self) -> bool {
        self.root.is_leaf()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}
