//! Compressed-file header: the original file extension followed by the tree
//! shape.
//!
//! ```text
//! u8          extension length
//! [u8]        extension (ASCII)
//! u32 BE      tree bit length, not counting padding
//! [u8]        post-order tree bits, zero padded to a byte boundary
//! ```
//!
//! In the tree bits a leaf is `1` followed by its 8-bit symbol and an
//! internal node is a lone `0` emitted after both of its children.

use bitvec::prelude::*;
use log::debug;
use serde::Serialize;
use std::io::{self, Read, Write};

use crate::codes::bits_to_string;
use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node, NodeKind, ALPHABET_SIZE};

/// Upper bound on tree bits: 9 per leaf plus 1 per internal node.
const MAX_TREE_BITS: u32 = (ALPHABET_SIZE as u32) * 9 + (ALPHABET_SIZE as u32 - 1);

/// Characters that would let an extension leave the output directory.
const FORBIDDEN_EXTENSION_CHARS: [char; 3] = ['/', '\\', '\0'];

fn forbidden_char(extension: &str) -> Option<char> {
    extension.chars().find(|c| FORBIDDEN_EXTENSION_CHARS.contains(c))
}

#[derive(Debug, Clone)]
pub struct Header {
    extension: String,
    tree: HuffmanTree,
}

/// What a header looked like on disk, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    pub extension: String,
    pub header_bit_length: u32,
    pub tree_bits: String,
    pub encoded_len: u64,
}

impl Header {
    pub fn new(extension: impl Into<String>, tree: HuffmanTree) -> Result<Self> {
        let extension = extension.into();
        if !extension.is_ascii() {
            return Err(Error::InvalidExtension(format!(
                "{extension:?} is not ASCII"
            )));
        }
        if extension.len() > u8::MAX as usize {
            return Err(Error::InvalidExtension(format!(
                "{} bytes is longer than {}",
                extension.len(),
                u8::MAX
            )));
        }
        if let Some(c) = forbidden_char(&extension) {
            return Err(Error::InvalidExtension(format!(
                "{extension:?} contains {c:?}"
            )));
        }
        Ok(Self { extension, tree })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn into_tree(self) -> HuffmanTree {
        self.tree
    }

    /// Post-order tree bits, without padding.
    pub fn tree_bits(&self) -> BitVec<u8, Msb0> {
        fn serialize(node: &Node, bits: &mut BitVec<u8, Msb0>) {
            match node.kind() {
                NodeKind::Leaf(symbol) => {
                    bits.push(true);
                    bits.extend_from_bitslice(symbol.view_bits::<Msb0>());
                }
                NodeKind::Internal { left, right } => {
                    serialize(left, bits);
                    serialize(right, bits);
                    bits.push(false);
                }
            }
        }

        let mut bits = BitVec::new();
        serialize(self.tree.root(), &mut bits);
        bits
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<HeaderInfo> {
        let mut bits = self.tree_bits();
        let header_bit_length = bits.len() as u32;
        let tree_bits = bits_to_string(&bits);
        while bits.len() % 8 != 0 {
            bits.push(false);
        }

        writer.write_all(&[self.extension.len() as u8])?;
        writer.write_all(self.extension.as_bytes())?;
        writer.write_all(&header_bit_length.to_be_bytes())?;
        writer.write_all(bits.as_raw_slice())?;

        let encoded_len = (1 + self.extension.len() + 4 + bits.len() / 8) as u64;
        debug!(
            "wrote header: extension {:?}, {} tree bits, {} bytes",
            self.extension, header_bit_length, encoded_len
        );

        Ok(HeaderInfo {
            extension: self.extension.clone(),
            header_bit_length,
            tree_bits,
            encoded_len,
        })
    }

    /// Reads a header and rebuilds its tree. Leaves the reader positioned at
    /// the first payload byte.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<(Self, HeaderInfo)> {
        let mut ext_len = [0u8; 1];
        read_exact(reader, &mut ext_len, "extension length")?;

        let mut ext = vec![0u8; ext_len[0] as usize];
        read_exact(reader, &mut ext, "extension")?;
        if !ext.is_ascii() {
            return Err(Error::CorruptHeader("extension is not ASCII".into()));
        }
        let extension: String = ext.iter().map(|&b| b as char).collect();
        if let Some(c) = forbidden_char(&extension) {
            return Err(Error::CorruptHeader(format!(
                "extension {extension:?} contains {c:?}"
            )));
        }

        let mut len_bytes = [0u8; 4];
        read_exact(reader, &mut len_bytes, "header bit length")?;
        let header_bit_length = u32::from_be_bytes(len_bytes);
        if header_bit_length > MAX_TREE_BITS {
            return Err(Error::CorruptHeader(format!(
                "header bit length {header_bit_length} exceeds {MAX_TREE_BITS}"
            )));
        }

        let mut raw = vec![0u8; (header_bit_length as usize).div_ceil(8)];
        read_exact(reader, &mut raw, "tree")?;
        let encoded_len = (1 + ext.len() + 4 + raw.len()) as u64;

        let bits = BitVec::<u8, Msb0>::from_vec(raw);
        let bits = &bits[..header_bit_length as usize];
        let root = rebuild(bits)?;
        let tree = HuffmanTree::from_root(root);
        debug!(
            "read header: extension {:?}, {} tree bits, {} leaves",
            extension,
            header_bit_length,
            tree.leaf_count()
        );

        let info = HeaderInfo {
            extension: extension.clone(),
            header_bit_length,
            tree_bits: bits_to_string(bits),
            encoded_len,
        };
        Ok((Self { extension, tree }, info))
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::CorruptHeader(format!("truncated {what}")),
        _ => Error::Io(e),
    })
}

/// Rebuilds a tree from post-order bits with an explicit stack. Leaves carry
/// frequency 0 since the header only records shape.
fn rebuild(bits: &BitSlice<u8, Msb0>) -> Result<Node> {
    let mut stack: Vec<Node> = Vec::new();
    let mut seen: BitVec = bitvec![0; ALPHABET_SIZE];
    let mut i = 0;

    while i < bits.len() {
        if bits[i] {
            let end = i + 9;
            if end > bits.len() {
                return Err(Error::CorruptHeader(format!(
                    "leaf at bit {i} runs past the end of the tree"
                )));
            }
            let symbol = bits[i + 1..end]
                .iter()
                .by_vals()
                .fold(0u8, |acc, b| (acc << 1) | b as u8);
            if seen[symbol as usize] {
                return Err(Error::CorruptHeader(format!(
                    "symbol {symbol:#04x} appears twice"
                )));
            }
            seen.set(symbol as usize, true);
            stack.push(Node::leaf(symbol, 0));
            i = end;
        } else {
            let underflow =
                || Error::CorruptHeader(format!("internal node at bit {i} has fewer than two children"));
            let right = stack.pop().ok_or_else(underflow)?;
            let left = stack.pop().ok_or_else(underflow)?;
            stack.push(Node::from_children(left, right));
            i += 1;
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        (None, _) => Err(Error::CorruptHeader("tree is empty".into())),
        (Some(_), false) => Err(Error::CorruptHeader(format!(
            "{} subtrees left after reading the tree",
            stack.len() + 1
        ))),
    }
}
