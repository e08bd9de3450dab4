use bitvec::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::tree::{HuffmanTree, Node, NodeKind};

pub type Code = BitBox<u8, Msb0>;

#[derive(Debug, Clone)]
struct Entry {
    code: Code,
    frequency: u64,
}

/// Symbol to code mapping derived from a tree.
#[derive(Debug, Clone)]
pub struct CodeTable {
    entries: BTreeMap<u8, Entry>,
}

/// One line of the symbol table shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRow {
    pub symbol: u8,
    pub frequency: u64,
    pub code: String,
    pub length: usize,
}

impl CodeTable {
    /// Walks the tree depth first, appending `0` for a left edge and `1` for a
    /// right edge. A tree that is a lone leaf gets the one-bit code `1`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        fn traverse(node: &Node, prefix: &mut BitVec<u8, Msb0>, entries: &mut BTreeMap<u8, Entry>) {
            match node.kind() {
                NodeKind::Leaf(symbol) => {
                    entries.insert(
                        *symbol,
                        Entry {
                            code: prefix.clone().into_boxed_bitslice(),
                            frequency: node.frequency(),
                        },
                    );
                }
                NodeKind::Internal { left, right } => {
                    prefix.push(false);
                    traverse(left, prefix, entries);
                    prefix.pop();

                    prefix.push(true);
                    traverse(right, prefix, entries);
                    prefix.pop();
                }
            }
        }

        let mut prefix = BitVec::new();
        if tree.is_single_symbol() {
            prefix.push(true);
        }

        let mut entries = BTreeMap::new();
        traverse(tree.root(), &mut prefix, &mut entries);

        Self { entries }
    }

    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.entries.get(&symbol).map(|e| e.code.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> + '_ {
        self.entries.iter().map(|(&s, e)| (s, e.code.as_bitslice()))
    }

    /// Total number of payload bits the given frequencies encode to.
    pub fn encoded_bits(&self) -> u64 {
        self.entries
            .values()
            .map(|e| e.frequency * e.code.len() as u64)
            .sum()
    }

    pub fn rows(&self) -> Vec<SymbolRow> {
        self.entries
            .iter()
            .map(|(&symbol, e)| SymbolRow {
                symbol,
                frequency: e.frequency,
                code: bits_to_string(&e.code),
                length: e.code.len(),
            })
            .collect()
    }
}

pub fn bits_to_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|b| if b { '1' } else { '0' })
        .collect()
}
