//! Payload bit packing.
//!
//! Codes are packed MSB first. The stream always ends with a final data byte
//! followed by a pad-count byte saying how many low bits of that final byte
//! are padding (0-7). The writer holds back the last complete byte so the
//! final data byte always carries at least one real bit.

use bitvec::prelude::*;
use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node, NodeKind};

pub struct BitWriter<W> {
    inner: W,
    pending: BitVec<u8, Msb0>,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: BitVec::new(),
            bytes_written: 0,
        }
    }

    /// Appends `code` and flushes every complete byte except the newest.
    pub fn write_code(&mut self, code: &BitSlice<u8, Msb0>) -> io::Result<()> {
        self.pending.extend_from_bitslice(code);
        if self.pending.len() <= 8 {
            return Ok(());
        }

        // keep between 1 and 8 bits back
        let flush = (self.pending.len() - 1) / 8;
        let tail = self.pending.split_off(flush * 8);
        self.inner.write_all(self.pending.as_raw_slice())?;
        self.bytes_written += flush as u64;
        self.pending = tail;
        Ok(())
    }

    /// Writes the final data byte and the pad-count byte, returning the inner
    /// writer and the number of payload bytes written in total.
    pub fn finish(mut self) -> Result<(W, u64)> {
        if self.pending.is_empty() {
            return Err(Error::EmptyInput { path: None });
        }
        let pad = 8 - self.pending.len();
        self.pending.resize(8, false);
        self.pending.force_align();

        self.inner.write_all(self.pending.as_raw_slice())?;
        self.inner.write_all(&[pad as u8])?;
        self.bytes_written += 2;
        Ok((self.inner, self.bytes_written))
    }
}

/// Yields payload bits in chunks, dropping the padding named by the trailer.
pub struct BitReader<R> {
    inner: R,
    buf: Vec<u8>,
    out: Vec<u8>,
    tail: Vec<u8>,
    done: bool,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R, buffer_size: usize) -> Self {
        Self {
            inner,
            buf: vec![0u8; buffer_size.max(1)],
            out: Vec::new(),
            tail: Vec::with_capacity(2),
            done: false,
        }
    }

    /// Returns the next run of real payload bits, or `None` once the trailer
    /// has been consumed.
    pub fn next_bits(&mut self) -> Result<Option<&BitSlice<u8, Msb0>>> {
        loop {
            if self.done {
                return Ok(None);
            }

            let n = match self.inner.read(&mut self.buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                self.done = true;
                let [final_byte, pad] = self.tail[..] else {
                    return Err(Error::CorruptPayload(
                        "missing final data byte and pad count".into(),
                    ));
                };
                if pad > 7 {
                    return Err(Error::CorruptPayload(format!(
                        "pad count {pad} is larger than 7"
                    )));
                }
                self.out.clear();
                self.out.push(final_byte);
                let real = 8 - pad as usize;
                return Ok(Some(&self.out.view_bits::<Msb0>()[..real]));
            }

            self.out.clear();
            self.out.append(&mut self.tail);
            self.out.extend_from_slice(&self.buf[..n]);
            let keep = self.out.len().saturating_sub(2);
            self.tail = self.out.split_off(keep);
            if !self.out.is_empty() {
                return Ok(Some(self.out.view_bits::<Msb0>()));
            }
        }
    }
}

/// Walks a tree one bit at a time, emitting a symbol at every leaf.
pub struct TreeWalker<'a> {
    root: &'a Node,
    current: &'a Node,
}

impl<'a> TreeWalker<'a> {
    pub fn new(tree: &'a HuffmanTree) -> Self {
        Self {
            root: tree.root(),
            current: tree.root(),
        }
    }

    /// `false` goes left, `true` goes right. A tree that is a lone leaf emits
    /// its symbol for every bit.
    pub fn step(&mut self, bit: bool) -> Option<u8> {
        match self.current.kind() {
            NodeKind::Leaf(symbol) => Some(*symbol),
            NodeKind::Internal { left, right } => {
                let next: &'a Node = if bit { right } else { left };
                match next.kind() {
                    NodeKind::Leaf(symbol) => {
                        self.current = self.root;
                        Some(*symbol)
                    }
                    NodeKind::Internal { .. } => {
                        self.current = next;
                        None
                    }
                }
            }
        }
    }

    /// True when no code is partially consumed.
    pub fn at_root(&self) -> bool {
        std::ptr::eq(self.current, self.root)
    }
}

/// Decodes a payload stream through `tree` into `writer`, returning the number
/// of bytes produced.
pub fn decode<R: Read, W: Write>(
    tree: &HuffmanTree,
    reader: R,
    writer: &mut W,
    buffer_size: usize,
) -> Result<u64> {
    let mut bits = BitReader::new(reader, buffer_size);
    let mut walker = TreeWalker::new(tree);
    let mut out = Vec::with_capacity(buffer_size.max(1));
    let mut produced = 0u64;

    while let Some(chunk) = bits.next_bits()? {
        for bit in chunk.iter().by_vals() {
            if let Some(symbol) = walker.step(bit) {
                out.push(symbol);
            }
        }
        produced += out.len() as u64;
        writer.write_all(&out)?;
        out.clear();
    }

    if !walker.at_root() {
        return Err(Error::CorruptPayload(
            "payload ends in the middle of a code".into(),
        ));
    }
    Ok(produced)
}
