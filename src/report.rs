//! What a finished run hands to the display surface.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::codes::SymbolRow;
use crate::header::HeaderInfo;

#[derive(Debug, Clone, Serialize)]
pub struct CompressionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub size_before: u64,
    pub size_after: u64,
    pub symbols: Vec<SymbolRow>,
    pub header: HeaderInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecompressionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub size_before: u64,
    pub size_after: u64,
    pub symbols: Vec<SymbolRow>,
    pub header: HeaderInfo,
}

impl CompressionReport {
    /// Compressed size as a percentage of the original.
    pub fn ratio(&self) -> f64 {
        percentage(self.size_after, self.size_before)
    }
}

impl DecompressionReport {
    /// Compressed size as a percentage of the restored file.
    pub fn ratio(&self) -> f64 {
        percentage(self.size_before, self.size_after)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Printable form of a byte: the character itself, or an escape.
pub fn display_symbol(symbol: u8) -> String {
    match symbol {
        b' ' => "' '".to_string(),
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        b'\t' => "\\t".to_string(),
        s if s.is_ascii_graphic() => (s as char).to_string(),
        s => format!("\\x{s:02x}"),
    }
}

fn write_symbols(f: &mut fmt::Formatter<'_>, rows: &[SymbolRow], with_frequency: bool) -> fmt::Result {
    if with_frequency {
        writeln!(f, "{:>5}  {:<6}  {:>12}  {:>6}  code", "byte", "char", "frequency", "length")?;
    } else {
        writeln!(f, "{:>5}  {:<6}  {:>6}  code", "byte", "char", "length")?;
    }
    for row in rows {
        let ch = display_symbol(row.symbol);
        if with_frequency {
            writeln!(
                f,
                "{:>5}  {:<6}  {:>12}  {:>6}  {}",
                row.symbol, ch, row.frequency, row.length, row.code
            )?;
        } else {
            writeln!(f, "{:>5}  {:<6}  {:>6}  {}", row.symbol, ch, row.length, row.code)?;
        }
    }
    Ok(())
}

fn write_header(f: &mut fmt::Formatter<'_>, header: &HeaderInfo) -> fmt::Result {
    writeln!(f, "extension length: {} bytes", header.extension.len())?;
    writeln!(f, "extension:        .{}", header.extension)?;
    writeln!(f, "header length:    {} bits", header.header_bit_length)?;
    writeln!(f, "header:           {}", header.tree_bits)
}

fn write_sizes(f: &mut fmt::Formatter<'_>, before: u64, after: u64, ratio: f64) -> fmt::Result {
    writeln!(f, "size before: {before} bytes")?;
    writeln!(f, "size after:  {after} bytes")?;
    if ratio > 100.0 {
        writeln!(f, "compression rate: more than 100% ({ratio:.4}%)")
    } else {
        writeln!(f, "compression rate: {ratio:.4}%")
    }
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbols(f, &self.symbols, true)?;
        writeln!(f)?;
        write_header(f, &self.header)?;
        writeln!(f)?;
        writeln!(f, "output:      {}", self.output.display())?;
        write_sizes(f, self.size_before, self.size_after, self.ratio())
    }
}

impl fmt::Display for DecompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbols(f, &self.symbols, false)?;
        writeln!(f)?;
        write_header(f, &self.header)?;
        writeln!(f)?;
        writeln!(f, "output:      {}", self.output.display())?;
        write_sizes(f, self.size_before, self.size_after, self.ratio())
    }
}
