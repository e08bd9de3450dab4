//! Static Huffman compression of single files.
//!
//! ```no_run
//! use huffpress::{compress, decompress, CodecOptions};
//! use std::path::Path;
//!
//! let options = CodecOptions::default();
//! let report = compress(Path::new("notes.txt"), Path::new("."), &options)?;
//! println!("{report}");
//! decompress(&report.output, Path::new("restored"), &options)?;
//! # Ok::<(), huffpress::Error>(())
//! ```

pub mod bitstream;
pub mod codes;
pub mod config;
pub mod engine;
pub mod error;
pub mod header;
pub mod naming;
pub mod report;
pub mod tree;

mod heap;

pub use codes::{CodeTable, SymbolRow};
pub use config::{CodecOptions, Config};
pub use engine::{compress, decompress};
pub use error::{Error, Result};
pub use header::{Header, HeaderInfo};
pub use report::{CompressionReport, DecompressionReport};
pub use tree::{FrequencyTable, HuffmanTree, Node, NodeKind};
