//! File-level compression and decompression.
//!
//! Compression makes two linear passes over the input: one to count bytes and
//! one to transcode them. Decompression reads the header in full before it
//! creates any output. Neither pass holds more than one buffer of file data in
//! memory.

use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::bitstream::{self, BitWriter};
use crate::codes::CodeTable;
use crate::config::CodecOptions;
use crate::error::{Error, Result};
use crate::header::{Header, HeaderInfo};
use crate::naming;
use crate::report::{CompressionReport, DecompressionReport};
use crate::tree::{FrequencyTable, HuffmanTree};

/// Compresses `input` into a new `.huff` file under `output_dir`.
///
/// Fails with [`Error::EmptyInput`] before creating anything when `input` has
/// no bytes.
pub fn compress(input: &Path, output_dir: &Path, options: &CodecOptions) -> Result<CompressionReport> {
    let frequencies = FrequencyTable::from_reader(open(input)?, options.buffer_size)?;
    if frequencies.total() == 0 {
        return Err(Error::EmptyInput {
            path: Some(input.to_path_buf()),
        });
    }

    let tree = HuffmanTree::from_frequencies(&frequencies)?;
    let table = CodeTable::from_tree(&tree);
    debug!(
        "{}: {} bytes, {} distinct symbols, {} payload bits",
        input.display(),
        frequencies.total(),
        frequencies.distinct(),
        table.encoded_bits()
    );
    let header = Header::new(naming::extension_of(input), tree)?;

    let (output, file) = naming::create_unique(&naming::compressed_name(input, output_dir))?;
    let (header_info, size_after) = match transcode(input, &header, &table, file, options) {
        Ok(written) => written,
        Err(e) => {
            remove_partial(&output);
            return Err(e);
        }
    };

    let size_before = frequencies.total();
    info!(
        "compressed {} ({} bytes) to {} ({} bytes)",
        input.display(),
        size_before,
        output.display(),
        size_after
    );

    Ok(CompressionReport {
        input: input.to_path_buf(),
        output,
        size_before,
        size_after,
        symbols: table.rows(),
        header: header_info,
    })
}

/// Second pass: header, then every input byte replaced by its code.
fn transcode(
    input: &Path,
    header: &Header,
    table: &CodeTable,
    file: File,
    options: &CodecOptions,
) -> Result<(HeaderInfo, u64)> {
    let mut writer = BufWriter::with_capacity(options.buffer_size, file);
    let header_info = header.write_to(&mut writer)?;

    let mut bits = BitWriter::new(writer);
    let mut reader = open(input)?;
    let mut buf = vec![0u8; options.buffer_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &buf[..n] {
            let code = table.get(byte).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{}: byte {byte:#04x} appeared after counting", input.display()),
                )
            })?;
            bits.write_code(code)?;
        }
    }

    let (mut writer, payload_len) = bits.finish()?;
    writer.flush()?;
    let total = header_info.encoded_len + payload_len;
    Ok((header_info, total))
}

/// Restores the file compressed in `input` under `output_dir`, named after
/// `input` with the extension recorded in its header.
pub fn decompress(input: &Path, output_dir: &Path, options: &CodecOptions) -> Result<DecompressionReport> {
    let file = open(input)?;
    let size_before = file.metadata()?.len();
    let mut reader = BufReader::with_capacity(options.buffer_size.max(1), file);

    let (header, header_info) = Header::read_from(&mut reader)?;
    let table = CodeTable::from_tree(header.tree());

    let candidate = naming::decompressed_name(input, output_dir, header.extension());
    let (output, file) = naming::create_unique(&candidate)?;
    let mut writer = BufWriter::with_capacity(options.buffer_size.max(1), file);

    let decoded = bitstream::decode(header.tree(), &mut reader, &mut writer, options.buffer_size)
        .and_then(|n| {
            writer.flush()?;
            Ok(n)
        });
    let size_after = match decoded {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            remove_partial(&output);
            return Err(e);
        }
    };

    info!(
        "decompressed {} ({} bytes) to {} ({} bytes)",
        input.display(),
        size_before,
        output.display(),
        size_after
    );

    Ok(DecompressionReport {
        input: input.to_path_buf(),
        output,
        size_before,
        size_after,
        symbols: table.rows(),
        header: header_info,
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::MissingFile {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("removed partial output {}", path.display()),
        Err(e) => warn!("could not remove partial output {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options() -> CodecOptions {
        CodecOptions { buffer_size: 5 }
    }

    #[test]
    fn aaab_round_trip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("letters.txt");
        fs::write(&input, b"AAAB").unwrap();

        let report = compress(&input, dir.path(), &options()).unwrap();
        assert_eq!(report.output, dir.path().join("letters.huff"));
        assert_eq!(report.size_before, 4);
        assert_eq!(report.size_after, fs::metadata(&report.output).unwrap().len());
        assert!(report.symbols.iter().all(|r| r.length == 1));

        // header: 1 + 3 + 4 + 3 bytes, payload: one data byte and the pad count
        let bytes = fs::read(&report.output).unwrap();
        assert_eq!(bytes.len(), 11 + 2);
        assert_eq!(bytes[bytes.len() - 1], 4);

        let out_dir = tempdir().unwrap();
        let restored = decompress(&report.output, out_dir.path(), &options()).unwrap();
        assert_eq!(restored.output, out_dir.path().join("letters.txt"));
        assert_eq!(fs::read(&restored.output).unwrap(), b"AAAB");
        assert_eq!(restored.size_after, 4);
        assert_eq!(restored.header.extension, "txt");
    }

    #[test]
    fn empty_input_creates_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        fs::write(&input, b"").unwrap();

        let out_dir = tempdir().unwrap();
        let err = compress(&input, out_dir.path(), &options()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput { path: Some(_) }));
        assert_eq!(err.to_string(), format!("{}: input is empty", input.display()));
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_input() {
        let dir = tempdir().unwrap();
        let err = compress(&dir.path().join("nope.txt"), dir.path(), &options()).unwrap_err();
        assert!(matches!(err, Error::MissingFile { .. }));
        let err = decompress(&dir.path().join("nope.huff"), dir.path(), &options()).unwrap_err();
        assert!(matches!(err, Error::MissingFile { .. }));
    }

    #[test]
    fn corrupt_payload_leaves_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("data.bin");
        fs::write(&input, b"abcdefgh").unwrap();
        let report = compress(&input, dir.path(), &options()).unwrap();

        let mut bytes = fs::read(&report.output).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 9;
        fs::write(&report.output, &bytes).unwrap();

        let out_dir = tempdir().unwrap();
        let err = decompress(&report.output, out_dir.path(), &options()).unwrap_err();
        assert!(matches!(err, Error::CorruptPayload(_)));
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }
}
