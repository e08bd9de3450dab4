use std::fs;
use std::path::{Path, PathBuf};

use huffpress::{compress, decompress, CodecOptions, Error};
use tempfile::{tempdir, TempDir};

fn round_trip(name: &str, data: &[u8], options: &CodecOptions) -> (Vec<u8>, PathBuf) {
    let src = tempdir().unwrap();
    let packed = tempdir().unwrap();
    let restored = tempdir().unwrap();

    let input = src.path().join(name);
    fs::write(&input, data).unwrap();

    let report = compress(&input, packed.path(), options).unwrap();
    assert_eq!(report.size_before, data.len() as u64);
    assert_eq!(report.size_after, fs::metadata(&report.output).unwrap().len());

    let back = decompress(&report.output, restored.path(), options).unwrap();
    assert_eq!(back.size_after, data.len() as u64);
    let name = back.output.file_name().unwrap().into();
    (fs::read(&back.output).unwrap(), name)
}

fn lcg_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            // skew towards low values so the tree is lopsided
            let v = (state >> 16) as u8;
            v / (1 + (v % 5))
        })
        .collect()
}

#[test]
fn text_round_trip() {
    let text = b"It was the best of times, it was the worst of times, it was the age of wisdom.";
    let (out, name) = round_trip("tale.txt", text, &CodecOptions::default());
    assert_eq!(out, text);
    assert_eq!(name, PathBuf::from("tale.txt"));
}

#[test]
fn aaab() {
    let (out, _) = round_trip("aaab.txt", b"AAAB", &CodecOptions::default());
    assert_eq!(out, b"AAAB");
}

#[test]
fn single_byte_file() {
    let (out, _) = round_trip("one.bin", b"x", &CodecOptions::default());
    assert_eq!(out, b"x");
}

#[test]
fn single_symbol_uses_one_bit_per_byte() {
    let src = tempdir().unwrap();
    let input = src.path().join("zeros.dat");
    let data = vec![0u8; 1000];
    fs::write(&input, &data).unwrap();

    let report = compress(&input, src.path(), &CodecOptions::default()).unwrap();
    assert_eq!(report.symbols.len(), 1);
    assert_eq!(report.symbols[0].length, 1);
    assert_eq!(report.symbols[0].frequency, 1000);

    // 1000 bits = 125 bytes, the last of which is the final data byte
    let payload_len = report.size_after - report.header.encoded_len;
    assert_eq!(payload_len, 125 + 1);

    let out = tempdir().unwrap();
    let back = decompress(&report.output, out.path(), &CodecOptions::default()).unwrap();
    assert_eq!(fs::read(&back.output).unwrap(), data);
}

#[test]
fn every_byte_value() {
    let data: Vec<u8> = (0..=255u8).cycle().take(256 * 3 + 17).collect();
    let (out, _) = round_trip("all.bin", &data, &CodecOptions::default());
    assert_eq!(out, data);
}

#[test]
fn skewed_binary_with_small_buffers() {
    let data = lcg_bytes(20_000, 7);
    for buffer_size in [1, 3, 64, 8192] {
        let (out, _) = round_trip("noise.bin", &data, &CodecOptions { buffer_size });
        assert_eq!(out, data);
    }
}

#[test]
fn payload_always_ends_with_final_byte_and_pad_count() {
    let src = tempdir().unwrap();
    // two symbols with one-bit codes: n bytes encode to n bits
    for n in 1..=24usize {
        let data: Vec<u8> = (0..n).map(|i| if i % 2 == 0 { b'a' } else { b'b' }).collect();
        let input = src.path().join(format!("bits{n}.txt"));
        fs::write(&input, &data).unwrap();

        let report = compress(&input, src.path(), &CodecOptions::default()).unwrap();
        let bytes = fs::read(&report.output).unwrap();
        let payload = &bytes[report.header.encoded_len as usize..];
        let bits = if n == 1 { 1 } else { n };

        assert_eq!(payload.len(), bits.div_ceil(8) + 1, "n = {n}");
        assert_eq!(*payload.last().unwrap() as usize, (8 - bits % 8) % 8, "n = {n}");
    }
}

#[test]
fn empty_file_is_rejected() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let input = src.path().join("empty.txt");
    fs::write(&input, b"").unwrap();

    match compress(&input, out.path(), &CodecOptions::default()) {
        Err(Error::EmptyInput { path: Some(path) }) => assert_eq!(path, input),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = compress(&dir.path().join("ghost.txt"), dir.path(), &CodecOptions::default()).unwrap_err();
    match err {
        Error::MissingFile { path, .. } => assert!(path.ends_with("ghost.txt")),
        other => panic!("unexpected error: {other}"),
    }
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn corrupt_header_is_rejected_before_output() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();

    // extension "txt", 10 header bits: a leaf followed by a merge with nothing to merge
    let mut bytes = vec![3, b't', b'x', b't'];
    bytes.extend_from_slice(&10u32.to_be_bytes());
    bytes.extend_from_slice(&[0b1010_0000, 0b1000_0000, 0x00, 0x01]);
    let input = write_file(&dir, "bad.huff", &bytes);

    let err = decompress(&input, out.path(), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader(_)));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);

    let input = write_file(&dir, "empty.huff", b"");
    let err = decompress(&input, out.path(), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader(_)));
}

#[test]
fn outputs_never_overwrite() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let input = src.path().join("log.txt");
    fs::write(&input, b"hello hello").unwrap();

    let names: Vec<PathBuf> = (0..3)
        .map(|_| compress(&input, out.path(), &CodecOptions::default()).unwrap().output)
        .collect();
    let names: Vec<&Path> = names.iter().map(|p| Path::new(p.file_name().unwrap())).collect();
    assert_eq!(
        names,
        vec![Path::new("log.huff"), Path::new("log(1).huff"), Path::new("log(2).huff")]
    );

    fs::write(out.path().join("log.txt"), b"keep me").unwrap();
    let back = decompress(&out.path().join("log.huff"), out.path(), &CodecOptions::default()).unwrap();
    assert_eq!(back.output, out.path().join("log(1).txt"));
    assert_eq!(fs::read(out.path().join("log.txt")).unwrap(), b"keep me");
    assert_eq!(fs::read(&back.output).unwrap(), b"hello hello");
}

#[test]
fn file_without_extension() {
    let (out, name) = round_trip("Makefile", b"all:\n\tcc -o app main.c\n", &CodecOptions::default());
    assert_eq!(out, b"all:\n\tcc -o app main.c\n");
    assert_eq!(name, PathBuf::from("Makefile"));
}

#[test]
fn decompression_report_regenerates_codes() {
    let src = tempdir().unwrap();
    let input = src.path().join("codes.txt");
    fs::write(&input, b"abracadabra").unwrap();

    let packed = compress(&input, src.path(), &CodecOptions::default()).unwrap();
    let out = tempdir().unwrap();
    let back = decompress(&packed.output, out.path(), &CodecOptions::default()).unwrap();

    let codes = |rows: &[huffpress::SymbolRow]| -> Vec<(u8, String)> {
        rows.iter().map(|r| (r.symbol, r.code.clone())).collect()
    };
    assert_eq!(codes(&packed.symbols), codes(&back.symbols));
    assert!(back.symbols.iter().all(|r| r.frequency == 0));
    assert_eq!(packed.header, back.header);
}

#[test]
fn header_extension_cannot_escape_output_dir() {
    let src = tempdir().unwrap();
    let root = tempdir().unwrap();
    let out = root.path().join("out");
    fs::create_dir_all(out.join("evil.x")).unwrap();

    let input = src.path().join("evil.txt");
    fs::write(&input, b"payload payload").unwrap();
    let packed = compress(&input, src.path(), &CodecOptions::default()).unwrap();

    // swap the stored "txt" for a traversal
    let ext = b"x/../../escaped";
    let original = fs::read(&packed.output).unwrap();
    let mut crafted = vec![ext.len() as u8];
    crafted.extend_from_slice(ext);
    crafted.extend_from_slice(&original[4..]);
    let evil = write_file(&src, "evil.huff", &crafted);

    let err = decompress(&evil, &out, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader(_)));
    assert!(!root.path().join("escaped").exists());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}
