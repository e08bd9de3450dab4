use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Extension given to compressed files.
pub const COMPRESSED_EXTENSION: &str = "huff";

/// Inserts `(n)` before the last `.` of the file name, or appends it when the
/// name has no `.`.
pub fn numbered(candidate: &Path, n: u32) -> PathBuf {
    let name = candidate
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let numbered = match name.rfind('.') {
        Some(dot) => format!("{}({n}){}", &name[..dot], &name[dot..]),
        None => format!("{name}({n})"),
    };
    candidate.with_file_name(numbered)
}

/// Creates a new file at the first free name among `candidate`,
/// `numbered(candidate, 1)`, `numbered(candidate, 2)`, ... Never truncates an
/// existing file.
pub fn create_unique(candidate: &Path) -> io::Result<(PathBuf, File)> {
    let mut path = candidate.to_path_buf();
    let mut n = 0;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n += 1;
                path = numbered(candidate, n);
            }
            Err(e) => return Err(e),
        }
    }
}

/// `<dir>/<stem of input>.huff`
pub fn compressed_name(input: &Path, dir: &Path) -> PathBuf {
    dir.join(format!("{}.{COMPRESSED_EXTENSION}", stem(input)))
}

/// `<dir>/<stem of input>.<extension>`, or just the stem when the extension
/// is empty.
pub fn decompressed_name(input: &Path, dir: &Path, extension: &str) -> PathBuf {
    let stem = stem(input);
    if extension.is_empty() {
        dir.join(stem)
    } else {
        dir.join(format!("{stem}.{extension}"))
    }
}

/// Text after the last `.` of the file name, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
