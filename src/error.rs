use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by compression and decompression.
#[derive(Debug, Error)]
pub enum Error {
    /// The source has no bytes to compress. `path` is set when the source is
    /// a file.
    #[error("{}input is empty", location(.path))]
    EmptyInput { path: Option<PathBuf> },
    /// The source path is missing or cannot be opened.
    #[error("{}: {}", .path.display(), .source)]
    MissingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The tree header could not be reconstructed.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),
    /// The encoded payload or its trailer is malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),
    /// The file extension cannot be stored in a header.
    #[error("invalid extension: {0}")]
    InvalidExtension(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!("{}: ", path.display()),
        None => String::new(),
    }
}
