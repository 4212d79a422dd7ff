//! Error type shared by every decoding stage.

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::compression::CompressionType;

#[derive(Debug, Error)]
pub enum Error {
    /// The dataset file could not be opened.
    #[error("cannot open {path:?}: {source}")]
    FileNotFound {
        path: PathBuf,
        source: io::Error,
    },

    /// The stream is not framed the way the declared compression says, or the
    /// decompressor rejected it mid-stream.
    #[error("{compression} decompression failed for {path:?}: {source}")]
    Decompression {
        path: PathBuf,
        compression: CompressionType,
        source: io::Error,
    },

    #[error("malformed header in {path:?}: {reason}")]
    MalformedHeader {
        path: PathBuf,
        reason: String,
    },

    /// Fewer bytes than one record remained in the stream. `index` is the
    /// record number since the last restart, counted across files.
    #[error("record {index} of {path:?} is truncated: expected {expected} bytes, got {actual}")]
    TruncatedRecord {
        path: PathBuf,
        index: u64,
        expected: usize,
        actual: usize,
    },

    #[error("unknown compression type {0:?}")]
    UnknownCompression(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Paired image and label streams ended at different indices.
    #[error("image and label streams diverge at record {index}")]
    LengthMismatch { index: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
