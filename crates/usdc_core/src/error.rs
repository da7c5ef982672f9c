//! Error types shared by every stage of the crate reader.

use thiserror::Error;

use crate::bootstrap::Version;

/// Errors that can occur while reading a crate container.
#[derive(Error, Debug)]
pub enum CrateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Truncated input: {len} bytes is too short")]
    TruncatedInput { len: u64 },

    #[error("Read at offset {offset} is outside the source (length {len})")]
    OutOfBounds { offset: u64, len: u64 },

    #[error("Not a crate file: bad magic header")]
    BadMagic,

    #[error("Unsupported crate version {0}")]
    UnsupportedVersion(Version),

    #[error("Invalid TOC offset {offset} (file size {len})")]
    InvalidTocOffset { offset: i64, len: u64 },

    #[error("Too many TOC sections: {count} (limit {limit})")]
    TooManySections { count: u64, limit: u64 },

    #[error("Invalid section {index}: {reason}")]
    InvalidSection { index: usize, reason: String },

    #[error("Missing `{0}` section")]
    MissingSection(&'static str),

    #[error("`TOKENS` section corrupted: {0}")]
    CorruptTokens(String),

    #[error("`STRINGS` section corrupted: {0}")]
    CorruptStrings(String),

    #[error("Decompression failed: {0}")]
    Decompression(String),
}

/// Result type for crate reading operations.
pub type CrateResult<T> = Result<T, CrateError>;
