use thiserror::Error;

/// Everything that can go wrong while compressing or decompressing a combyte stream.
#[derive(Error, Debug)]
pub enum CombyteError {
    /// A header, payload or run ended before the length it declared.
    #[error("truncated stream: {0}")]
    TruncatedStream(&'static str),

    /// The stored primary index does not address a row of the block.
    #[error("invalid primary index {index} for a block of {len} bytes")]
    InvalidPrimaryIndex { index: i64, len: usize },

    /// A block header declared a negative payload length.
    #[error("invalid payload length {0}")]
    InvalidPayloadLength(i32),

    /// Compression level of zero, or one whose block size overflows the format.
    #[error("invalid compression level {0}")]
    InvalidLevel(usize),

    /// The worker pool could not be started or lost a block.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CombyteError>;
