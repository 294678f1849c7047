//! Error types for the runtime system

use std::io;

/// Fatal condition raised by a block's `work()`.
///
/// There is no block-local recovery: a scheduler that receives one of these
/// stops the whole run.
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("broken pipe: write accepted 0 of {attempted} bytes")]
    BrokenPipe { attempted: usize },

    #[error("rewind to start failed: {0}")]
    Seek(#[source] io::Error),

    #[error("partial element: {bytes} bytes is not a multiple of the {element_size}-byte element")]
    PartialElement { bytes: usize, element_size: usize },

    #[error("formatted text of {len} bytes does not fit the {capacity}-byte line buffer")]
    FormatOverflow { len: usize, capacity: usize },

    #[error("partial write: {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },

    #[error("looping source is empty: end of stream again right after rewinding")]
    EmptyLoop,
}

/// Result type for work functions
pub type WorkResult<T = ()> = Result<T, WorkError>;

/// A [`WorkError`] tagged with the block that raised it
#[derive(Debug, thiserror::Error)]
#[error("[{node}] {source}")]
pub struct FatalError {
    pub node: String,
    #[source]
    pub source: WorkError,
}

impl FatalError {
    pub fn new(node: impl Into<String>, source: WorkError) -> Self {
        Self {
            node: node.into(),
            source,
        }
    }
}
