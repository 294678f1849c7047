//! Cooperative stream-processing blocks over file descriptors
//!
//! This library provides the leaf blocks of a signal-processing flow graph:
//! blocks that move fixed-size elements between bounded pipe buffers and
//! byte streams, plus two simple transforms.
//!
//! # Architecture
//!
//! - **Buffers**: `PipeBuf` is a bounded single-writer, multi-reader FIFO
//! - **Blocks**: every block implements `ProcessNode`; one `work()` call does
//!   a bounded amount of non-blocking progress and reports how many elements
//!   it moved
//! - **Scheduler**: a single-threaded round-robin driver calling `work()` on
//!   every block until the graph stops making progress
//!
//! Wiring is manual: create the buffers, then hand them to the block
//! constructors.
//!
//! # Example
//!
//! ```no_run
//! use fdblocks::{Decimator, FileReader, FileWriter, PipeBuf, Scheduler};
//!
//! let raw = PipeBuf::<f32>::new("raw", 4096);
//! let thinned = PipeBuf::<f32>::new("thinned", 1024);
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add_process(FileReader::new(std::fs::File::open("capture.f32")?, &raw));
//! scheduler.add_process(Decimator::new(4, &raw, &thinned)?);
//! scheduler.add_process(FileWriter::new(&thinned, std::io::stdout()));
//! let stats = scheduler.run()?;
//! println!("{} passes", stats.passes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use thiserror::Error;

pub mod nodes;
pub mod runtime;
pub mod template;

// Re-export blocks
pub use nodes::{
    CarrayPrinter, Decimator, FilePrinter, FileReader, FileWriter, ItemCounter, LINE_CAPACITY,
};

// Re-export runtime components
pub use runtime::{
    Complex, FatalError, PipeBuf, PipeReader, PipeWriter, ProcessNode, RunStats, Scalar,
    Scheduler, StopReason, WorkError, WorkResult,
};

pub use template::{FormatArg, Template, TemplateError};

/// Errors raised while constructing a block
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format template: {0}")]
    Template(#[from] TemplateError),

    #[error("Invalid decimation stride: {0}")]
    InvalidStride(usize),

    #[error("Output stream unavailable: {0}")]
    OutputUnavailable(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BlockError>;
