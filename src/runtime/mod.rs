//! Runtime support for cooperative block execution

#[cfg(unix)]
pub mod descriptor;
pub mod element;
pub mod errors;
pub mod node;
pub mod pipebuf;
pub mod scheduler;

pub use element::{Complex, Scalar};
pub use errors::{FatalError, WorkError, WorkResult};
pub use node::ProcessNode;
pub use pipebuf::{PipeBuf, PipeReader, PipeWriter};
pub use scheduler::{RunStats, Scheduler, StopReason};
