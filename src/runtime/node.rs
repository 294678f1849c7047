//! Node trait for cooperative stream processing
//!
//! Defines the ProcessNode trait that all blocks implement.
//! Blocks make bounded progress each time the scheduler calls work().

// Re-export error types so blocks only need this module
pub use super::errors::{WorkError, WorkResult};

/// A unit of stream-processing work driven by an external scheduler
/// - Sources have no input buffer and one output buffer
/// - Sinks and printers have one input buffer and write to a descriptor
/// - Transforms have one input buffer and one output buffer
///
/// Buffers are bound at construction and never reassigned.
pub trait ProcessNode {
    /// Get a debug name for this node
    fn name(&self) -> &str;

    /// Returns true once the node is permanently idle and will never make
    /// progress again (e.g. a non-looping source after end of stream).
    fn should_stop(&self) -> bool {
        false
    }

    /// Do one bounded, non-blocking unit of work using only the data and
    /// capacity currently available.
    ///
    /// Returns Ok(n) where n is the number of elements moved (committed by
    /// sources and transforms, consumed by sinks). Ok(0) means no progress.
    /// Any Err is fatal for the whole run.
    fn work(&mut self) -> WorkResult<usize>;
}
