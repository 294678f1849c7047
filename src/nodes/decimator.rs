//! Keep-one-in-d decimation

use crate::runtime::node::{ProcessNode, WorkResult};
use crate::runtime::pipebuf::{PipeBuf, PipeReader, PipeWriter};
use crate::{BlockError, Result};
use tracing::trace;

/// Forwards every `d`-th element and discards the ones in between.
///
/// Only whole groups of `d` input elements are consumed; a trailing partial
/// group stays in the input buffer for the next call. `d = 1` forwards
/// everything unchanged.
pub struct Decimator<T> {
    name: String,
    stride: usize,
    input: PipeReader<T>,
    output: PipeWriter<T>,
}

impl<T: Copy> Decimator<T> {
    /// Create a decimator keeping one element out of every `stride`.
    /// Fails with `BlockError::InvalidStride` for a zero stride.
    pub fn new(stride: usize, input: &PipeBuf<T>, output: &PipeBuf<T>) -> Result<Self> {
        if stride == 0 {
            return Err(BlockError::InvalidStride(stride));
        }
        Ok(Self {
            name: "decimator".to_string(),
            stride,
            input: input.reader(),
            output: output.writer(),
        })
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl<T: Copy> ProcessNode for Decimator<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn work(&mut self) -> WorkResult<usize> {
        let count = (self.input.readable() / self.stride).min(self.output.writable());
        if count == 0 {
            return Ok(0);
        }

        {
            let src = self.input.rd();
            let mut dst = self.output.wr();
            for (slot, &value) in dst[..count]
                .iter_mut()
                .zip(src.iter().step_by(self.stride))
            {
                *slot = value;
            }
        }

        self.input.read(count * self.stride);
        self.output.written(count);
        trace!("[{}] kept {} of {} elements", self.name, count, count * self.stride);
        Ok(count)
    }
}
