//! Transform emitting how many elements each invocation found readable

use crate::runtime::element::Scalar;
use crate::runtime::node::{ProcessNode, WorkResult};
use crate::runtime::pipebuf::{PipeBuf, PipeReader, PipeWriter};
use tracing::trace;

/// Counts the readable input elements and emits the count as one output element.
///
/// The count is per invocation, not a running total. Input values are ignored
/// and the whole readable window is discarded. Counts larger than `Tout` can
/// hold saturate at its maximum.
pub struct ItemCounter<Tin, Tout> {
    name: String,
    input: PipeReader<Tin>,
    output: PipeWriter<Tout>,
}

impl<Tin: Copy, Tout: Scalar> ItemCounter<Tin, Tout> {
    pub fn new(input: &PipeBuf<Tin>, output: &PipeBuf<Tout>) -> Self {
        Self {
            name: "itemcounter".to_string(),
            input: input.reader(),
            output: output.writer(),
        }
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<Tin: Copy, Tout: Scalar> ProcessNode for ItemCounter<Tin, Tout> {
    fn name(&self) -> &str {
        &self.name
    }

    fn work(&mut self) -> WorkResult<usize> {
        if self.output.writable() < 1 {
            return Ok(0);
        }
        let count = self.input.readable();
        if count < 1 {
            return Ok(0);
        }

        self.output.wr()[0] = Tout::from_count(count);
        self.input.read(count);
        self.output.written(1);
        trace!("[{}] counted {} elements", self.name, count);
        Ok(count)
    }
}
