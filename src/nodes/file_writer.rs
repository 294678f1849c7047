//! Raw sink writing elements from a pipe buffer to a descriptor

use crate::runtime::node::{ProcessNode, WorkError, WorkResult};
use crate::runtime::pipebuf::{PipeBuf, PipeReader};
use bytemuck::Pod;
use std::io::Write;
use std::mem::size_of;
use tracing::trace;

/// Sink node writing raw `T` elements to `W`
///
/// Each `work()` call hands everything currently readable to a single
/// `write()` and consumes the whole elements it accepted.
///
/// # Fatal conditions
/// - `write()` accepts zero bytes: the peer has gone away (`WorkError::BrokenPipe`)
/// - `write()` fails (`WorkError::Write`)
/// - the accepted byte count splits an element (`WorkError::PartialElement`)
pub struct FileWriter<W, T> {
    name: String,
    input: PipeReader<T>,
    output: W,
}

impl<W: Write, T: Pod> FileWriter<W, T> {
    /// Create a sink draining `input` into `output`
    pub fn new(input: &PipeBuf<T>, output: W) -> Self {
        Self {
            name: input.name(),
            input: input.reader(),
            output,
        }
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get a reference to the output
    pub fn get_ref(&self) -> &W {
        &self.output
    }

    /// Give back the output
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write, T: Pod> ProcessNode for FileWriter<W, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn work(&mut self) -> WorkResult<usize> {
        let element_size = size_of::<T>();
        let count = {
            let window = self.input.rd();
            if window.is_empty() {
                return Ok(0);
            }
            let bytes: &[u8] = bytemuck::cast_slice(&window[..]);

            let nw = match self.output.write(bytes) {
                Ok(0) => {
                    return Err(WorkError::BrokenPipe {
                        attempted: bytes.len(),
                    });
                }
                Ok(n) => n,
                Err(e) => return Err(WorkError::Write(e)),
            };
            if nw % element_size != 0 {
                return Err(WorkError::PartialElement {
                    bytes: nw,
                    element_size,
                });
            }
            nw / element_size
        };

        trace!("[{}] wrote {} elements", self.name, count);
        self.input.read(count);
        Ok(count)
    }
}
