//! Text sink rendering each element through a printf-style template

use crate::runtime::element::Scalar;
use crate::runtime::node::{ProcessNode, WorkError, WorkResult};
use crate::runtime::pipebuf::{PipeBuf, PipeReader};
use crate::template::Template;
use crate::Result;
use std::io::Write;
use tracing::trace;

/// Size of the per-element line buffer. A rendered line must leave one byte
/// spare, so the longest accepted line is `LINE_CAPACITY - 1` bytes.
pub const LINE_CAPACITY: usize = 256;

/// Sink node printing one formatted line per element
///
/// Every readable element is scaled, rendered through the template and
/// written with its own `write()` call. The input is only advanced once the
/// whole batch has been written.
///
/// # Fatal conditions
/// - a rendered line does not fit the line buffer (`WorkError::FormatOverflow`)
/// - `write()` accepts fewer bytes than rendered (`WorkError::PartialWrite`)
/// - `write()` fails (`WorkError::Write`)
pub struct FilePrinter<W, T> {
    name: String,
    input: PipeReader<T>,
    output: W,
    format: Template,
    scale: T,
    line: String,
}

impl<W: Write, T: Scalar> FilePrinter<W, T> {
    /// Create a printer. `format` must contain exactly one placeholder.
    pub fn new(format: &str, input: &PipeBuf<T>, output: W) -> Result<Self> {
        let format = Template::with_arity(format, 1)?;
        Ok(Self {
            name: input.name(),
            input: input.reader(),
            output,
            format,
            scale: T::ONE,
            line: String::with_capacity(LINE_CAPACITY),
        })
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With an initial scale factor
    pub fn with_scale(mut self, scale: T) -> Self {
        self.scale = scale;
        self
    }

    /// Current scale factor
    pub fn scale(&self) -> T {
        self.scale
    }

    /// Change the scale factor; applies from the next `work()` call
    pub fn set_scale(&mut self, scale: T) {
        self.scale = scale;
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

impl<W: Write, T: Scalar> ProcessNode for FilePrinter<W, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn work(&mut self) -> WorkResult<usize> {
        let count = {
            let window = self.input.rd();
            for &value in window.iter() {
                self.line.clear();
                self.format
                    .render(&mut self.line, &[value.scale(self.scale).to_arg()]);

                let len = self.line.len();
                if len >= LINE_CAPACITY {
                    return Err(WorkError::FormatOverflow {
                        len,
                        capacity: LINE_CAPACITY,
                    });
                }
                match self.output.write(self.line.as_bytes()) {
                    Ok(written) if written == len => {}
                    Ok(written) => {
                        return Err(WorkError::PartialWrite {
                            written,
                            expected: len,
                        });
                    }
                    Err(e) => return Err(WorkError::Write(e)),
                }
            }
            window.len()
        };

        if count > 0 {
            trace!("[{}] printed {} elements", self.name, count);
            self.input.read(count);
        }
        Ok(count)
    }
}
