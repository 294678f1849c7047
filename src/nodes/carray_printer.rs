//! Text sink printing each batch of complex samples as one array
//!
//! Provides `CarrayPrinter` - a sink that writes everything readable in one
//! invocation as `head`, one `format` rendering per sample, then `tail`, and
//! flushes so the batch is visible downstream as soon as `work()` returns.
//! A typical use is feeding a plotting tool one line per batch:
//!
//! ```text
//! head   = "[%d] "          -> "[3] "
//! format = "%.3f,%.3f "     -> "0.100,-0.200 " (per sample)
//! tail   = "\n"
//! ```

use crate::runtime::element::{Complex, Scalar};
use crate::runtime::node::{ProcessNode, WorkError, WorkResult};
use crate::runtime::pipebuf::{PipeBuf, PipeReader};
use crate::template::{FormatArg, Template};
use crate::Result;
use std::io::{BufWriter, Write};
use tracing::trace;

/// Sink node printing complex batches through a buffered adapter
///
/// The adapter is a `BufWriter` created once at construction over the
/// output. Dropping the printer flushes the adapter and drops `W`; pass a
/// borrowed handle (`&File`, a duplicated descriptor) to keep the underlying
/// descriptor open.
///
/// Templates are checked at construction:
/// - `head`: at most one placeholder, receiving the sample count
/// - `format`: exactly two placeholders, receiving `scale * re` and `scale * im`
/// - `tail`: no placeholders
///
/// Any write or flush failure of the adapter is fatal (`WorkError::Write`).
pub struct CarrayPrinter<W: Write, T> {
    name: String,
    input: PipeReader<Complex<T>>,
    out: BufWriter<W>,
    head: Template,
    format: Template,
    tail: Template,
    scale: T,
    text: String,
}

impl<W: Write, T: Scalar> CarrayPrinter<W, T> {
    /// Create a printer writing through a new buffered adapter over `output`
    pub fn new(
        head: &str,
        format: &str,
        tail: &str,
        input: &PipeBuf<Complex<T>>,
        output: W,
    ) -> Result<Self> {
        let head = Template::with_max_arity(head, 1)?;
        let format = Template::with_arity(format, 2)?;
        let tail = Template::with_arity(tail, 0)?;
        Ok(Self {
            name: input.name(),
            input: input.reader(),
            out: BufWriter::new(output),
            head,
            format,
            tail,
            scale: T::ONE,
            text: String::new(),
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

    /// Get a reference to the output behind the adapter
    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }

    /// Flush the adapter and give back the output
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| crate::BlockError::Io(e.into_error()))
    }

    fn emit(out: &mut BufWriter<W>, text: &str) -> WorkResult {
        out.write_all(text.as_bytes()).map_err(WorkError::Write)
    }
}

#[cfg(unix)]
impl<T: Scalar> CarrayPrinter<std::fs::File, T> {
    /// Create a printer over a borrowed descriptor.
    ///
    /// The descriptor is duplicated, so the printer never closes the
    /// caller's descriptor. Failing to duplicate it is reported here rather
    /// than by discarding output later.
    pub fn from_fd(
        head: &str,
        format: &str,
        tail: &str,
        input: &PipeBuf<Complex<T>>,
        fd: impl std::os::fd::AsFd,
    ) -> Result<Self> {
        let file = crate::runtime::descriptor::borrow_file(fd)
            .map_err(crate::BlockError::OutputUnavailable)?;
        Self::new(head, format, tail, input, file)
    }
}

impl<W: Write, T: Scalar> ProcessNode for CarrayPrinter<W, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn work(&mut self) -> WorkResult<usize> {
        let count = {
            let window = self.input.rd();
            let count = window.len();
            if count == 0 {
                return Ok(0);
            }

            self.text.clear();
            self.head
                .render(&mut self.text, &[FormatArg::Uint(count as u64)]);
            Self::emit(&mut self.out, &self.text)?;

            for sample in window.iter() {
                self.text.clear();
                self.format.render(
                    &mut self.text,
                    &[
                        sample.re.scale(self.scale).to_arg(),
                        sample.im.scale(self.scale).to_arg(),
                    ],
                );
                Self::emit(&mut self.out, &self.text)?;
            }

            self.text.clear();
            self.tail.render(&mut self.text, &[]);
            Self::emit(&mut self.out, &self.text)?;
            self.out.flush().map_err(WorkError::Write)?;
            count
        };

        trace!("[{}] printed array of {} samples", self.name, count);
        self.input.read(count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockError;
    use crate::template::TemplateError;
    use std::io;

    struct Refusing;

    impl Write for Refusing {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn text(printer: &CarrayPrinter<Vec<u8>, f32>) -> &str {
        std::str::from_utf8(printer.get_ref()).unwrap()
    }

    #[test]
    fn test_prints_one_array_per_call() {
        let buf = PipeBuf::<Complex<f32>>::new("iq", 8);
        let mut writer = buf.writer();
        let mut printer =
            CarrayPrinter::new("[%d]", " (%.1f,%.1f)", " ]\n", &buf, Vec::<u8>::new())
                .unwrap()
                .with_scale(10.0);

        writer.push_slice(&[Complex::new(0.1, 0.2), Complex::new(1.0, -1.0)]);
        assert_eq!(printer.work().unwrap(), 2);
        // Visible without dropping the printer: the batch was flushed
        assert_eq!(text(&printer), "[2] (1.0,2.0) (10.0,-10.0) ]\n");

        writer.push_slice(&[Complex::new(0.5, 0.0)]);
        assert_eq!(printer.work().unwrap(), 1);
        assert_eq!(
            text(&printer),
            "[2] (1.0,2.0) (10.0,-10.0) ]\n[1] (5.0,0.0) ]\n"
        );
    }

    #[test]
    fn test_nothing_readable_prints_nothing() {
        let buf = PipeBuf::<Complex<f32>>::new("quiet", 4);
        let mut printer = CarrayPrinter::new("[%d]", "%f %f", "\n", &buf, Vec::<u8>::new()).unwrap();
        assert_eq!(printer.work().unwrap(), 0);
        assert_eq!(text(&printer), "");
    }

    #[test]
    fn test_head_without_count() {
        let buf = PipeBuf::<Complex<i16>>::new("ints", 4);
        buf.writer().push_slice(&[Complex::new(3, -4)]);
        let mut printer =
            CarrayPrinter::new("{", "%d%+di", "}\n", &buf, Vec::<u8>::new()).unwrap();

        assert_eq!(printer.scale(), 1);
        printer.set_scale(2);
        printer.work().unwrap();
        assert_eq!(printer.into_inner().unwrap(), b"{6-8i}\n");
    }

    #[test]
    fn test_write_failure_keeps_input() {
        let buf = PipeBuf::<Complex<f32>>::new("refused", 4);
        let mut writer = buf.writer();
        writer.push_slice(&[Complex::new(1.0, 1.0)]);
        let mut printer = CarrayPrinter::new("%d:", "%f,%f", "\n", &buf, Refusing).unwrap();

        assert!(matches!(printer.work(), Err(WorkError::Write(_))));
        assert_eq!(writer.writable(), 3);
    }

    #[test]
    fn test_templates_checked_at_construction() {
        let buf = PipeBuf::<Complex<f32>>::new("checks", 4);

        let result = CarrayPrinter::new("[%d %d]", "%f,%f", "\n", &buf, Vec::<u8>::new());
        assert!(matches!(
            result,
            Err(BlockError::Template(TemplateError::TooManyPlaceholders { max: 1, found: 2 }))
        ));

        let result = CarrayPrinter::new("[", "%f", "]", &buf, Vec::<u8>::new());
        assert!(matches!(
            result,
            Err(BlockError::Template(TemplateError::Arity { expected: 2, found: 1 }))
        ));

        let result = CarrayPrinter::new("[", "%f,%f", "]%d", &buf, Vec::<u8>::new());
        assert!(matches!(
            result,
            Err(BlockError::Template(TemplateError::Arity { expected: 0, found: 1 }))
        ));

        // Failed constructions must not hold the buffer
        assert_eq!(buf.num_readers(), 0);
        let mut writer = buf.writer();
        let mut printer = CarrayPrinter::new("", "%f,%f", "", &buf, Vec::<u8>::new()).unwrap();
        writer.push_slice(&[Complex::default(); 4]);
        assert_eq!(printer.work().unwrap(), 4);
        assert_eq!(writer.writable(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_from_fd_leaves_descriptor_open() {
        use std::io::{Read, Seek, SeekFrom};

        let mut file = tempfile::tempfile().unwrap();
        let buf = PipeBuf::<Complex<f64>>::new("fd", 4);
        buf.writer().push_slice(&[Complex::new(1.5, -0.5)]);

        let mut printer = CarrayPrinter::from_fd("", "%g %g", "\n", &buf, &file).unwrap();
        printer.work().unwrap();
        drop(printer);

        file.seek(SeekFrom::Start(0)).unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "1.5 -0.5\n");
    }
}
