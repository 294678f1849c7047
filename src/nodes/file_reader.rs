//! Raw source reading elements from a descriptor into a pipe buffer
//!
//! Provides `FileReader` - a source block that fills its output buffer with
//! whatever whole elements one `read()` returns. Seekable inputs can loop:
//! at end of stream the input is rewound and read again, so the same data
//! is emitted periodically.

use crate::runtime::node::{ProcessNode, WorkError, WorkResult};
use crate::runtime::pipebuf::{PipeBuf, PipeWriter};
use bytemuck::Pod;
use std::io::{self, Read, Seek, SeekFrom};
use std::mem::size_of;
use tracing::{debug, trace};

type Rewind<R> = fn(&mut R) -> io::Result<u64>;

fn rewind_to_start<R: Seek>(input: &mut R) -> io::Result<u64> {
    input.seek(SeekFrom::Start(0))
}

/// Source node reading raw `T` elements from `R`
///
/// Each `work()` call issues at most one `read()` sized to the free space of
/// the output buffer (two when a looping source rewinds), and makes no call
/// at all when the buffer is full.
///
/// # Fatal conditions
/// - the read fails (`WorkError::Read`)
/// - the byte count is not a whole number of elements (`WorkError::PartialElement`)
/// - looping: the rewind fails (`WorkError::Seek`), or the input is still
///   empty right after rewinding (`WorkError::EmptyLoop`)
///
/// # Example
/// ```no_run
/// use fdblocks::{FileReader, PipeBuf};
///
/// let samples = PipeBuf::<f32>::new("samples", 4096);
/// let file = std::fs::File::open("capture.f32")?;
/// let source = FileReader::new(file, &samples).looping();
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct FileReader<R, T> {
    name: String,
    input: R,
    out: PipeWriter<T>,
    /// Present when looping is enabled
    rewind: Option<Rewind<R>>,
    /// Set at end of stream on a non-looping source
    exhausted: bool,
}

impl<R: Read, T: Pod> FileReader<R, T> {
    /// Create a non-looping source writing into `out`
    pub fn new(input: R, out: &PipeBuf<T>) -> Self {
        Self {
            name: out.name(),
            input,
            out: out.writer(),
            rewind: None,
            exhausted: false,
        }
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether end of stream rewinds the input
    pub fn is_looping(&self) -> bool {
        self.rewind.is_some()
    }

    /// Whether a non-looping source has reached end of stream
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Give back the input, e.g. to inspect its position
    pub fn into_inner(self) -> R {
        self.input
    }

    /// Issue one read into `bytes`
    fn read_once(input: &mut R, bytes: &mut [u8]) -> WorkResult<usize> {
        input.read(bytes).map_err(WorkError::Read)
    }
}

impl<R: Read + Seek, T: Pod> FileReader<R, T> {
    /// Loop the input: rewind to the start at end of stream
    pub fn looping(mut self) -> Self {
        self.set_loop(true);
        self
    }

    /// Enable or disable looping between invocations
    pub fn set_loop(&mut self, enabled: bool) {
        if enabled {
            self.rewind = Some(rewind_to_start::<R>);
            self.exhausted = false;
        } else {
            self.rewind = None;
        }
    }
}

impl<R: Read, T: Pod> ProcessNode for FileReader<R, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_stop(&self) -> bool {
        self.exhausted
    }

    fn work(&mut self) -> WorkResult<usize> {
        if self.exhausted {
            return Ok(0);
        }

        let element_size = size_of::<T>();
        let count = {
            let mut window = self.out.wr();
            if window.is_empty() {
                return Ok(0);
            }
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut window[..]);

            let mut nr = Self::read_once(&mut self.input, bytes)?;
            if nr == 0 {
                let Some(rewind) = self.rewind else {
                    debug!("[{}] end of stream", self.name);
                    self.exhausted = true;
                    return Ok(0);
                };
                debug!("[{}] looping", self.name);
                rewind(&mut self.input).map_err(WorkError::Seek)?;
                nr = Self::read_once(&mut self.input, bytes)?;
                if nr == 0 {
                    return Err(WorkError::EmptyLoop);
                }
            }

            if nr % element_size != 0 {
                return Err(WorkError::PartialElement {
                    bytes: nr,
                    element_size,
                });
            }
            nr / element_size
        };

        trace!("[{}] read {} elements", self.name, count);
        self.out.written(count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::element::Complex;
    use crate::runtime::pipebuf::PipeReader;
    use std::io::{Cursor, Write};

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    fn drain<T: Pod>(reader: &mut PipeReader<T>) -> Vec<T> {
        let items = reader.rd().to_vec();
        reader.read(items.len());
        items
    }

    /// Reader that fails every call
    struct BrokenInput;

    impl Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device unplugged"))
        }
    }

    /// Readable, but refuses to seek like a pipe
    struct Unseekable(Cursor<Vec<u8>>);

    impl Read for Unseekable {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Seek for Unseekable {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "illegal seek"))
        }
    }

    /// Counts read calls
    struct Counting {
        calls: usize,
    }

    impl Read for Counting {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            Ok(0)
        }
    }

    #[test]
    fn test_reads_exactly_the_available_elements() {
        let values: Vec<f32> = (0..16).map(|i| i as f32 * 0.5).collect();
        let buf = PipeBuf::<f32>::new("samples", 32);
        let mut consumer = buf.reader();
        let mut source = FileReader::new(Cursor::new(f32_bytes(&values)), &buf);

        assert_eq!(source.work().unwrap(), 16);
        assert_eq!(drain(&mut consumer), values);

        assert_eq!(source.work().unwrap(), 0);
        assert!(source.should_stop());
        assert_eq!(consumer.readable(), 0);
        assert_eq!(buf.total_written(), 16);
    }

    #[test]
    fn test_read_is_sized_to_free_space() {
        let values: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let buf = PipeBuf::<f32>::new("small", 4);
        let mut consumer = buf.reader();
        let mut source = FileReader::new(Cursor::new(f32_bytes(&values)), &buf);

        assert_eq!(source.work().unwrap(), 4);
        assert_eq!(source.work().unwrap(), 0);

        consumer.read(3);
        assert_eq!(source.work().unwrap(), 3);
        assert_eq!(&*consumer.rd(), &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_full_output_makes_no_read_call() {
        let buf = PipeBuf::<u32>::new("full", 2);
        let _consumer = buf.reader();
        buf.writer().push_slice(&[1, 2]);

        let mut source = FileReader::new(Counting { calls: 0 }, &buf);
        assert_eq!(source.work().unwrap(), 0);
        assert!(!source.should_stop());
        assert_eq!(source.into_inner().calls, 0);
    }

    #[test]
    fn test_looping_repeats_the_input() {
        let buf = PipeBuf::<f32>::new("loop", 16);
        let mut consumer = buf.reader();
        let mut source = FileReader::new(Cursor::new(f32_bytes(&[1.0, 2.0])), &buf).looping();
        assert!(source.is_looping());

        let mut seen = Vec::new();
        for _ in 0..50 {
            source.work().unwrap();
            seen.extend(drain(&mut consumer));
        }
        assert_eq!(seen.len(), 100);
        assert!(seen.chunks(2).all(|pair| pair == [1.0, 2.0]));
        assert!(!source.should_stop());
    }

    #[test]
    fn test_looping_one_element_at_a_time() {
        let buf = PipeBuf::<f32>::new("loop1", 1);
        let mut consumer = buf.reader();
        let mut source = FileReader::new(Cursor::new(f32_bytes(&[1.0, 2.0])), &buf).looping();

        let mut seen = Vec::new();
        for _ in 0..7 {
            assert_eq!(source.work().unwrap(), 1);
            seen.extend(drain(&mut consumer));
        }
        assert_eq!(seen, vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_looping_over_a_real_file() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&f32_bytes(&[1.0, 2.0])).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let buf = PipeBuf::<f32>::new("file", 3);
        let mut consumer = buf.reader();
        let mut source = FileReader::new(file, &buf).looping();

        let mut seen = Vec::new();
        for _ in 0..6 {
            source.work().unwrap();
            seen.extend(drain(&mut consumer));
        }
        assert!(seen.len() >= 6);
        for (i, v) in seen.iter().enumerate() {
            assert_eq!(*v, if i % 2 == 0 { 1.0 } else { 2.0 });
        }
    }

    #[test]
    fn test_empty_looping_input_is_fatal() {
        let buf = PipeBuf::<f32>::new("empty", 4);
        let mut source = FileReader::new(Cursor::new(Vec::<u8>::new()), &buf).looping();
        assert!(matches!(source.work(), Err(WorkError::EmptyLoop)));
    }

    #[test]
    fn test_rewind_failure_is_fatal() {
        let buf = PipeBuf::<f32>::new("pipe", 4);
        let input = Unseekable(Cursor::new(f32_bytes(&[1.0])));
        let mut source = FileReader::new(input, &buf).looping();

        assert_eq!(source.work().unwrap(), 1);
        assert!(matches!(source.work(), Err(WorkError::Seek(_))));
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let buf = PipeBuf::<f32>::new("broken", 4);
        let mut source = FileReader::new(BrokenInput, &buf);
        match source.work() {
            Err(WorkError::Read(e)) => assert!(e.to_string().contains("unplugged")),
            other => panic!("Expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn test_disabling_loop_stops_at_end() {
        let buf = PipeBuf::<u8>::new("toggle", 8);
        let mut consumer = buf.reader();
        let mut source = FileReader::new(Cursor::new(vec![9u8, 8]), &buf).looping();

        assert_eq!(source.work().unwrap(), 2);
        consumer.read(2);
        source.set_loop(false);
        assert_eq!(source.work().unwrap(), 0);
        assert!(source.is_exhausted());

        source.set_loop(true);
        assert!(!source.should_stop());
        assert_eq!(source.work().unwrap(), 2);
    }

    fn assert_partial_reads_rejected<T: Pod + Default>() {
        let size = size_of::<T>();
        let mut byte_counts: Vec<usize> = (1..size).collect();
        byte_counts.push(size + 1);
        byte_counts.push(3 * size - 1);

        for bytes in byte_counts {
            let buf = PipeBuf::<T>::new("partial", 8);
            let mut source = FileReader::new(Cursor::new(vec![0xA5u8; bytes]), &buf);
            match source.work() {
                Err(WorkError::PartialElement {
                    bytes: got,
                    element_size,
                }) => {
                    assert_eq!(got, bytes);
                    assert_eq!(element_size, size);
                }
                other => panic!("{} bytes of {}-byte elements: got {:?}", bytes, size, other),
            }
            assert_eq!(buf.total_written(), 0);
        }
    }

    #[test]
    fn test_partial_element_reads_are_fatal() {
        assert_partial_reads_rejected::<u16>();
        assert_partial_reads_rejected::<f32>();
        assert_partial_reads_rejected::<f64>();
        assert_partial_reads_rejected::<Complex<i16>>();
        assert_partial_reads_rejected::<Complex<f32>>();
        assert_partial_reads_rejected::<Complex<f64>>();
    }

    #[test]
    fn test_default_name_comes_from_buffer() {
        let buf = PipeBuf::<u8>::new("iq.raw", 8);
        let source = FileReader::new(Cursor::new(Vec::<u8>::new()), &buf);
        assert_eq!(source.name(), "iq.raw");
        assert_eq!(source.with_name("custom_source").name(), "custom_source");
    }
}
