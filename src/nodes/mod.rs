//! Stream-processing blocks
//!
//! - **Sources**: `FileReader` fills a buffer from a byte stream, optionally looping
//! - **Sinks**: `FileWriter` drains raw elements, `FilePrinter` and
//!   `CarrayPrinter` render them as text
//! - **Transforms**: `ItemCounter` and `Decimator`
//!
//! Every block implements `ProcessNode` and is bound to its buffers at
//! construction.

mod carray_printer;
mod decimator;
mod file_printer;
mod file_reader;
mod file_writer;
mod item_counter;

pub use carray_printer::CarrayPrinter;
pub use decimator::Decimator;
pub use file_printer::{FilePrinter, LINE_CAPACITY};
pub use file_reader::FileReader;
pub use file_writer::FileWriter;
pub use item_counter::ItemCounter;
