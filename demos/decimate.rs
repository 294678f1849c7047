//! Example: Thin out a raw sample file
//!
//! Reads native-endian `f32` samples, keeps one in every `--stride`, and
//! writes the survivors either raw or as text. A counter reports how many
//! samples each pass handed to the decimator.
//!
//! Usage:
//!   cargo run --release --example decimate -- \
//!       --file capture.f32 --stride 8 --output thinned.f32
//!
//! As text, looping the input for 50 passes:
//!   cargo run --release --example decimate -- \
//!       --file capture.f32 --stride 8 --print "%.4f\n" --loop --max-passes 50

use clap::Parser;
use fdblocks::{Decimator, FilePrinter, FileReader, FileWriter, ItemCounter, PipeBuf, Scheduler};
use std::fs::File;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a raw f32 sample file
    #[arg(short, long)]
    file: String,

    /// Keep one sample out of this many
    #[arg(short, long, default_value = "4")]
    stride: usize,

    /// Raw output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Print samples as text through this template instead of writing raw
    #[arg(long)]
    print: Option<String>,

    /// Scale factor applied before printing
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// Rewind the input at end of file
    #[arg(long = "loop")]
    looping: bool,

    /// Stop after this many scheduler passes (required with --loop)
    #[arg(long)]
    max_passes: Option<usize>,

    /// Capacity of each buffer, in samples
    #[arg(long, default_value = "4096")]
    buffer: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.looping && args.max_passes.is_none() {
        return Err("--loop needs --max-passes, a looping source never goes idle".into());
    }

    let raw = PipeBuf::<f32>::new("raw", args.buffer);
    let thinned = PipeBuf::<f32>::new("thinned", args.buffer);
    let counts = PipeBuf::<u64>::new("counts", 1);

    let mut scheduler = Scheduler::new();

    let input = File::open(&args.file)?;
    let mut source = FileReader::new(input, &raw).with_name(args.file.clone());
    if args.looping {
        source = source.looping();
    }
    scheduler.add_process(source);

    // The counter output holds one value; drained after every pass
    let mut totals = counts.reader();
    scheduler.add_process(ItemCounter::<f32, u64>::new(&raw, &counts));
    scheduler.add_process(Decimator::new(args.stride, &raw, &thinned)?);

    match (&args.print, &args.output) {
        (Some(format), _) => {
            // Templates come from the shell, so allow "\n" to be typed literally
            let format = format.replace("\\n", "\n");
            let printer = FilePrinter::new(&format, &thinned, std::io::stdout())?
                .with_scale(args.scale);
            scheduler.add_process(printer);
        }
        (None, Some(path)) => scheduler.add_process(FileWriter::new(&thinned, File::create(path)?)),
        (None, None) => scheduler.add_process(FileWriter::new(&thinned, std::io::stdout())),
    }

    let mut samples_in = 0u64;
    let mut passes = 0;
    loop {
        let moved = scheduler.step()?;
        passes += 1;

        let readable = totals.readable();
        samples_in += totals.rd().iter().sum::<u64>();
        totals.read(readable);

        if moved == 0 || args.max_passes.is_some_and(|max| passes >= max) {
            break;
        }
    }

    info!(
        "{} passes, {} samples in, {} samples out",
        passes,
        samples_in,
        thinned.total_written()
    );

    Ok(())
}
