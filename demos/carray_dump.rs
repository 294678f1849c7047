//! Example: Dump complex samples as text arrays
//!
//! Reads interleaved native-endian `f32` I/Q pairs and prints every batch the
//! reader delivers as one line on stdout, e.g. for piping into a plotter.
//!
//! Usage:
//!   cargo run --release --example carray_dump -- --file iq.cf32 --batch 256
//!
//! Custom layout, scaled to millivolts:
//!   cargo run --release --example carray_dump -- \
//!       --file iq.cf32 --head "%d:" --format " %.1f%+.1fj" --scale 1000

use clap::Parser;
use fdblocks::{CarrayPrinter, Complex, FileReader, PipeBuf, Scheduler, StopReason};
use std::fs::File;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an interleaved complex f32 file
    #[arg(short, long)]
    file: String,

    /// Samples per printed array (buffer capacity)
    #[arg(short, long, default_value = "64")]
    batch: usize,

    /// Head template, may use the sample count once
    #[arg(long, default_value = "[%d]")]
    head: String,

    /// Per-sample template, receives the real and imaginary parts
    #[arg(long, default_value = " %f,%f")]
    format: String,

    /// Tail template
    #[arg(long, default_value = "\n")]
    tail: String,

    /// Scale factor applied to both components
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// Rewind the input at end of file
    #[arg(long = "loop")]
    looping: bool,

    /// Stop after this many scheduler passes
    #[arg(long, default_value = "100000")]
    max_passes: usize,
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
    // Templates come from the shell, so allow "\n" to be typed literally
    let tail = args.tail.replace("\\n", "\n");

    let samples = PipeBuf::<Complex<f32>>::new("iq", args.batch);
    let mut source = FileReader::new(File::open(&args.file)?, &samples);
    if args.looping {
        source = source.looping();
    }

    let printer = CarrayPrinter::from_fd(&args.head, &args.format, &tail, &samples, std::io::stdout())?
        .with_scale(args.scale);

    let mut scheduler = Scheduler::new().with_max_passes(args.max_passes);
    scheduler.add_process(source);
    scheduler.add_process(printer);

    let stats = scheduler.run()?;
    if stats.reason == StopReason::PassLimit {
        warn!("Stopped at the pass limit ({} passes)", stats.passes);
    }
    info!(
        "Printed {} samples in {} passes",
        samples.total_written(),
        stats.passes
    );

    Ok(())
}
