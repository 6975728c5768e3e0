//! `tracegen`: write a synthetic trace in the format `mrc` reads.
//!
//! ```text
//! tracegen <count> [--seed N] [--output PATH]
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mrckit::tracegen::{generate, write_trace};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of keys to generate (the sentinel is appended after them)
    count: usize,

    /// RNG seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Output file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn write_to(args: &Args, keys: &[u32]) -> io::Result<()> {
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_trace(&mut out, keys)
        },
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_trace(&mut out, keys)?;
            out.flush()
        },
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let keys = generate(args.count, args.seed);
    match write_to(&args, &keys) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        },
    }
}
