//! Per-probe output records for the `mrc` binary.
//!
//! Text lines keep the fixed column layout downstream plotting scripts
//! split on whitespace:
//!
//! ```text
//! lru trace.bin 0.5 4 PROBE 0 CAP          250 0.000000233 MR 0.812000 DT 0.001234
//! ```
//!
//! The first four columns echo the run's arguments as the user typed them.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::replay::ProbeResult;

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Output encoding for probe results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// The run's identifying arguments, echoed on every line.
#[derive(Debug, Clone, Serialize)]
pub struct RunLabel {
    pub policy: String,
    pub trace: String,
    pub rate: String,
    pub probes: String,
}

/// One probe result paired with its run label.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeLine<'a> {
    #[serde(flatten)]
    pub label: &'a RunLabel,
    #[serde(flatten)]
    pub result: &'a ProbeResult,
}

impl ProbeLine<'_> {
    /// Capacity in GiB as if each key were one byte.
    pub fn capacity_gib(&self) -> f64 {
        self.result.capacity as f64 / BYTES_PER_GIB
    }

    /// Writes this line in `format`, newline-terminated.
    pub fn write_to<W: Write>(&self, out: &mut W, format: OutputFormat) -> io::Result<()> {
        match format {
            OutputFormat::Text => writeln!(out, "{self}"),
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)
            },
        }
    }
}

impl fmt::Display for ProbeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} PROBE {} CAP {:>12} {:.9} MR {:.6} DT {:.6}",
            self.label.policy,
            self.label.trace,
            self.label.rate,
            self.label.probes,
            self.result.index,
            self.result.capacity,
            self.capacity_gib(),
            self.result.miss_ratio,
            self.result.elapsed.as_secs_f64(),
        )
    }
}
