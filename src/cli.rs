//! Command-line argument parsing for the `valley-sim` binary.

use std::path::PathBuf;

use clap::Parser;

/// Off-line inter-domain routing simulator: Gao-Rexford valley-free
/// propagation over an AS-relationship graph, with optional ROV filtering.
#[derive(Debug, Parser)]
#[command(name = "valley-sim", version, about)]
pub struct Cli {
    /// Path to the pipe-delimited AS-relationship topology file.
    #[arg(long)]
    pub topology: PathBuf,

    /// Path to the ROV-deployment file (one ASN per line). Optional: when
    /// omitted, no AS runs the ROV policy.
    #[arg(long)]
    pub rov: Option<PathBuf>,

    /// Path to the seeds CSV file (`asn,prefix,rov_invalid`).
    #[arg(long)]
    pub seeds: PathBuf,

    /// Path to write the resulting RIB snapshot CSV to.
    #[arg(long)]
    pub out: PathBuf,

    /// Free-form label recorded in logs to identify this run.
    #[arg(long, default_value = "run")]
    pub test_name: String,
}
