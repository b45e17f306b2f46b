//! # specfp
//!
//! Command-line front end: decode WDF containers, extract band fingerprints
//! and inspect file structure.
//!
//! ## Usage
//!
//! ```bash
//! # Dump a spectrum as x,y CSV
//! specfp convert sample.wdf sample.csv
//!
//! # Fingerprint a directory of files in parallel
//! specfp fingerprint data/*.wdf -o bands.csv --summary summary.csv
//!
//! # Show header and block listing
//! specfp info sample.wdf
//!
//! # Write a synthetic container
//! specfp demo demo.wdf
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity(), cli.quiet());
    cli::dispatch(cli)
}
