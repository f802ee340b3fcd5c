//! SatScan - satellite imagery object detection and area reporting
//!
//! A CLI tool that runs a pretrained detector over satellite/aerial imagery
//! and exports annotated images, a run log and a CSV area report.

use clap::Parser;
use satscan::cli::Cli;
use satscan::commands;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
