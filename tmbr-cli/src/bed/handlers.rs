use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use tmbr_core::io::fasta::{FastaScanOptions, scan_target_regions};

pub fn run_bed(matches: &ArgMatches) -> Result<()> {
    let fasta = matches
        .get_one::<String>("fasta")
        .expect("A path to a FASTA file is required.");
    let output = matches
        .get_one::<String>("output")
        .expect("An output BED path is required.");

    let mut options = FastaScanOptions {
        uppercase_only: matches.get_flag("uppercase-only"),
        autosomes_only: matches.get_flag("autosomes-only"),
        ..FastaScanOptions::default()
    };
    if let Some(letters) = matches.get_one::<String>("target-letters") {
        options.target_letters = letters.clone();
    }

    let regions = scan_target_regions(Path::new(fasta), &options)
        .with_context(|| format!("Failed to scan FASTA file: {}", fasta))?;

    regions
        .write_bed(Path::new(output))
        .with_context(|| format!("Failed to write BED file: {}", output))?;

    info!(
        "Wrote {} regions covering {} bases to {}",
        regions.len(),
        regions.total_length(),
        output
    );

    Ok(())
}
