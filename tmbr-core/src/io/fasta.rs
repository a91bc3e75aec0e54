use std::io::BufRead;
use std::path::Path;

use anyhow::Result;
use log::{debug, info};

use crate::models::{GenomicInterval, IntervalSet};
use crate::utils::get_dynamic_reader;

/// Options for deriving target regions from a genome FASTA.
#[derive(Debug, Clone)]
pub struct FastaScanOptions {
    /// Nucleic acid codes that count as interrogable sequence.
    pub target_letters: String,
    /// Restrict to uppercase letters, dropping soft-masked sequence.
    pub uppercase_only: bool,
    /// Keep only human autosomes (chr1-chr22).
    pub autosomes_only: bool,
}

impl Default for FastaScanOptions {
    fn default() -> Self {
        FastaScanOptions {
            target_letters: "ACGT".to_string(),
            uppercase_only: false,
            autosomes_only: false,
        }
    }
}

fn is_human_autosome(contig: &str) -> bool {
    contig
        .strip_prefix("chr")
        .and_then(|n| n.parse::<u8>().ok())
        .is_some_and(|n| (1..=22).contains(&n))
}

///
/// Identify maximal runs of target letters per contig in a FASTA file and
/// return them as a normalized interval set, ready to be written as a
/// target-region BED.
///
/// # Arguments
/// - path: path to a plain or gzipped FASTA file
/// - options: which letters count and which contigs to keep
///
pub fn scan_target_regions(path: &Path, options: &FastaScanOptions) -> Result<IntervalSet> {
    let mut wanted = [false; 256];
    for letter in options.target_letters.bytes() {
        wanted[letter.to_ascii_uppercase() as usize] = true;
        if !options.uppercase_only {
            wanted[letter.to_ascii_lowercase() as usize] = true;
        }
    }

    let reader = get_dynamic_reader(path)?;

    let mut intervals: Vec<GenomicInterval> = Vec::new();
    // None while skipping a contig the options exclude
    let mut contig: Option<String> = None;
    let mut offset: u64 = 0;
    let mut run_start: Option<u64> = None;

    for line in reader.lines() {
        let line = line?;

        if let Some(header) = line.strip_prefix('>') {
            if let (Some(name), Some(start)) = (&contig, run_start) {
                intervals.push(GenomicInterval {
                    contig: name.clone(),
                    start,
                    end: offset,
                });
            }

            let name = header
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            if name.is_empty() || (options.autosomes_only && !is_human_autosome(&name)) {
                debug!("Skipping contig: {}", header);
                contig = None;
            } else {
                contig = Some(name);
            }
            offset = 0;
            run_start = None;
            continue;
        }

        let Some(name) = &contig else {
            continue;
        };

        for letter in line.trim().bytes() {
            if wanted[letter as usize] {
                run_start.get_or_insert(offset);
            } else if let Some(start) = run_start.take() {
                intervals.push(GenomicInterval {
                    contig: name.clone(),
                    start,
                    end: offset,
                });
            }
            offset += 1;
        }
    }

    if let (Some(name), Some(start)) = (&contig, run_start) {
        intervals.push(GenomicInterval {
            contig: name.clone(),
            start,
            end: offset,
        });
    }

    info!(
        "Identified {} target regions in {}",
        intervals.len(),
        path.display()
    );

    Ok(IntervalSet::from(intervals).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn fasta_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn regions(set: &IntervalSet) -> Vec<String> {
        set.iter().map(|i| i.to_string()).collect()
    }

    #[rstest]
    fn test_runs_split_on_ambiguous_bases() {
        let file = fasta_file(">chr1\nACGTNNACG\n");
        let set = scan_target_regions(file.path(), &FastaScanOptions::default()).unwrap();

        assert_eq!(regions(&set), vec!["chr1:0-4", "chr1:6-9"]);
    }

    #[rstest]
    fn test_runs_continue_across_line_breaks() {
        let file = fasta_file(">chr1\nACGT\nACGT\n");
        let set = scan_target_regions(file.path(), &FastaScanOptions::default()).unwrap();

        assert_eq!(regions(&set), vec!["chr1:0-8"]);
    }

    #[rstest]
    fn test_uppercase_only_drops_soft_masked_sequence() {
        let file = fasta_file(">chr1\nACGTacgtACGT\n");

        let lenient = scan_target_regions(file.path(), &FastaScanOptions::default()).unwrap();
        assert_eq!(regions(&lenient), vec!["chr1:0-12"]);

        let strict = scan_target_regions(
            file.path(),
            &FastaScanOptions {
                uppercase_only: true,
                ..FastaScanOptions::default()
            },
        )
        .unwrap();
        assert_eq!(regions(&strict), vec!["chr1:0-4", "chr1:8-12"]);
    }

    #[rstest]
    fn test_autosomes_only_skips_other_contigs() {
        let file = fasta_file(">chr1\nACGT\n>chrX\nACGT\n>chr22 description\nACGT\n");
        let set = scan_target_regions(
            file.path(),
            &FastaScanOptions {
                autosomes_only: true,
                ..FastaScanOptions::default()
            },
        )
        .unwrap();

        assert_eq!(regions(&set), vec!["chr1:0-4", "chr22:0-4"]);
    }

    #[rstest]
    fn test_contig_with_no_target_letters_yields_nothing() {
        let file = fasta_file(">chr1\nNNNN\n");
        let set = scan_target_regions(file.path(), &FastaScanOptions::default()).unwrap();
        assert!(set.is_empty());
    }
}
