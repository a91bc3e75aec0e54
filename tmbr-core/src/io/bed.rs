use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::debug;

use crate::models::GenomicInterval;
use crate::utils::{get_dynamic_reader, is_bed_header};

///
/// Read raw (contig, start, end) triples from a BED-like file into
/// intervals. Columns beyond the third are ignored. The result is not
/// normalized; callers merge it themselves.
///
/// # Arguments
/// - path: path to a plain or gzipped BED file
///
pub fn read_bed(path: &Path) -> Result<Vec<GenomicInterval>> {
    let reader = get_dynamic_reader(path)?;

    let mut intervals: Vec<GenomicInterval> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_bed_header(&line) {
            continue;
        }

        let mut fields = line.split('\t');

        let contig = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("Missing chromosome field"))?;
        let start = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("Missing start field"))?
            .parse::<u64>()
            .with_context(|| format!("Failed to parse start position at line {}: {}", idx + 1, line))?;
        let end = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("Missing end field"))?
            .parse::<u64>()
            .with_context(|| format!("Failed to parse end position at line {}: {}", idx + 1, line))?;

        intervals.push(GenomicInterval::new(contig, start, end)?);
    }

    if intervals.is_empty() {
        bail!("0 regions found in the file: {}", path.display());
    }

    debug!("Read {} regions from {}", intervals.len(), path.display());

    Ok(intervals)
}
