use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::errors::BurdenError;
use crate::models::{Annotation, FilterStatus, Variant, Zygosity};
use crate::utils::get_dynamic_reader;

/// Which INFO keys carry the optional annotation fields. Annotators differ;
/// these defaults match the common single-value convention.
#[derive(Debug, Clone)]
pub struct VcfReadOptions {
    pub consequence_key: String,
    pub population_af_key: String,
}

impl Default for VcfReadOptions {
    fn default() -> Self {
        VcfReadOptions {
            consequence_key: "Consequence".to_string(),
            population_af_key: "POP_AF".to_string(),
        }
    }
}

///
/// Lazy reader over the records of a plain or gzipped VCF file.
///
/// Yields one [`Variant`] per data line; header lines are skipped. Each
/// unparsable line surfaces as [`BurdenError::MalformedVariantRecord`] so
/// the caller can apply its malformed-record policy; iteration continues
/// past it either way.
///
pub struct VcfReader {
    lines: Lines<BufReader<Box<dyn Read>>>,
    path: String,
    line_number: u64,
    options: VcfReadOptions,
}

impl VcfReader {
    pub fn from_path(path: &Path) -> Result<Self> {
        VcfReader::with_options(path, VcfReadOptions::default())
    }

    pub fn with_options(path: &Path, options: VcfReadOptions) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;
        debug!("Streaming variant records from {}", path.display());

        Ok(VcfReader {
            lines: reader.lines(),
            path: path.display().to_string(),
            line_number: 0,
            options,
        })
    }

    fn malformed(&self, reason: impl Into<String>) -> BurdenError {
        BurdenError::MalformedVariantRecord {
            path: self.path.clone(),
            line: self.line_number,
            reason: reason.into(),
        }
    }

    fn parse_record(&self, line: &str) -> Result<Variant, BurdenError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            return Err(self.malformed(format!(
                "expected at least 8 tab-separated columns, got {}",
                fields.len()
            )));
        }

        let contig = fields[0];
        if contig.is_empty() {
            return Err(self.malformed("missing CHROM"));
        }

        let position: u64 = fields[1]
            .parse()
            .map_err(|_| self.malformed(format!("POS is not an integer: {}", fields[1])))?;
        if position == 0 {
            return Err(self.malformed("POS must be 1-based"));
        }

        let reference = fields[3];
        if reference.is_empty() || reference == "." {
            return Err(self.malformed("missing REF allele"));
        }
        if !reference.is_ascii() || !fields[4].is_ascii() {
            return Err(self.malformed("alleles must be ascii"));
        }

        let alternates: Vec<String> = fields[4].split(',').map(|alt| alt.to_string()).collect();

        let quality = match fields[5] {
            "." => None,
            q => Some(
                q.parse::<f64>()
                    .map_err(|_| self.malformed(format!("QUAL is not a number: {}", q)))?,
            ),
        };

        let filter = FilterStatus::from_field(fields[6]);
        let annotation = self.parse_annotation(fields[7])?;

        let (zygosity, allele_fractions) = if fields.len() >= 10 {
            self.parse_sample(fields[8], fields[9])?
        } else {
            (Zygosity::Unknown, Vec::new())
        };

        Ok(Variant {
            contig: contig.to_string(),
            position,
            reference: reference.to_string(),
            alternates,
            quality,
            filter,
            zygosity,
            allele_fractions,
            annotation,
        })
    }

    fn parse_annotation(&self, info: &str) -> Result<Option<Annotation>, BurdenError> {
        let mut annotation = Annotation::default();

        for entry in info.split(';') {
            let Some((key, value)) = entry.split_once('=') else {
                continue; // flag entries carry no annotation
            };

            if key == self.options.consequence_key {
                annotation.consequence = Some(value.to_string());
            } else if key == self.options.population_af_key {
                let af = value.parse::<f64>().map_err(|_| {
                    self.malformed(format!("{} is not a number: {}", key, value))
                })?;
                annotation.population_af = Some(af);
            }
        }

        Ok((!annotation.is_empty()).then_some(annotation))
    }

    /// Zygosity from GT and per-allele fractions from AF, falling back to
    /// AD/DP when no AF is present. Only the first sample is consulted.
    fn parse_sample(
        &self,
        format: &str,
        sample: &str,
    ) -> Result<(Zygosity, Vec<f64>), BurdenError> {
        let keys: Vec<&str> = format.split(':').collect();
        let values: Vec<&str> = sample.split(':').collect();

        let lookup = |wanted: &str| -> Option<&str> {
            keys.iter()
                .position(|key| *key == wanted)
                .and_then(|idx| values.get(idx).copied())
                .filter(|value| *value != ".")
        };

        let zygosity = lookup("GT")
            .map(Zygosity::from_gt)
            .unwrap_or(Zygosity::Unknown);

        let mut fractions: Vec<f64> = Vec::new();
        if let Some(af) = lookup("AF") {
            for value in af.split(',') {
                let fraction = value
                    .parse::<f64>()
                    .map_err(|_| self.malformed(format!("AF is not a number: {}", value)))?;
                fractions.push(fraction);
            }
        } else if let (Some(ad), Some(dp)) = (lookup("AD"), lookup("DP")) {
            let depth = dp
                .parse::<f64>()
                .map_err(|_| self.malformed(format!("DP is not a number: {}", dp)))?;
            if depth > 0.0 {
                // first AD entry is the reference depth
                for value in ad.split(',').skip(1) {
                    let alt_depth = value
                        .parse::<f64>()
                        .map_err(|_| self.malformed(format!("AD is not a number: {}", value)))?;
                    fractions.push(alt_depth / depth);
                }
            }
        }

        Ok((zygosity, fractions))
    }
}

impl Iterator for VcfReader {
    type Item = Result<Variant, BurdenError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(BurdenError::Io(e))),
            };
            self.line_number += 1;

            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            return Some(self.parse_record(&line));
        }
    }
}
