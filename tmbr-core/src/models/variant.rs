use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// FILTER column state. `Pass` covers the PASS sentinel and the missing
/// value `.`, both of which mean no filter fired upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStatus {
    Pass,
    Tagged(Vec<String>),
}

impl FilterStatus {
    pub fn from_field(field: &str) -> FilterStatus {
        match field {
            "PASS" | "." => FilterStatus::Pass,
            tags => FilterStatus::Tagged(tags.split(';').map(|tag| tag.to_string()).collect()),
        }
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterStatus::Pass)
    }

    /// Tags carried by the record; empty for the PASS sentinel.
    pub fn tags(&self) -> &[String] {
        match self {
            FilterStatus::Pass => &[],
            FilterStatus::Tagged(tags) => tags,
        }
    }
}

/// Genotype state of the first sample, collapsed from the GT field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zygosity {
    HomozygousRef,
    Heterozygous,
    HomozygousAlt,
    Unknown,
}

impl Zygosity {
    /// Collapse a GT string (`0/1`, `1|1`, `./.`, ...) into a zygosity state.
    pub fn from_gt(gt: &str) -> Zygosity {
        let alleles: Vec<&str> = gt
            .split(['/', '|'])
            .filter(|allele| !allele.is_empty() && *allele != ".")
            .collect();

        if alleles.is_empty() {
            return Zygosity::Unknown;
        }
        if alleles.iter().all(|allele| *allele == "0") {
            return Zygosity::HomozygousRef;
        }
        if alleles.iter().any(|allele| *allele == "0") {
            return Zygosity::Heterozygous;
        }
        // all non-reference; heterozygous when two different alt alleles
        if alleles.windows(2).all(|pair| pair[0] == pair[1]) {
            Zygosity::HomozygousAlt
        } else {
            Zygosity::Heterozygous
        }
    }
}

/// Optional annotation attached to a record by an upstream annotator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub consequence: Option<String>,
    pub population_af: Option<f64>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.consequence.is_none() && self.population_af.is_none()
    }
}

/// One parsed variant record. A record with several alternate alleles is
/// logically several candidate mutations; [`Variant::candidates`] performs
/// that fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub contig: String,
    /// 1-based, inclusive.
    pub position: u64,
    pub reference: String,
    pub alternates: Vec<String>,
    pub quality: Option<f64>,
    pub filter: FilterStatus,
    pub zygosity: Zygosity,
    /// Per-alternate allele fractions, parallel to `alternates` when the
    /// caller had per-allele depths; a single value applies to all.
    pub allele_fractions: Vec<f64>,
    pub annotation: Option<Annotation>,
}

impl Variant {
    /// Fan the record out into one candidate mutation per alternate allele.
    ///
    /// Each candidate gets its alleles trimmed (shared trailing bases first,
    /// then shared leading bases, advancing the position) so that equivalent
    /// calls spelled differently dedup to the same key and region tests see
    /// the position the allele actually changes.
    pub fn candidates(&self) -> Vec<CandidateMutation> {
        self.alternates
            .iter()
            .enumerate()
            .filter(|(_, alternate)| *alternate != "." && !alternate.is_empty())
            .map(|(idx, alternate)| {
                let (position, reference, alternate) =
                    trim_alleles(self.position, &self.reference, alternate);

                let allele_fraction = match self.allele_fractions.len() {
                    0 => None,
                    1 => Some(self.allele_fractions[0]),
                    _ => self.allele_fractions.get(idx).copied(),
                };

                CandidateMutation {
                    contig: self.contig.clone(),
                    position,
                    reference,
                    alternate,
                    quality: self.quality,
                    filter: self.filter.clone(),
                    zygosity: self.zygosity,
                    allele_fraction,
                    annotation: self.annotation.clone(),
                }
            })
            .collect()
    }
}

/// Trim shared trailing bases, then shared leading bases. Leading trims
/// advance the 1-based position. Always leaves at least one base on each
/// side, matching the padded-allele convention of variant callers.
fn trim_alleles(position: u64, reference: &str, alternate: &str) -> (u64, String, String) {
    let mut reference: Vec<u8> = reference.as_bytes().to_vec();
    let mut alternate: Vec<u8> = alternate.as_bytes().to_vec();
    let mut position = position;

    while reference.len() > 1 && alternate.len() > 1 && reference.last() == alternate.last() {
        reference.pop();
        alternate.pop();
    }

    let mut leading = 0;
    while reference.len() - leading > 1
        && alternate.len() - leading > 1
        && reference[leading] == alternate[leading]
    {
        leading += 1;
        position += 1;
    }
    reference.drain(..leading);
    alternate.drain(..leading);

    (
        position,
        String::from_utf8(reference).expect("alleles are ascii"),
        String::from_utf8(alternate).expect("alleles are ascii"),
    )
}

/// A single alternate allele of a record, evaluated independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMutation {
    pub contig: String,
    /// 1-based, inclusive, after allele trimming.
    pub position: u64,
    pub reference: String,
    pub alternate: String,
    pub quality: Option<f64>,
    pub filter: FilterStatus,
    pub zygosity: Zygosity,
    pub allele_fraction: Option<f64>,
    pub annotation: Option<Annotation>,
}

impl CandidateMutation {
    /// The identity under which equivalent calls dedup.
    pub fn key(&self) -> MutationKey {
        MutationKey {
            contig: self.contig.clone(),
            position: self.position,
            reference: self.reference.clone(),
            alternate: self.alternate.clone(),
        }
    }
}

impl Display for CandidateMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.contig, self.position, self.reference, self.alternate
        )
    }
}

/// (contig, position, reference, alternate) identity of a candidate
/// mutation. Ordered so key sets iterate in (contig, position) order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MutationKey {
    pub contig: String,
    pub position: u64,
    pub reference: String,
    pub alternate: String,
}
