use serde::{Deserialize, Serialize};

use crate::models::{CandidateMutation, IntervalSet, Zygosity};

/// Rule set for deciding which candidate mutations qualify.
///
/// Held immutable by the [`Classifier`] so classification stays pure and a
/// run's configuration can be logged or serialized next to its result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Candidates below this QUAL do not qualify. No threshold when unset;
    /// records with no QUAL value always pass the threshold test.
    pub min_quality: Option<f64>,
    /// FILTER tags acceptable in addition to the PASS sentinel.
    pub allowed_filters: Vec<String>,
    /// Accept candidates regardless of FILTER tags.
    pub include_filtered: bool,
    /// Reject homozygous-alternate (germline-looking) calls.
    pub exclude_germline: bool,
    /// Candidates below this sample allele fraction do not qualify.
    pub min_allele_fraction: Option<f64>,
    /// Consequence classes that never qualify (e.g. synonymous changes).
    pub excluded_consequences: Vec<String>,
    /// Candidates above this population allele frequency are treated as
    /// common polymorphisms and do not qualify.
    pub max_population_af: Option<f64>,
}

/// Outcome of classifying one candidate mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    RejectedByFilter,
    RejectedByRegion,
    RejectedByAnnotation,
}

/// One verdict per candidate mutation, with a machine-readable reason tag.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub candidate: CandidateMutation,
    pub verdict: Verdict,
    pub reason: &'static str,
}

///
/// Decides, candidate by candidate, what counts toward the burden numerator.
///
/// Tests run in a fixed order - region, filter tags and quality, zygosity
/// and allele fraction, annotation - and the first failing test names the
/// rejection reason, so every rejection is attributed to exactly one cause.
///
pub struct Classifier {
    config: ClassifierConfig,
    regions: IntervalSet,
}

impl Classifier {
    /// # Arguments
    /// - config: immutable rule set
    /// - regions: the normalized effective interval set (read-only)
    pub fn new(config: ClassifierConfig, regions: IntervalSet) -> Self {
        Classifier { config, regions }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn regions(&self) -> &IntervalSet {
        &self.regions
    }

    pub fn classify(&self, candidate: CandidateMutation) -> ClassificationResult {
        let (verdict, reason) = self.evaluate(&candidate);
        ClassificationResult {
            candidate,
            verdict,
            reason,
        }
    }

    fn evaluate(&self, candidate: &CandidateMutation) -> (Verdict, &'static str) {
        // 1-based position onto the half-open 0-based convention
        let in_region = candidate
            .position
            .checked_sub(1)
            .is_some_and(|position| self.regions.contains(&candidate.contig, position));
        if !in_region {
            return (Verdict::RejectedByRegion, "outside-target");
        }

        if !self.filter_acceptable(candidate) {
            return (Verdict::RejectedByFilter, "filter-tag");
        }

        if let (Some(min), Some(quality)) = (self.config.min_quality, candidate.quality) {
            if quality < min {
                return (Verdict::RejectedByFilter, "low-quality");
            }
        }

        if self.config.exclude_germline && candidate.zygosity == Zygosity::HomozygousAlt {
            return (Verdict::RejectedByFilter, "germline");
        }

        if let (Some(min), Some(fraction)) =
            (self.config.min_allele_fraction, candidate.allele_fraction)
        {
            if fraction < min {
                return (Verdict::RejectedByFilter, "low-allele-fraction");
            }
        }

        if let Some(annotation) = &candidate.annotation {
            if let Some(consequence) = &annotation.consequence {
                // annotators join stacked consequences with '&' or ','
                let excluded = consequence
                    .split(['&', ','])
                    .any(|term| self.config.excluded_consequences.iter().any(|e| e == term));
                if excluded {
                    return (Verdict::RejectedByAnnotation, "excluded-consequence");
                }
            }

            if let (Some(max), Some(af)) =
                (self.config.max_population_af, annotation.population_af)
            {
                if af > max {
                    return (Verdict::RejectedByAnnotation, "common-polymorphism");
                }
            }
        }

        (Verdict::Accepted, "qualifying")
    }

    fn filter_acceptable(&self, candidate: &CandidateMutation) -> bool {
        if self.config.include_filtered || candidate.filter.is_pass() {
            return true;
        }
        candidate
            .filter
            .tags()
            .iter()
            .all(|tag| self.config.allowed_filters.contains(tag))
    }
}
