use std::collections::BTreeSet;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::classify::{ClassificationResult, Classifier, Verdict};
use crate::errors::{BurdenError, MalformedRecordPolicy};
use crate::models::{MutationKey, Variant};

/// Records per parallel work unit. Bounds memory while keeping the
/// once-per-chunk merge cost negligible.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

///
/// Streaming accumulator for classification outcomes.
///
/// Qualifying candidates are held as an ordered key set, which both
/// deduplicates equivalent calls and fixes the (contig, position) iteration
/// order, so results never depend on input order. [`merge`](BurdenTally::merge)
/// is associative and commutative: chunk boundaries and thread count never
/// change the result.
///
#[derive(Debug, Clone, Default)]
pub struct BurdenTally {
    accepted: BTreeSet<MutationKey>,
    examined: u64,
    rejected_by_region: u64,
    rejected_by_filter: u64,
    rejected_by_annotation: u64,
    malformed_skipped: u64,
}

impl BurdenTally {
    pub fn new() -> Self {
        BurdenTally::default()
    }

    pub fn record(&mut self, result: &ClassificationResult) {
        self.examined += 1;
        match result.verdict {
            Verdict::Accepted => {
                self.accepted.insert(result.candidate.key());
            }
            Verdict::RejectedByRegion => self.rejected_by_region += 1,
            Verdict::RejectedByFilter => self.rejected_by_filter += 1,
            Verdict::RejectedByAnnotation => self.rejected_by_annotation += 1,
        }
    }

    pub fn record_malformed(&mut self) {
        self.malformed_skipped += 1;
    }

    /// Combine two partial tallies: counter addition plus key-set union.
    pub fn merge(mut self, other: BurdenTally) -> BurdenTally {
        self.accepted.extend(other.accepted);
        self.examined += other.examined;
        self.rejected_by_region += other.rejected_by_region;
        self.rejected_by_filter += other.rejected_by_filter;
        self.rejected_by_annotation += other.rejected_by_annotation;
        self.malformed_skipped += other.malformed_skipped;
        self
    }

    pub fn examined(&self) -> u64 {
        self.examined
    }

    /// Close the stream and divide by the effective region size.
    ///
    /// Fails with [`BurdenError::EmptyDenominator`] when no sequence was
    /// interrogated and with [`BurdenError::EmptyInput`] when no candidate
    /// was ever examined; zero qualifying candidates over a real region is
    /// a valid zero burden, not an error.
    pub fn finalize(self, effective_bases: u64) -> Result<BurdenResult, BurdenError> {
        if effective_bases == 0 {
            return Err(BurdenError::EmptyDenominator);
        }
        if self.examined == 0 {
            return Err(BurdenError::EmptyInput);
        }

        let effective_megabases = effective_bases as f64 / 1_000_000.0;
        let qualifying = self.accepted.len() as u64;

        Ok(BurdenResult {
            qualifying,
            effective_megabases,
            rate_per_megabase: qualifying as f64 / effective_megabases,
            examined: self.examined,
            rejected_by_region: self.rejected_by_region,
            rejected_by_filter: self.rejected_by_filter,
            rejected_by_annotation: self.rejected_by_annotation,
            malformed_skipped: self.malformed_skipped,
        })
    }
}

/// The burden of one variant stream over one effective region. Immutable;
/// computed once per run by [`BurdenTally::finalize`].
#[derive(Debug, Clone, Serialize)]
pub struct BurdenResult {
    pub qualifying: u64,
    pub effective_megabases: f64,
    pub rate_per_megabase: f64,
    pub examined: u64,
    pub rejected_by_region: u64,
    pub rejected_by_filter: u64,
    pub rejected_by_annotation: u64,
    pub malformed_skipped: u64,
}

///
/// Drive a variant stream through the classifier in bounded chunks.
///
/// Records accumulate into chunks of `DEFAULT_CHUNK_SIZE`; each chunk fans
/// out across the rayon pool and classification of one candidate never
/// depends on another. Partial tallies merge once per chunk, the single
/// synchronization point of the pipeline.
///
/// # Arguments
/// - classifier: rule set plus effective regions
/// - variants: lazy stream of parsed records; parse failures arrive inline
/// - on_malformed: abort the run or skip-and-count
///
pub fn tally_variants<I>(
    classifier: &Classifier,
    variants: I,
    on_malformed: MalformedRecordPolicy,
) -> Result<BurdenTally, BurdenError>
where
    I: Iterator<Item = Result<Variant, BurdenError>>,
{
    let mut tally = BurdenTally::new();
    let mut chunk: Vec<Variant> = Vec::with_capacity(DEFAULT_CHUNK_SIZE);
    let mut chunks = 0usize;

    for record in variants {
        match record {
            Ok(variant) => chunk.push(variant),
            Err(error @ BurdenError::MalformedVariantRecord { .. }) => match on_malformed {
                MalformedRecordPolicy::Abort => return Err(error),
                MalformedRecordPolicy::Skip => {
                    debug!("Skipping malformed record: {}", error);
                    tally.record_malformed();
                }
            },
            Err(error) => return Err(error),
        }

        if chunk.len() == DEFAULT_CHUNK_SIZE {
            tally = tally.merge(classify_chunk(classifier, std::mem::take(&mut chunk)));
            chunks += 1;
        }
    }

    if !chunk.is_empty() {
        tally = tally.merge(classify_chunk(classifier, chunk));
        chunks += 1;
    }

    info!(
        "Classified {} candidate mutations across {} chunks",
        tally.examined(),
        chunks
    );

    Ok(tally)
}

fn classify_chunk(classifier: &Classifier, chunk: Vec<Variant>) -> BurdenTally {
    chunk
        .into_par_iter()
        .map(|variant| {
            let mut partial = BurdenTally::new();
            for candidate in variant.candidates() {
                partial.record(&classifier.classify(candidate));
            }
            partial
        })
        .reduce(BurdenTally::new, BurdenTally::merge)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::classify::ClassifierConfig;
    use crate::models::{FilterStatus, GenomicInterval, IntervalSet, Zygosity};

    fn variant(position: u64, reference: &str, alternates: &[&str]) -> Variant {
        Variant {
            contig: "chr1".to_string(),
            position,
            reference: reference.to_string(),
            alternates: alternates.iter().map(|a| a.to_string()).collect(),
            quality: Some(60.0),
            filter: FilterStatus::Pass,
            zygosity: Zygosity::Heterozygous,
            allele_fractions: vec![],
            annotation: None,
        }
    }

    #[fixture]
    fn classifier() -> Classifier {
        let regions =
            IntervalSet::from(vec![GenomicInterval::new("chr1", 0, 1_000_000).unwrap()])
                .normalize();
        Classifier::new(ClassifierConfig::default(), regions)
    }

    fn tally_of(classifier: &Classifier, variants: Vec<Variant>) -> BurdenTally {
        tally_variants(
            classifier,
            variants.into_iter().map(Ok),
            MalformedRecordPolicy::Abort,
        )
        .unwrap()
    }

    #[rstest]
    fn test_identical_calls_count_once(classifier: Classifier) {
        let tally = tally_of(
            &classifier,
            vec![
                variant(100, "A", &["C"]),
                variant(100, "A", &["C"]),
                variant(100, "A", &["G"]),
            ],
        );

        let result = tally.finalize(1_000_000).unwrap();
        assert_eq!(result.qualifying, 2);
        assert_eq!(result.examined, 3);
    }

    #[rstest]
    fn test_dedup_is_arrival_order_independent(classifier: Classifier) {
        let forward = tally_of(
            &classifier,
            vec![variant(100, "A", &["C"]), variant(200, "G", &["T"])],
        );
        let backward = tally_of(
            &classifier,
            vec![variant(200, "G", &["T"]), variant(100, "A", &["C"])],
        );

        assert_eq!(
            forward.finalize(1_000_000).unwrap().qualifying,
            backward.finalize(1_000_000).unwrap().qualifying
        );
    }

    #[rstest]
    fn test_merge_is_associative_and_commutative(classifier: Classifier) {
        let a = tally_of(&classifier, vec![variant(100, "A", &["C"])]);
        let b = tally_of(
            &classifier,
            vec![variant(100, "A", &["C"]), variant(200, "G", &["T"])],
        );
        let c = tally_of(&classifier, vec![variant(5_000_000, "A", &["C"])]);

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = c.merge(a.merge(b));

        let left = left.finalize(1_000_000).unwrap();
        let right = right.finalize(1_000_000).unwrap();
        assert_eq!(left.qualifying, right.qualifying);
        assert_eq!(left.examined, right.examined);
        assert_eq!(left.rejected_by_region, right.rejected_by_region);
    }

    #[rstest]
    fn test_zero_qualifying_is_a_valid_zero_burden(classifier: Classifier) {
        let tally = tally_of(&classifier, vec![variant(5_000_000, "A", &["C"])]);

        let result = tally.finalize(1_000_000).unwrap();
        assert_eq!(result.qualifying, 0);
        assert_eq!(result.rate_per_megabase, 0.0);
        assert_eq!(result.rejected_by_region, 1);
    }

    #[rstest]
    fn test_empty_denominator_fails(classifier: Classifier) {
        let tally = tally_of(&classifier, vec![variant(100, "A", &["C"])]);
        assert!(matches!(
            tally.finalize(0),
            Err(BurdenError::EmptyDenominator)
        ));
    }

    #[rstest]
    fn test_empty_input_fails(classifier: Classifier) {
        let tally = tally_of(&classifier, vec![]);
        assert!(matches!(
            tally.finalize(1_000_000),
            Err(BurdenError::EmptyInput)
        ));
    }

    #[rstest]
    fn test_malformed_policy_abort(classifier: Classifier) {
        let malformed = BurdenError::MalformedVariantRecord {
            path: "test.vcf".to_string(),
            line: 7,
            reason: "truncated".to_string(),
        };

        let result = tally_variants(
            &classifier,
            vec![Ok(variant(100, "A", &["C"])), Err(malformed)].into_iter(),
            MalformedRecordPolicy::Abort,
        );
        assert!(matches!(
            result,
            Err(BurdenError::MalformedVariantRecord { line: 7, .. })
        ));
    }

    #[rstest]
    fn test_malformed_policy_skip_counts_diagnostic(classifier: Classifier) {
        let malformed = BurdenError::MalformedVariantRecord {
            path: "test.vcf".to_string(),
            line: 7,
            reason: "truncated".to_string(),
        };

        let tally = tally_variants(
            &classifier,
            vec![Ok(variant(100, "A", &["C"])), Err(malformed)].into_iter(),
            MalformedRecordPolicy::Skip,
        )
        .unwrap();

        let result = tally.finalize(1_000_000).unwrap();
        assert_eq!(result.malformed_skipped, 1);
        assert_eq!(result.qualifying, 1);
    }

    #[rstest]
    fn test_multiallelic_record_fans_out(classifier: Classifier) {
        let tally = tally_of(&classifier, vec![variant(100, "A", &["C", "G"])]);

        let result = tally.finalize(1_000_000).unwrap();
        assert_eq!(result.examined, 2);
        assert_eq!(result.qualifying, 2);
    }
}
