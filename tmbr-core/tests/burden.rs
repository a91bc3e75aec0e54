use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;

use tmbr_core::burden::BurdenResult;
use tmbr_core::io::vcf::VcfReader;
use tmbr_core::models::IntervalSet;
use tmbr_core::report::BurdenReport;
use tmbr_core::{BurdenError, Classifier, ClassifierConfig, MalformedRecordPolicy, tally_variants};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn run_pipeline(
    vcf: &str,
    targets: &str,
    exclusions: Option<&str>,
) -> Result<BurdenResult, BurdenError> {
    let targets = IntervalSet::try_from(data(targets).as_path())
        .unwrap()
        .normalize();

    let effective = match exclusions {
        Some(exclusions) => {
            let exclusions = IntervalSet::try_from(data(exclusions).as_path())
                .unwrap()
                .normalize();
            targets.subtract(&exclusions)
        }
        None => targets,
    };
    let effective_bases = effective.total_length();

    let classifier = Classifier::new(ClassifierConfig::default(), effective);
    let reader = VcfReader::from_path(&data(vcf)).unwrap();
    let tally = tally_variants(&classifier, reader, MalformedRecordPolicy::Abort)?;

    tally.finalize(effective_bases)
}

// 2 Mb of target, 10 accepted variants
#[rstest]
fn test_scenario_two_megabases_no_exclusions() {
    let result = run_pipeline("tumor.vcf", "targets_2mb.bed", None).unwrap();

    assert_eq!(result.qualifying, 10);
    assert_eq!(result.effective_megabases, 2.0);
    assert_eq!(result.rate_per_megabase, 5.0);

    let report = BurdenReport::from_result("tumor.vcf", &result);
    assert_eq!(report.tmb_per_megabase, 5.00);
}

// the same 10 variants over 1 Mb after subtracting half the target
#[rstest]
fn test_scenario_exclusion_halves_the_denominator() {
    let result = run_pipeline("tumor.vcf", "targets_2mb.bed", Some("exclusions_1mb.bed")).unwrap();

    assert_eq!(result.qualifying, 10);
    assert_eq!(result.effective_megabases, 1.0);
    assert_eq!(result.rate_per_megabase, 10.0);
}

#[rstest]
fn test_scenario_fully_excluded_target_fails() {
    let result = run_pipeline("tumor.vcf", "targets_2mb.bed", Some("exclusions_full.bed"));
    assert!(matches!(result, Err(BurdenError::EmptyDenominator)));
}

// one record, two alternate alleles: after allele trimming one lands inside
// the target and qualifies, the other lands outside it
#[rstest]
fn test_scenario_multiallelic_record_splits_across_the_boundary() {
    let result = run_pipeline("multiallelic.vcf", "targets_2mb.bed", None).unwrap();

    assert_eq!(result.examined, 2);
    assert_eq!(result.qualifying, 1);
    assert_eq!(result.rejected_by_region, 1);
}

#[rstest]
fn test_gzipped_input_scores_identically() {
    let plain = run_pipeline("tumor.vcf", "targets_2mb.bed", None).unwrap();
    let gzipped = run_pipeline("tumor.vcf.gz", "targets_2mb.bed", None).unwrap();

    assert_eq!(plain.qualifying, gzipped.qualifying);
    assert_eq!(plain.rate_per_megabase, gzipped.rate_per_megabase);
}

// re-ordered input must not change the outcome
#[rstest]
fn test_reordered_input_is_reproducible() {
    let targets = IntervalSet::try_from(data("targets_2mb.bed").as_path())
        .unwrap()
        .normalize();
    let effective_bases = targets.total_length();
    let classifier = Classifier::new(ClassifierConfig::default(), targets);

    let mut records: Vec<_> = VcfReader::from_path(&data("tumor.vcf"))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    records.reverse();

    let tally = tally_variants(
        &classifier,
        records.into_iter().map(Ok),
        MalformedRecordPolicy::Abort,
    )
    .unwrap();
    let result = tally.finalize(effective_bases).unwrap();

    assert_eq!(result.qualifying, 10);
    assert_eq!(result.rate_per_megabase, 5.0);
}
