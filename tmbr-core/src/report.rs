use serde::Serialize;

use crate::burden::BurdenResult;

/// The rendered form of one [`BurdenResult`]: a flat record with the rate in
/// mutations/Mb to two decimal places and every diagnostic counter present.
/// Pure renaming and rounding; no further computation happens here.
#[derive(Debug, Clone, Serialize)]
pub struct BurdenReport {
    pub source: String,
    pub qualifying_mutations: u64,
    pub effective_megabases: f64,
    pub tmb_per_megabase: f64,
    pub candidates_examined: u64,
    pub rejected_by_region: u64,
    pub rejected_by_filter: u64,
    pub rejected_by_annotation: u64,
    pub malformed_skipped: u64,
}

impl BurdenReport {
    pub fn from_result(source: impl Into<String>, result: &BurdenResult) -> Self {
        BurdenReport {
            source: source.into(),
            qualifying_mutations: result.qualifying,
            effective_megabases: round2(result.effective_megabases),
            tmb_per_megabase: round2(result.rate_per_megabase),
            candidates_examined: result.examined,
            rejected_by_region: result.rejected_by_region,
            rejected_by_filter: result.rejected_by_filter,
            rejected_by_annotation: result.rejected_by_annotation,
            malformed_skipped: result.malformed_skipped,
        }
    }

    pub fn tsv_header() -> &'static str {
        "source\tqualifying_mutations\teffective_megabases\ttmb_per_megabase\tcandidates_examined\trejected_by_region\trejected_by_filter\trejected_by_annotation\tmalformed_skipped"
    }

    pub fn to_tsv_row(&self) -> String {
        format!(
            "{}\t{}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{}\t{}",
            self.source,
            self.qualifying_mutations,
            self.effective_megabases,
            self.tmb_per_megabase,
            self.candidates_examined,
            self.rejected_by_region,
            self.rejected_by_filter,
            self.rejected_by_annotation,
            self.malformed_skipped,
        )
    }
}

/// One whole run: the shared denominator plus a report per variant file.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub effective_bases: u64,
    pub reports: Vec<BurdenReport>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
