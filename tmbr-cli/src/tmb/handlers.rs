use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use log::info;

use tmbr_core::io::vcf::{VcfReadOptions, VcfReader};
use tmbr_core::models::IntervalSet;
use tmbr_core::report::{BurdenReport, RunReport};
use tmbr_core::{BurdenError, Classifier, ClassifierConfig, MalformedRecordPolicy, tally_variants};

pub fn run_tmb(matches: &ArgMatches) -> Result<()> {
    let vcfs: Vec<&String> = matches
        .get_many::<String>("vcfs")
        .expect("At least one variant file is required.")
        .collect();
    let targets = matches
        .get_one::<String>("targets")
        .expect("A path to a target-region BED file is required.");

    if let Some(threads) = matches.get_one::<String>("threads") {
        let threads = threads
            .parse::<usize>()
            .with_context(|| format!("Invalid thread count: {}", threads))?;
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let config = build_classifier_config(matches)?;
    let vcf_options = build_vcf_options(matches);
    let on_malformed = match matches.get_flag("skip-malformed") {
        true => MalformedRecordPolicy::Skip,
        false => MalformedRecordPolicy::Abort,
    };

    // Denominator first: normalize the targets, subtract any exclusions.
    let target_set = IntervalSet::try_from(Path::new(targets))?.normalize();
    info!(
        "Target regions: {} intervals covering {} bases",
        target_set.len(),
        target_set.total_length()
    );

    let effective = match matches.get_one::<String>("exclude") {
        Some(exclude) => {
            let exclusions = IntervalSet::try_from(Path::new(exclude))?.normalize();
            info!(
                "Exclusion regions: {} intervals covering {} bases",
                exclusions.len(),
                exclusions.total_length()
            );
            target_set.subtract(&exclusions)
        }
        None => target_set,
    };

    let effective_bases = effective.total_length();
    if effective_bases == 0 {
        return Err(BurdenError::EmptyDenominator).with_context(|| {
            format!(
                "Exclusions fully cover the target regions from {}; check the region inputs",
                targets
            )
        });
    }
    info!("Effective interrogated region: {} bases", effective_bases);

    let classifier = Classifier::new(config, effective);

    let mut reports = Vec::with_capacity(vcfs.len());
    for vcf in vcfs {
        info!("Scoring {}", vcf);
        let reader = VcfReader::with_options(Path::new(vcf), vcf_options.clone())
            .with_context(|| format!("Failed to open variant file: {}", vcf))?;

        let tally = tally_variants(&classifier, reader, on_malformed)
            .with_context(|| format!("Failed while classifying {}", vcf))?;
        let result = tally
            .finalize(effective_bases)
            .with_context(|| format!("No usable candidate mutations in {}", vcf))?;

        info!(
            "{}: {} qualifying / {:.2} Mb = {:.2} mutations/Mb",
            vcf, result.qualifying, result.effective_megabases, result.rate_per_megabase
        );
        reports.push(BurdenReport::from_result(vcf.as_str(), &result));
    }

    let run = RunReport {
        effective_bases,
        reports,
    };
    write_report(&run, matches)
}

fn build_classifier_config(matches: &ArgMatches) -> Result<ClassifierConfig> {
    let parse_fraction = |name: &str| -> Result<Option<f64>> {
        match matches.get_one::<String>(name) {
            Some(value) => Ok(Some(value.parse::<f64>().with_context(|| {
                format!("Invalid value for --{}: {}", name, value)
            })?)),
            None => Ok(None),
        }
    };

    Ok(ClassifierConfig {
        min_quality: parse_fraction("min-qual")?,
        allowed_filters: collect_strings(matches, "allow-filter"),
        include_filtered: matches.get_flag("include-filtered"),
        exclude_germline: matches.get_flag("exclude-germline"),
        min_allele_fraction: parse_fraction("min-af")?,
        excluded_consequences: collect_strings(matches, "exclude-consequence"),
        max_population_af: parse_fraction("max-pop-af")?,
    })
}

fn build_vcf_options(matches: &ArgMatches) -> VcfReadOptions {
    let mut options = VcfReadOptions::default();
    if let Some(key) = matches.get_one::<String>("consequence-key") {
        options.consequence_key = key.clone();
    }
    if let Some(key) = matches.get_one::<String>("pop-af-key") {
        options.population_af_key = key.clone();
    }
    options
}

fn collect_strings(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn write_report(run: &RunReport, matches: &ArgMatches) -> Result<()> {
    let default_format = "json".to_string();
    let format = matches
        .get_one::<String>("format")
        .unwrap_or(&default_format);

    let rendered = match format.as_str() {
        "json" => {
            let mut rendered = serde_json::to_string_pretty(run)?;
            rendered.push('\n');
            rendered
        }
        "yaml" => serde_yaml::to_string(run)?,
        "tsv" => {
            let mut rendered = String::from(BurdenReport::tsv_header());
            rendered.push('\n');
            for report in &run.reports {
                rendered.push_str(&report.to_tsv_row());
                rendered.push('\n');
            }
            rendered
        }
        other => bail!(
            "Invalid output format: {}. Valid options are 'json', 'yaml', or 'tsv'",
            other
        ),
    };

    match matches.get_one::<String>("output") {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
