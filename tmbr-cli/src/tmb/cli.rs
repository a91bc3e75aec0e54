use clap::{Arg, ArgAction, Command, arg};

pub const TMB_CMD: &str = "tmb";

pub fn create_tmb_cli() -> Command {
    Command::new(TMB_CMD)
        .about("Count qualifying somatic mutations per effective megabase of target region")
        .arg_required_else_help(true)
        .arg(
            Arg::new("vcfs")
                .help("Variant files (VCF, plain or gzipped); one report per file")
                .num_args(1..)
                .required(true),
        )
        .arg(arg!(-t --targets <bed> "Target-region BED file").required(true))
        .arg(arg!(-e --exclude <bed> "Exclusion-region BED subtracted from the targets"))
        .arg(arg!(-o --output <path> "Write the report here instead of stdout"))
        .arg(arg!(-f --format <format> "Output format (json, yaml, or tsv)"))
        .arg(arg!(--"min-qual" <qual> "Candidates below this QUAL do not qualify"))
        .arg(
            arg!(--"allow-filter" <tag> "FILTER tag accepted in addition to PASS (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            arg!(--"include-filtered" "Count candidates regardless of FILTER tags")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"exclude-germline" "Reject homozygous-alternate (germline-looking) calls")
                .action(ArgAction::SetTrue),
        )
        .arg(arg!(--"min-af" <fraction> "Candidates below this sample allele fraction do not qualify"))
        .arg(
            arg!(--"exclude-consequence" <class> "Consequence class that never qualifies (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(arg!(--"max-pop-af" <frequency> "Population allele-frequency ceiling"))
        .arg(arg!(--"consequence-key" <key> "INFO key carrying the consequence class"))
        .arg(arg!(--"pop-af-key" <key> "INFO key carrying the population allele frequency"))
        .arg(
            arg!(--"skip-malformed" "Skip and count malformed records instead of aborting")
                .action(ArgAction::SetTrue),
        )
        .arg(arg!(--threads <count> "Number of worker threads for classification"))
}
