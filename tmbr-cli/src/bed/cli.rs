use clap::{ArgAction, Command, arg};

pub const BED_CMD: &str = "bed";

pub fn create_bed_cli() -> Command {
    Command::new(BED_CMD)
        .about("Derive a target-region BED from runs of target letters in a genome FASTA")
        .arg_required_else_help(true)
        .arg(arg!(<fasta> "Genome FASTA file (plain or gzipped)").required(true))
        .arg(arg!(-o --output <bed> "Output BED path; gzip when it ends in .gz").required(true))
        .arg(arg!(--"target-letters" <letters> "Nucleic acid codes to include"))
        .arg(
            arg!(--"uppercase-only" "Drop soft-masked (lowercase) sequence")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"autosomes-only" "Keep only human autosomes (chr1-chr22)")
                .action(ArgAction::SetTrue),
        )
}
