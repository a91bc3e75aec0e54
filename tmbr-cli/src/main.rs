mod bed;
mod tmb;

use anyhow::Result;
use clap::{ArgAction, Command, arg};
use env_logger::Env;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "tmbr";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Somatic variant filtering and interval-normalized tumor mutational burden.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Print debug-level progress messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(tmb::cli::create_tmb_cli())
        .subcommand(bed::cli::create_bed_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let default_level = match matches.get_flag("verbose") {
        true => "debug",
        false => "info",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match matches.subcommand() {
        //
        // TMB
        //
        Some((tmb::cli::TMB_CMD, matches)) => {
            tmb::handlers::run_tmb(matches)?;
        }

        //
        // TARGET-REGION BED FROM FASTA
        //
        Some((bed::cli::BED_CMD, matches)) => {
            bed::handlers::run_bed(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
