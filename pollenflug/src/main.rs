//! Binary crate for the `pollenflug` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Locating the settings file
//! - Printing the forecast table and mapping failures to exit codes

use std::{io, process::ExitCode};

use pollen_core::{Defaults, HexalSource, PersistedSettings};

mod cli;
mod error;
mod exitcode;
mod logging;

use crate::{cli::Invocation, error::Failure};

#[tokio::main]
async fn main() -> ExitCode {
    let overrides = match cli::parse_args(std::env::args_os()) {
        Ok(Invocation::Run(overrides)) => overrides,
        Ok(Invocation::Help(text)) => {
            print!("{text}");
            return ExitCode::from(exitcode::OK);
        }
        Err(err) => {
            let failure = Failure::new(err, false);
            failure.report();
            eprintln!("{}", cli::usage());
            return ExitCode::from(failure.exit_code());
        }
    };

    let log = logging::init(overrides.verbose);
    let settings_path = PersistedSettings::default_path();
    let source = HexalSource::new();
    let mut stdout = io::stdout().lock();

    let result = cli::execute(
        &overrides,
        settings_path.as_deref(),
        &Defaults::today(),
        &source,
        &mut stdout,
        |config| log.set_verbose(config.verbose),
    )
    .await;

    match result {
        Ok(()) => ExitCode::from(exitcode::OK),
        Err(failure) => {
            failure.report();
            if failure.is_usage() {
                eprintln!("{}", cli::usage());
            }
            ExitCode::from(failure.exit_code())
        }
    }
}
