use std::process::ExitCode;

use clap::Parser;
use mesh_config::DaemonOptions;

fn main() -> ExitCode {
    let options = DaemonOptions::parse();
    if let Err(error) = meshd::initialise_telemetry(&options.log_filter, options.log_format) {
        eprintln!("meshd: {error}");
        return ExitCode::FAILURE;
    }
    match meshd::run_daemon(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("meshd: {error}");
            ExitCode::FAILURE
        }
    }
}
