// src/main.rs

use std::process::ExitCode;

use pmdwatch::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("pmdwatch: {err:#}");
        return ExitCode::FAILURE;
    }

    // Anything not already reported on stdout (bad config, a failed
    // `--once` pass, a dead monitor) ends the process non-zero.
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pmdwatch: {err:#}");
            ExitCode::FAILURE
        }
    }
}
