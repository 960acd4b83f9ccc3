//! kubesunset CLI - Find deprecated and removed Kubernetes APIs before upgrading

use clap::Parser;
use clap::error::ErrorKind;

mod config;
mod error;
mod exit_codes;
mod logging;
mod output;
mod run;
mod target;

use config::{Cli, Config};
use error::{CliError, Result};

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            let _ = e.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
    };

    logging::init(cli.log_level);

    let code = match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    };
    std::process::exit(code);
}

fn execute(cli: Cli) -> Result<i32> {
    let config = Config::from_cli(cli)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::internal(format!("failed to start async runtime: {}", e)))?;
    runtime.block_on(run::run(config))
}
