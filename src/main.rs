use anyhow::Result;
use clap::Parser;
use yank::{cli, logging, workflow};

fn main() -> Result<()> {
    let cli_args = cli::Cli::parse();

    // Held until exit so buffered log lines reach the file.
    let _log_guard = logging::init(cli_args.verbose, cli_args.log_file.as_deref())?;

    // Delegate the main application logic to the workflow module
    workflow::run_yank(cli_args)
}
