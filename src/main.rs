mod cli;
mod dir_scan;
mod error;
mod form;
mod jobs;
mod logging;
mod modal;
mod page;
mod selection;
mod submit;
mod tree_builder;
mod tree_view;
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli_args = cli::Cli::parse();
    let _log_guard = logging::init(&cli_args.log_file)?;

    // Delegate the main application logic to the workflow module
    workflow::run_tarpick(cli_args)
}
