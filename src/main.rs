//! buildout-lens CLI entry point
//!
//! Parses arguments, runs one command and renders failures through
//! [`user_friendly_error`]. Unknown commands print usage and exit successfully.

use anyhow::Result;
use buildout_lens::cli;
use buildout_lens::core::user_friendly_error;
use clap::Parser;
use clap::error::ErrorKind;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::InvalidSubcommand) => {
            cli::print_help()?;
            return Ok(());
        }
        Err(err) => err.exit(),
    };

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
