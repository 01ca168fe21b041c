//! `index-info`: JSON summary of the template index.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::Engine;
use crate::config::LensConfig;

/// Index the templates and print a JSON summary to stdout.
#[derive(Args, Debug)]
pub struct IndexInfoCommand {
    /// Print the JSON on a single line
    #[arg(long)]
    compact: bool,
}

impl IndexInfoCommand {
    pub async fn execute(self, settings: &LensConfig, templates: &[PathBuf]) -> Result<()> {
        let engine = Engine::load(settings, templates).await?;
        let summary = engine.index.summary();

        let json = if self.compact {
            serde_json::to_string(&summary)?
        } else {
            serde_json::to_string_pretty(&summary)?
        };
        println!("{json}");
        Ok(())
    }
}
