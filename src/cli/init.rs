//! Init subcommand.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;

/// Write the settings in effect to the settings file.
#[derive(Parser, Debug)]
pub struct InitCommand {
    /// Overwrite an existing settings file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let path = &ctx.config_file;
        if path.exists() && !self.force {
            return Err(CliError::Other(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        ctx.settings.save_to(path)?;
        tracing::info!(path = %path.display(), "settings written");

        if !ctx.quiet {
            output::print_success(&format!("Wrote settings to {}", path.display()));
        }
        Ok(())
    }
}
