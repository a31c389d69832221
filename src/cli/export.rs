//! Export, import and validate subcommands.
//!
//! `regstore export` delivers files into the downloads directory,
//! `regstore import` appends records from an earlier export.

use super::Context;
use crate::error::{CliError, CliResult, StoreError};
use crate::output;
use crate::types::{NewRegistration, RecordId};
use crate::validation;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// File format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// JSON bundle with export metadata
    #[default]
    Json,
    /// CSV with one row per registration
    Csv,
}

/// Export registrations.
#[derive(Parser, Debug)]
pub struct ExportCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Export a single registration (JSON only)
    #[arg(long, value_name = "ID")]
    pub id: Option<RecordId>,

    /// Export the plain record array without metadata (JSON only)
    #[arg(long, conflicts_with = "id")]
    pub bare: bool,

    /// Print to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

impl ExportCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        if self.bare && self.format == ExportFormat::Csv {
            return Err(CliError::Other(
                "--bare only applies to JSON exports".to_string(),
            ));
        }
        let mut store = ctx.open_store()?;

        if self.stdout {
            let content = match (self.id, self.format) {
                (Some(id), _) => {
                    let record = store
                        .read_by_id(id)
                        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                    crate::export::to_json_record(&record)?
                }
                (None, ExportFormat::Json) if self.bare => {
                    serde_json::to_string_pretty(&store.read_all()).map_err(StoreError::from)?
                }
                (None, ExportFormat::Json) => store.export_json_bundle()?,
                (None, ExportFormat::Csv) => store.export_csv()?,
            };
            print!("{}", content);
            if !content.is_empty() && !content.ends_with('\n') {
                println!();
            }
            return Ok(());
        }

        let download = match (self.id, self.format) {
            (Some(_), ExportFormat::Csv) => {
                return Err(CliError::Other(
                    "single-record export is only available as JSON".to_string(),
                ))
            }
            (Some(id), ExportFormat::Json) => store.export_record_json(id)?,
            (None, ExportFormat::Json) if self.bare => store.download_all_json()?,
            (None, ExportFormat::Json) => store.download_json_bundle()?,
            (None, ExportFormat::Csv) => store.download_csv()?,
        };

        if !ctx.quiet {
            let path = store.sink().dir().join(&download.filename);
            output::print_success(&format!("Exported to {}", path.display()));
        }

        Ok(())
    }
}

/// Import registrations from a JSON file.
#[derive(Parser, Debug)]
pub struct ImportCommand {
    /// JSON file: an array of registrations or an export bundle
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

impl ImportCommand {
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let file = tokio::fs::File::open(&self.file).await.map_err(|e| {
            CliError::Other(format!("cannot open {}: {}", self.file.display(), e))
        })?;

        let mut store = ctx.open_store()?;
        let count = store.import_reader(file).await?;

        if !ctx.quiet {
            output::print_success(&format!(
                "Imported {} registration(s) from {}",
                count,
                self.file.display()
            ));
        }

        Ok(())
    }
}

/// Validate a registration file without saving it.
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// JSON file holding the form submission
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateCommand {
    pub fn execute(&self, _ctx: &Context) -> CliResult<()> {
        let content = fs::read_to_string(&self.file)?;
        let data: NewRegistration = serde_json::from_str(&content).map_err(StoreError::from)?;
        let report = validation::validate(&data);

        if self.json {
            output::print_json(&report)?;
        } else {
            output::print_validation(&report);
        }

        if report.valid {
            Ok(())
        } else {
            Err(CliError::Other(format!(
                "{} validation error(s) in {}",
                report.errors.len(),
                self.file.display()
            )))
        }
    }
}
