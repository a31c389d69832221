//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `regstore add|list|show|update|delete|clear` - Manage registrations
//! - `regstore stats|search|filter|range` - Query the collection
//! - `regstore export|import|validate` - Move records in and out
//! - `regstore init` - Write a settings file

mod export;
mod init;
mod query;
mod records;

pub use export::{ExportCommand, ExportFormat, ImportCommand, ValidateCommand};
pub use init::InitCommand;
pub use query::{FilterCommand, RangeCommand, SearchCommand, StatsCommand};
pub use records::{
    AddCommand, ClearCommand, DeleteCommand, ListCommand, ShowCommand, StdinConfirm,
    UpdateCommand,
};

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::export::DirectorySink;
use crate::storage::{FileStore, RegistrationStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The store as the CLI uses it: files on disk, downloads into a directory.
pub type CliStore = RegistrationStore<FileStore, DirectorySink>;

/// regstore - a local record store for registration form submissions.
///
/// Registrations are kept as one JSON collection on disk. Records can be
/// queried, exported to JSON or CSV, and imported from earlier exports.
#[derive(Parser, Debug)]
#[command(name = "regstore")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A local record store for registration submissions", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for exported files
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the record store
    #[arg(long, global = true, value_name = "DIR", env = "REGSTORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a new registration from a JSON file
    #[command(alias = "a")]
    Add(AddCommand),

    /// List stored registrations
    #[command(alias = "ls")]
    List(ListCommand),

    /// Show one registration
    Show(ShowCommand),

    /// Update fields of a registration
    Update(UpdateCommand),

    /// Delete a registration
    #[command(alias = "rm")]
    Delete(DeleteCommand),

    /// Delete every registration
    Clear(ClearCommand),

    /// Show collection statistics
    Stats(StatsCommand),

    /// Search name, city, state, status and type
    #[command(alias = "s")]
    Search(SearchCommand),

    /// Filter by exact type, status, city and state
    Filter(FilterCommand),

    /// List registrations submitted within a date range
    Range(RangeCommand),

    /// Export registrations as JSON or CSV
    #[command(alias = "e")]
    Export(ExportCommand),

    /// Import registrations from a JSON export
    #[command(alias = "i")]
    Import(ImportCommand),

    /// Check a registration file without saving it
    Validate(ValidateCommand),

    /// Write a settings file with the current values
    Init(InitCommand),
}

impl Commands {
    /// Execute the selected subcommand.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        match self {
            Self::Add(cmd) => cmd.execute(ctx),
            Self::List(cmd) => cmd.execute(ctx),
            Self::Show(cmd) => cmd.execute(ctx),
            Self::Update(cmd) => cmd.execute(ctx),
            Self::Delete(cmd) => cmd.execute(ctx),
            Self::Clear(cmd) => cmd.execute(ctx),
            Self::Stats(cmd) => cmd.execute(ctx),
            Self::Search(cmd) => cmd.execute(ctx),
            Self::Filter(cmd) => cmd.execute(ctx),
            Self::Range(cmd) => cmd.execute(ctx),
            Self::Export(cmd) => cmd.execute(ctx),
            Self::Import(cmd) => cmd.execute(ctx).await,
            Self::Validate(cmd) => cmd.execute(ctx),
            Self::Init(cmd) => cmd.execute(ctx),
        }
    }
}

/// Resolved settings and directories shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    /// Settings file in effect, whether or not it exists yet.
    pub config_file: PathBuf,
    pub store_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// Resolve settings and directories from the command line.
    pub fn load(cli: &Cli) -> CliResult<Self> {
        let paths = Paths::get()?;
        let creating = matches!(cli.command, Commands::Init(_));
        let (settings, config_file) = match &cli.config {
            Some(path) if creating && !path.exists() => (AppSettings::default(), path.clone()),
            Some(path) => (AppSettings::load_from(path)?, path.clone()),
            None => (AppSettings::load()?, paths.settings_file()),
        };

        let store_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| settings.resolve_store_dir(paths));
        let downloads_dir = cli
            .output_dir
            .clone()
            .unwrap_or_else(|| settings.resolve_downloads_dir(paths));

        tracing::debug!(
            store = %store_dir.display(),
            downloads = %downloads_dir.display(),
            key = %settings.storage_key,
            "context resolved"
        );

        Ok(Self {
            settings,
            config_file,
            store_dir,
            downloads_dir,
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// Open the record store described by this context.
    pub fn open_store(&self) -> CliResult<CliStore> {
        let backend = FileStore::open(&self.store_dir)?;
        let sink = DirectorySink::new(&self.downloads_dir);

        Ok(RegistrationStore::new(backend, sink)
            .with_key(&self.settings.storage_key)
            .with_download_on_create(self.settings.download_on_create))
    }

    /// Default listing format from settings.
    pub fn default_format(&self) -> OutputFormat {
        match self.settings.default_output_format.as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Plain,
        }
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A context rooted in a temporary directory.
    pub fn context(dir: &std::path::Path) -> Context {
        Context {
            settings: AppSettings::default(),
            config_file: dir.join("settings.json"),
            store_dir: dir.join("store"),
            downloads_dir: dir.join("downloads"),
            verbose: false,
            quiet: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_flags() {
        let cli = Cli::try_parse_from([
            "regstore", "filter", "--type", "Sub Agency", "--state", "KA",
        ])
        .unwrap();

        match cli.command {
            Commands::Filter(cmd) => {
                assert_eq!(cmd.state.as_deref(), Some("KA"));
                assert!(cmd.registration_type.is_some());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["regstore", "filter", "--status", "Pending"]).is_err());
    }

    #[test]
    fn test_open_store_uses_settings_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_support::context(dir.path());
        ctx.settings.storage_key = "forms".to_string();

        let store = ctx.open_store().unwrap();
        assert_eq!(store.key(), "forms");
        assert!(dir.path().join("store").exists());
    }
}
