//! # regstore - A Local Record Store for Registration Submissions
//!
//! regstore keeps registration form submissions as a single JSON collection
//! in a key-value store, and offers querying, statistics, and JSON/CSV
//! export and import on top of it.
//!
//! ## Features
//!
//! - **Pluggable Persistence**: Any [`storage::KeyValueStore`] backend; in-memory and file-backed ones ship
//! - **Queries**: Free-text search, exact-match filters, date ranges and statistics
//! - **Exports**: CSV and JSON bundles handed to a [`export::DownloadSink`]
//! - **Imports**: Bare arrays or earlier export bundles, appended with fresh IDs
//! - **Validation**: All problems with a submission reported at once
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use regstore::export::MemorySink;
//! use regstore::storage::{MemoryStore, RegistrationStore};
//! use regstore::types::NewRegistration;
//!
//! let mut store = RegistrationStore::new(MemoryStore::new(), MemorySink::new());
//! let record = store.create(NewRegistration {
//!     name: "Alice".to_string(),
//!     postal_code: "560001".to_string(),
//!     ..Default::default()
//! })?;
//!
//! assert_eq!(store.read_by_id(record.id), Some(record));
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Records, identifiers and closed category sets
//! - [`storage`] - Key-value backends and the record store
//! - [`export`] - CSV/JSON rendering and download sinks
//! - [`validation`] - Submission checks
//! - [`config`] - Settings and XDG paths
//! - [`error`] - Error types
//! - [`output`] - Terminal formatting for the CLI

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{CliError, StoreError, StoreResult};
pub use storage::{FilterCriteria, KeyValueStore, RegistrationStore, Statistics};
pub use types::{NewRegistration, RecordId, Registration, RegistrationType, Status};
pub use validation::{validate, ValidationReport};
