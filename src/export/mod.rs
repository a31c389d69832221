//! Export formats and download delivery.
//!
//! Exports are rendered to strings and handed to a [`DownloadSink`] together
//! with a MIME type and a suggested filename.

mod csv_format;
mod json_format;

pub use csv_format::{to_csv, CSV_HEADER};
pub use json_format::{to_json_bundle, to_json_record, ExportBundle, ExportMetadata};

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub const MIME_JSON: &str = "application/json";
pub const MIME_CSV: &str = "text/csv";

/// A file ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime_type: String,
    pub contents: String,
}

impl Download {
    /// Full-collection JSON export.
    pub fn all_json(contents: String, at: DateTime<Utc>) -> Self {
        Self {
            filename: format!("all_registrations_{}.json", at.timestamp_millis()),
            mime_type: MIME_JSON.to_string(),
            contents,
        }
    }

    /// Single-record JSON export named after the registrant.
    pub fn record_json(name: &str, contents: String, at: DateTime<Utc>) -> Self {
        Self {
            filename: format!(
                "registration_{}_{}.json",
                sanitize_name(name),
                at.timestamp_millis()
            ),
            mime_type: MIME_JSON.to_string(),
            contents,
        }
    }

    /// Full-collection CSV export.
    pub fn csv(contents: String, at: DateTime<Utc>) -> Self {
        Self {
            filename: format!("registrations_{}.csv", at.timestamp_millis()),
            mime_type: MIME_CSV.to_string(),
            contents,
        }
    }
}

/// Collapse whitespace runs to `_`, then drop anything that is not
/// alphanumeric or `_`.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            in_space = false;
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
            }
        }
    }

    out
}

/// Receives finished exports.
pub trait DownloadSink {
    fn deliver(&mut self, download: &Download) -> StoreResult<()>;
}

/// Keeps every delivered download in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub downloads: Vec<Download>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent download, if any.
    pub fn last(&self) -> Option<&Download> {
        self.downloads.last()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, download: &Download) -> StoreResult<()> {
        self.downloads.push(download.clone());
        Ok(())
    }
}

/// Writes downloads as files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, download: &Download) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::Export(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(&download.filename);
        fs::write(&path, &download.contents)
            .map_err(|e| StoreError::Export(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), mime = %download.mime_type, "download written");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Alice Smith"), "Alice_Smith");
        assert_eq!(sanitize_name("  Dr. J.  O'Neil "), "_Dr_J_ONeil_");
        assert_eq!(sanitize_name("a_b-c"), "a_bc");
    }

    #[test]
    fn test_filenames() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        assert_eq!(
            Download::all_json(String::new(), at).filename,
            "all_registrations_1700000000000.json"
        );
        assert_eq!(
            Download::record_json("Alice Smith", String::new(), at).filename,
            "registration_Alice_Smith_1700000000000.json"
        );

        let csv = Download::csv(String::new(), at);
        assert_eq!(csv.filename, "registrations_1700000000000.csv");
        assert_eq!(csv.mime_type, MIME_CSV);
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("downloads"));
        let at = Utc::now();

        sink.deliver(&Download::csv("a,b\n".to_string(), at)).unwrap();

        assert_eq!(sink.written().len(), 1);
        assert_eq!(fs::read_to_string(&sink.written()[0]).unwrap(), "a,b\n");
    }
}
