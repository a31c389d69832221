//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration, data, and downloads.

use crate::error::{ConfigError, ConfigResult};
use crate::storage::DEFAULT_STORAGE_KEY;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/regstore)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/regstore)
    pub data_dir: PathBuf,
    /// Where exports land by default (~/Downloads, or data_dir/downloads)
    pub downloads_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }

        let paths = Self::new()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    /// Initialize paths using XDG directories.
    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "regstore", "regstore")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let data_dir = project.data_dir().to_path_buf();
        let downloads_dir = UserDirs::new()
            .and_then(|u| u.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| data_dir.join("downloads"));

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir,
            downloads_dir,
        };

        // Ensure directories exist
        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the key-value store directory.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Key the collection is stored under.
    pub storage_key: String,
    /// Deliver a full-collection download after every create.
    pub download_on_create: bool,
    /// Override for the downloads directory.
    pub downloads_dir: Option<PathBuf>,
    /// Override for the key-value store directory.
    pub store_dir: Option<PathBuf>,
    /// Default output format for listings.
    pub default_output_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            download_on_create: true,
            downloads_dir: None,
            store_dir: None,
            default_output_format: "plain".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = Paths::get()?;
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to a specific file, creating its directory.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Store directory, honoring the override.
    pub fn resolve_store_dir(&self, paths: &Paths) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| paths.store_dir())
    }

    /// Downloads directory, honoring the override.
    pub fn resolve_downloads_dir(&self, paths: &Paths) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(|| paths.downloads_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.storage_key, "registrations");
        assert!(settings.download_on_create);
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, r#"{"storage_key": "forms"}"#).unwrap();

        let settings = AppSettings::load_from(&file).unwrap();
        assert_eq!(settings.storage_key, "forms");
        assert!(settings.download_on_create);
    }

    #[test]
    fn test_settings_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            download_on_create: false,
            downloads_dir: Some(dir.path().join("out")),
            ..Default::default()
        };

        let file = dir.path().join("nested").join("settings.json");
        settings.save_to(&file).unwrap();
        assert_eq!(AppSettings::load_from(&file).unwrap(), settings);
    }

    #[test]
    fn test_overrides_win() {
        let paths = Paths {
            config_dir: PathBuf::from("/cfg"),
            data_dir: PathBuf::from("/data"),
            downloads_dir: PathBuf::from("/dl"),
        };
        let mut settings = AppSettings::default();
        assert_eq!(settings.resolve_store_dir(&paths), PathBuf::from("/data/store"));

        settings.store_dir = Some(PathBuf::from("/elsewhere"));
        assert_eq!(settings.resolve_store_dir(&paths), PathBuf::from("/elsewhere"));
        assert_eq!(settings.resolve_downloads_dir(&paths), PathBuf::from("/dl"));
    }

    #[test]
    fn test_invalid_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, "[").unwrap();

        assert!(matches!(
            AppSettings::load_from(&file),
            Err(ConfigError::InvalidFormat(_))
        ));
    }
}
