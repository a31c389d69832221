//! Configuration management for regstore.
//!
//! Provides XDG-compliant paths and application settings.

mod settings;

pub use settings::{AppSettings, Paths};
