//! Registration persistence.
//!
//! Provides the key-value backends and the record store built on them,
//! with query and statistics helpers.

mod kv;
mod query;
mod registration_store;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use query::{matches_term, FilterCriteria, Statistics};
pub use registration_store::{Confirm, RegistrationStore, DEFAULT_STORAGE_KEY};
