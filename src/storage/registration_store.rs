//! The registration record store.
//!
//! The whole collection lives as one JSON array under a single key. Every
//! operation reads it in full, and every mutation writes it back in full.

use super::kv::KeyValueStore;
use super::query::{matches_term, FilterCriteria, Statistics};
use crate::error::{StoreError, StoreResult};
use crate::export::{self, Download, DownloadSink};
use crate::types::{NewRegistration, RecordId, Registration, RESERVED_KEYS};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "registrations";

/// Random fractions tried on one millisecond before moving to the next.
const ID_ATTEMPTS_PER_MILLI: usize = 8;

/// Asks the user to approve a destructive operation.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Record store over an injected key-value backend and download sink.
pub struct RegistrationStore<S, D> {
    backend: S,
    sink: D,
    key: String,
    download_on_create: bool,
}

impl<S: KeyValueStore, D: DownloadSink> RegistrationStore<S, D> {
    /// Create a store using the default storage key.
    pub fn new(backend: S, sink: D) -> Self {
        Self {
            backend,
            sink,
            key: DEFAULT_STORAGE_KEY.to_string(),
            download_on_create: true,
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Control whether `create` delivers a full-collection download.
    pub fn with_download_on_create(mut self, enabled: bool) -> Self {
        self.download_on_create = enabled;
        self
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the collection, propagating backend and parse failures.
    ///
    /// Individual fields that do not fit are preserved as-is. A value that
    /// is not an array of objects with ids is an error, so mutations never
    /// write over data they could not read.
    fn load(&self) -> StoreResult<Vec<Registration>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<Value> = serde_json::from_str(&raw)?;
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let (record, mismatches) = Registration::from_stored(entry)?;
            for mismatch in &mismatches {
                tracing::debug!(
                    id = %record.id,
                    field = %mismatch.field,
                    reason = %mismatch.reason,
                    "stored field kept untyped"
                );
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Write the whole collection back.
    fn persist(&mut self, records: &[Registration]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.set(&self.key, &raw)?;
        tracing::debug!(key = %self.key, count = records.len(), bytes = raw.len(), "collection written");
        Ok(())
    }

    /// Save a new submission and deliver a full-collection download.
    pub fn create(&mut self, data: NewRegistration) -> StoreResult<Registration> {
        let mut records = self.load()?;
        let now = Utc::now();

        let mut id = RecordId::from_timestamp(now);
        if let Some(max) = records
            .iter()
            .map(|r| r.id)
            .max_by(|a, b| a.as_f64().total_cmp(&b.as_f64()))
        {
            if id <= max {
                id = max.next_after();
            }
        }

        let record = data
            .into_registration(id, now)
            .map_err(|e| StoreError::Validation(vec![e.to_string()]))?;

        records.push(record.clone());
        self.persist(&records)?;
        tracing::info!(id = %record.id, name = record.display_name(), "registration created");

        if self.download_on_create {
            // Already persisted; delivery failure is non-fatal.
            if let Err(e) = self.deliver_all_json(&records, now) {
                tracing::warn!(error = %e, "could not deliver collection download");
            }
        }

        Ok(record)
    }

    /// Every stored record, in insertion order. Never fails: an absent,
    /// unreadable or unparsable value reads as empty.
    pub fn read_all(&self) -> Vec<Registration> {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "stored collection is unreadable, treating as empty");
            Vec::new()
        })
    }

    /// First record with the given id.
    pub fn read_by_id(&self, id: RecordId) -> Option<Registration> {
        self.read_all().into_iter().find(|r| r.id == id)
    }

    /// Shallow-merge `partial` over the record at `id` and stamp `updatedAt`.
    ///
    /// Store-assigned keys in `partial` are ignored.
    pub fn update(&mut self, id: RecordId, partial: &Map<String, Value>) -> StoreResult<Registration> {
        let mut records = self.load()?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut fields = match serde_json::to_value(&records[index])? {
            Value::Object(map) => map,
            _ => return Err(StoreError::Storage("record is not a JSON object".to_string())),
        };
        for (key, value) in partial {
            if RESERVED_KEYS.contains(&key.as_str()) {
                tracing::debug!(field = %key, "ignoring store-assigned field in update");
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }

        let (mut merged, mismatches) = Registration::from_stored(Value::Object(fields))
            .map_err(|e| StoreError::Validation(vec![e.to_string()]))?;
        // Foreign values already in storage stay; new ones from `partial` must fit.
        let rejected: Vec<String> = mismatches
            .into_iter()
            .filter(|m| {
                partial.contains_key(&m.field) && !RESERVED_KEYS.contains(&m.field.as_str())
            })
            .map(|m| format!("{}: {}", m.field, m.reason))
            .collect();
        if !rejected.is_empty() {
            return Err(StoreError::Validation(rejected));
        }
        merged.updated_at = Some(Utc::now());

        records[index] = merged.clone();
        self.persist(&records)?;
        tracing::info!(%id, fields = partial.len(), "registration updated");

        Ok(merged)
    }

    /// Remove every record with the given id.
    pub fn delete(&mut self, id: RecordId) -> StoreResult<()> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.persist(&records)?;
        tracing::info!(%id, removed = before - records.len(), "registration deleted");
        Ok(())
    }

    /// Remove the entire collection once `confirm` approves.
    pub fn clear_all(&mut self, confirm: &mut impl Confirm) -> StoreResult<()> {
        let count = self.read_all().len();
        let prompt = format!("Delete all {} registrations? This cannot be undone.", count);

        if !confirm.confirm(&prompt) {
            tracing::debug!("clear declined");
            return Err(StoreError::Cancelled);
        }

        self.backend.remove(&self.key)?;
        tracing::info!(removed = count, "all registrations cleared");
        Ok(())
    }

    /// Aggregate counts over the collection.
    pub fn statistics(&self) -> Statistics {
        Statistics::from_records(&self.read_all())
    }

    /// Records whose name, city, state, status or type contains `term`,
    /// ignoring case.
    pub fn search(&self, term: &str) -> Vec<Registration> {
        self.read_all()
            .into_iter()
            .filter(|r| matches_term(r, term))
            .collect()
    }

    /// Records matching every key present in `criteria`.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<Registration> {
        self.read_all()
            .into_iter()
            .filter(|r| criteria.matches(r))
            .collect()
    }

    /// Records submitted within `[start, end]`, inclusive.
    pub fn date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Registration> {
        self.read_all()
            .into_iter()
            .filter(|r| r.submitted_at.is_some_and(|t| t >= start && t <= end))
            .collect()
    }

    /// The collection as CSV text.
    pub fn export_csv(&self) -> StoreResult<String> {
        export::to_csv(&self.read_all())
    }

    /// The collection wrapped with export metadata, as pretty JSON.
    pub fn export_json_bundle(&self) -> StoreResult<String> {
        export::to_json_bundle(&self.read_all(), Utc::now())
    }

    /// Deliver the CSV export as `registrations_<ts>.csv`.
    pub fn download_csv(&mut self) -> StoreResult<Download> {
        let download = Download::csv(self.export_csv()?, Utc::now());
        self.sink.deliver(&download)?;
        Ok(download)
    }

    /// Deliver the full collection as `all_registrations_<ts>.json`.
    pub fn download_all_json(&mut self) -> StoreResult<Download> {
        let records = self.load()?;
        self.deliver_all_json(&records, Utc::now())
    }

    /// Deliver the metadata bundle as `all_registrations_<ts>.json`.
    pub fn download_json_bundle(&mut self) -> StoreResult<Download> {
        let now = Utc::now();
        let download = Download::all_json(export::to_json_bundle(&self.load()?, now)?, now);
        self.sink.deliver(&download)?;
        Ok(download)
    }

    /// Deliver one record as `registration_<name>_<ts>.json`.
    pub fn export_record_json(&mut self, id: RecordId) -> StoreResult<Download> {
        let record = self
            .read_by_id(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let download = Download::record_json(
            record.name.as_deref().unwrap_or(""),
            export::to_json_record(&record)?,
            Utc::now(),
        );
        self.sink.deliver(&download)?;
        Ok(download)
    }

    fn deliver_all_json(&mut self, records: &[Registration], at: DateTime<Utc>) -> StoreResult<Download> {
        let download = Download::all_json(serde_json::to_string_pretty(records)?, at);
        self.sink.deliver(&download)?;
        Ok(download)
    }

    /// Append the records in `contents` and return how many were imported.
    ///
    /// Accepts a bare array or an object with a `registrations` array. Each
    /// record gets a fresh perturbed id and an `importedAt` stamp. Nothing is
    /// written unless every entry is usable.
    pub fn import_str(&mut self, contents: &str) -> StoreResult<usize> {
        let parsed: Value = serde_json::from_str(contents)
            .map_err(|e| StoreError::InvalidImport(format!("not valid JSON: {}", e)))?;

        let entries = match parsed {
            Value::Array(entries) => entries,
            Value::Object(mut obj) => match obj.remove("registrations") {
                Some(Value::Array(entries)) => entries,
                _ => {
                    return Err(StoreError::InvalidImport(
                        "object has no `registrations` array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(StoreError::InvalidImport(
                    "expected an array or an object with a `registrations` array".to_string(),
                ))
            }
        };

        let mut records = self.load()?;
        let mut taken: HashSet<u64> = records.iter().map(|r| r.id.to_bits()).collect();
        let now = Utc::now();
        let imported_at = serde_json::to_value(now)?;
        // Milliseconds past `now` used as the id base once one fills up.
        let mut offset = 0;

        let mut imported = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let Value::Object(mut fields) = entry else {
                return Err(StoreError::InvalidImport(format!(
                    "entry {} is not an object",
                    index
                )));
            };

            let id = 'pick: loop {
                let base = now + Duration::milliseconds(offset);
                for _ in 0..ID_ATTEMPTS_PER_MILLI {
                    let candidate = RecordId::perturbed(base);
                    if taken.insert(candidate.to_bits()) {
                        break 'pick candidate;
                    }
                }
                offset += 1;
            };

            fields.insert("id".to_string(), serde_json::to_value(id)?);
            fields.insert("importedAt".to_string(), imported_at.clone());

            let record: Registration = serde_json::from_value(Value::Object(fields))
                .map_err(|e| StoreError::InvalidImport(format!("entry {}: {}", index, e)))?;
            imported.push(record);
        }

        let count = imported.len();
        records.extend(imported);
        self.persist(&records)?;
        tracing::info!(count, total = records.len(), "registrations imported");

        Ok(count)
    }

    /// Read `reader` to the end, then import its contents.
    pub async fn import_reader<R: AsyncRead + Unpin>(&mut self, mut reader: R) -> StoreResult<usize> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents).await?;
        self.import_str(&contents)
    }
}
