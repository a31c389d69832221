//! JSON export of the registration collection.

use crate::error::StoreResult;
use crate::types::{Registration, RECORD_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata block of a collection export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: DateTime<Utc>,
    pub total_users: usize,
    pub version: String,
}

/// A full collection export: metadata plus every record.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle<'a> {
    pub metadata: ExportMetadata,
    pub registrations: &'a [Registration],
}

impl<'a> ExportBundle<'a> {
    /// Wrap `records` with metadata stamped at `exported_at`.
    pub fn new(records: &'a [Registration], exported_at: DateTime<Utc>) -> Self {
        Self {
            metadata: ExportMetadata {
                export_date: exported_at,
                total_users: records.len(),
                version: RECORD_VERSION.to_string(),
            },
            registrations: records,
        }
    }
}

/// Render the collection bundle with 2-space indentation.
pub fn to_json_bundle(records: &[Registration], exported_at: DateTime<Utc>) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(&ExportBundle::new(
        records,
        exported_at,
    ))?)
}

/// Render a single record with 2-space indentation.
pub fn to_json_record(record: &Registration) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_bundle_shape() {
        let records: Vec<Registration> = serde_json::from_str(
            r#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#,
        )
        .unwrap();
        let json = to_json_bundle(&records, Utc::now()).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["metadata"]["totalUsers"], 2);
        assert_eq!(parsed["metadata"]["version"], "1.0");
        assert!(parsed["metadata"]["exportDate"].is_string());
        assert_eq!(parsed["registrations"][1]["name"], "Bob");
        assert!(json.contains("\n  \"metadata\""));
    }

    #[test]
    fn test_bundle_of_empty_collection() {
        let json = to_json_bundle(&[], Utc::now()).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["metadata"]["totalUsers"], 0);
        assert_eq!(parsed["registrations"], Value::Array(vec![]));
    }
}
