//! Registration records and form input.
//!
//! `Registration` is the stored shape and tolerates missing fields so that
//! partial imports survive. `NewRegistration` is the raw form submission
//! before the store assigns identity and timestamps.

use super::category::{CategoryError, RegistrationType, Status};
use super::record_id::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

/// Schema version stamped on every record.
pub const RECORD_VERSION: &str = "1.0";

/// Keys the store assigns itself; never taken from form input.
pub const RESERVED_KEYS: &[&str] = &["id", "submittedAt", "updatedAt", "importedAt", "version"];

/// Wire names of the typed fields other than `id`.
const TYPED_KEYS: &[&str] = &[
    "name",
    "email",
    "address1",
    "address2",
    "city",
    "state",
    "postalCode",
    "dob",
    "gender",
    "status",
    "type",
    "onboardingDate",
    "cityMulti",
    "pinCode",
    "areaMulti",
    "languages",
    "submittedAt",
    "updatedAt",
    "importedAt",
    "version",
];

/// A stored value that did not fit its typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    /// Wire name of the field.
    pub field: String,
    /// Why the value was rejected.
    pub reason: String,
}

fn default_version() -> String {
    RECORD_VERSION.to_string()
}

/// Treat `null` and blank strings as absent, otherwise parse into `T`.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// A persisted registration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Numeric identifier assigned on create or import.
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Six-digit postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Status>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_type: Option<RegistrationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub city_multi: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pin_code: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub area_multi: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// When the record was first saved. Never changes afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the record was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// When the record entered the store through an import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
    /// Fields this version does not know about, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Registration {
    /// Parse a record as found in storage.
    ///
    /// Values that do not fit their typed field (an unknown `status`, a
    /// numeric `postalCode`) are kept verbatim in `extra` under their own
    /// key, leaving the typed field empty, and reported as mismatches.
    /// Only a non-object or an unusable `id` is an error.
    pub fn from_stored(value: Value) -> Result<(Self, Vec<FieldMismatch>), serde_json::Error> {
        if let Ok(record) = Self::deserialize(&value) {
            return Ok((record, Vec::new()));
        }
        let Value::Object(mut fields) = value else {
            return Self::deserialize(value).map(|record| (record, Vec::new()));
        };

        let mut held = Map::new();
        let mut mismatches = Vec::new();
        for key in TYPED_KEYS {
            let Some(candidate) = fields.get(*key) else {
                continue;
            };
            let mut single = Map::new();
            single.insert("id".to_string(), Value::from(0));
            single.insert(key.to_string(), candidate.clone());

            if let Err(e) = Self::deserialize(&Value::Object(single)) {
                if let Some(raw) = fields.remove(*key) {
                    held.insert(key.to_string(), raw);
                }
                mismatches.push(FieldMismatch {
                    field: key.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        let mut record = Self::deserialize(Value::Object(fields))?;
        record.extra.extend(held);
        Ok((record, mismatches))
    }

    /// Display name, or a placeholder when the record has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    /// Fields consulted by free-text search, in order.
    pub fn searchable_fields(&self) -> [Option<&str>; 5] {
        [
            self.name.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.status.map(Status::as_str),
            self.registration_type.map(RegistrationType::as_str),
        ]
    }

    /// Get a short summary of the record.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] {}, {} ({})",
            self.display_name(),
            self.id,
            self.city.as_deref().unwrap_or("-"),
            self.state.as_deref().unwrap_or("-"),
            self.status.map_or("-", Status::as_str)
        )
    }
}

/// A form submission that has not been saved yet.
///
/// Every field defaults to empty so partial input still deserializes and
/// can be reported on by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewRegistration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub dob: String,
    pub gender: String,
    pub status: String,
    #[serde(rename = "type")]
    pub registration_type: String,
    pub onboarding_date: String,
    pub city_multi: Vec<String>,
    pub pin_code: Vec<String>,
    pub area_multi: Vec<String>,
    pub languages: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl NewRegistration {
    /// Turn the submission into a stored record with the given identity.
    ///
    /// `type` and `status` must be blank or members of their closed sets.
    pub fn into_registration(
        self,
        id: RecordId,
        submitted_at: DateTime<Utc>,
    ) -> Result<Registration, CategoryError> {
        let status = match self.status.trim() {
            "" => None,
            s => Some(s.parse::<Status>()?),
        };
        let registration_type = match self.registration_type.trim() {
            "" => None,
            s => Some(s.parse::<RegistrationType>()?),
        };

        let mut extra = self.extra;
        for key in RESERVED_KEYS {
            extra.remove(*key);
        }

        Ok(Registration {
            id,
            name: non_blank(self.name),
            email: self.email.and_then(non_blank),
            address1: non_blank(self.address1),
            address2: self.address2.and_then(non_blank),
            city: non_blank(self.city),
            state: non_blank(self.state),
            postal_code: non_blank(self.postal_code),
            dob: non_blank(self.dob),
            gender: non_blank(self.gender),
            status,
            registration_type,
            onboarding_date: non_blank(self.onboarding_date),
            city_multi: self.city_multi,
            pin_code: self.pin_code,
            area_multi: self.area_multi,
            languages: self.languages,
            submitted_at: Some(submitted_at),
            updated_at: None,
            imported_at: None,
            version: default_version(),
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> NewRegistration {
        NewRegistration {
            name: "Alice".to_string(),
            address1: "1 Main Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
            dob: "1990-01-01".to_string(),
            gender: "Female".to_string(),
            status: "Active".to_string(),
            registration_type: "Sub Agency".to_string(),
            onboarding_date: "2024-01-01".to_string(),
            city_multi: vec!["A".to_string()],
            pin_code: vec!["560001".to_string()],
            area_multi: vec!["X".to_string()],
            languages: vec!["en".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_into_registration_stamps_metadata() {
        let now = Utc::now();
        let id = RecordId::from_timestamp(now);
        let record = alice().into_registration(id, now).unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.version, RECORD_VERSION);
        assert_eq!(record.submitted_at, Some(now));
        assert_eq!(record.registration_type, Some(RegistrationType::SubAgency));
        assert!(record.address2.is_none());
    }

    #[test]
    fn test_into_registration_rejects_unknown_status() {
        let mut input = alice();
        input.status = "Pending".to_string();
        let now = Utc::now();
        assert!(input
            .into_registration(RecordId::from_timestamp(now), now)
            .is_err());
    }

    #[test]
    fn test_reserved_keys_dropped_from_input() {
        let input: NewRegistration =
            serde_json::from_str(r#"{"name": "Eve", "id": 1, "version": "9.9", "note": "x"}"#)
                .unwrap();
        let now = Utc::now();
        let record = input
            .into_registration(RecordId::from_timestamp(now), now)
            .unwrap();

        assert_eq!(record.version, RECORD_VERSION);
        assert!(!record.extra.contains_key("id"));
        assert_eq!(record.extra["note"], "x");
    }

    #[test]
    fn test_camel_case_wire_names() {
        let now = Utc::now();
        let record = alice()
            .into_registration(RecordId::from_timestamp(now), now)
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["postalCode"], "560001");
        assert_eq!(json["type"], "Sub Agency");
        assert_eq!(json["cityMulti"][0], "A");
        assert_eq!(json["version"], "1.0");
        assert!(json.get("submittedAt").is_some());
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn test_partial_record_deserializes() {
        let record: Registration =
            serde_json::from_str(r#"{"id": 12, "name": "Bob", "type": "", "hobby": "chess"}"#)
                .unwrap();

        assert_eq!(record.name.as_deref(), Some("Bob"));
        assert!(record.registration_type.is_none());
        assert_eq!(record.version, RECORD_VERSION);
        assert_eq!(record.extra["hobby"], "chess");
    }

    #[test]
    fn test_from_stored_keeps_foreign_values() {
        let value = serde_json::json!({
            "id": 2,
            "name": "Bob",
            "status": "Pending",
            "postalCode": 560001,
            "type": "Agency"
        });
        let (record, mismatches) = Registration::from_stored(value).unwrap();

        assert_eq!(record.name.as_deref(), Some("Bob"));
        assert!(record.status.is_none());
        assert!(record.postal_code.is_none());
        assert_eq!(record.registration_type, Some(RegistrationType::Agency));
        let fields: Vec<&str> = mismatches.iter().map(|m| m.field.as_str()).collect();
        assert_eq!(fields, vec!["postalCode", "status"]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["postalCode"], 560001);
    }

    #[test]
    fn test_from_stored_needs_an_id() {
        assert!(Registration::from_stored(serde_json::json!({"name": "NoId"})).is_err());
        assert!(Registration::from_stored(serde_json::json!("text")).is_err());
    }

    #[test]
    fn test_searchable_fields_skip_missing() {
        let record: Registration = serde_json::from_str(r#"{"id": 1, "city": "Pune"}"#).unwrap();
        let fields = record.searchable_fields();
        assert_eq!(fields[0], None);
        assert_eq!(fields[1], Some("Pune"));
    }
}
