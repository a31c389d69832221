//! Query helpers over an in-memory collection.

use crate::types::{Registration, RegistrationType, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exact-match filter. Absent keys impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub registration_type: Option<RegistrationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, registration_type: RegistrationType) -> Self {
        self.registration_type = Some(registration_type);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check whether `record` satisfies every present key.
    pub fn matches(&self, record: &Registration) -> bool {
        if let Some(t) = self.registration_type {
            if record.registration_type != Some(t) {
                return false;
            }
        }
        if let Some(s) = self.status {
            if record.status != Some(s) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if record.city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if record.state.as_deref() != Some(state.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring match against the searchable fields.
/// Missing fields never match.
pub fn matches_term(record: &Registration, term: &str) -> bool {
    let needle = term.to_lowercase();
    record
        .searchable_fields()
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Aggregate counts over a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub by_type: BTreeMap<RegistrationType, usize>,
    pub by_status: BTreeMap<Status, usize>,
    pub by_city: BTreeMap<String, usize>,
    pub by_state: BTreeMap<String, usize>,
}

impl Statistics {
    /// Compute statistics for `records`.
    ///
    /// Every type and status category is present, zero-filled.
    pub fn from_records(records: &[Registration]) -> Self {
        let mut stats = Self {
            total: records.len(),
            by_type: RegistrationType::ALL.into_iter().map(|t| (t, 0)).collect(),
            by_status: Status::ALL.into_iter().map(|s| (s, 0)).collect(),
            by_city: BTreeMap::new(),
            by_state: BTreeMap::new(),
        };

        for record in records {
            if let Some(t) = record.registration_type {
                *stats.by_type.entry(t).or_default() += 1;
            }
            if let Some(s) = record.status {
                *stats.by_status.entry(s).or_default() += 1;
            }
            if let Some(city) = &record.city {
                *stats.by_city.entry(city.clone()).or_default() += 1;
            }
            if let Some(state) = &record.state {
                *stats.by_state.entry(state.clone()).or_default() += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Registration> {
        serde_json::from_str(
            r#"[
                {"id": 1, "name": "Alice", "city": "Bengaluru", "state": "KA", "type": "Agency", "status": "Active"},
                {"id": 2, "name": "Bob", "city": "Mysuru", "state": "KA", "type": "Individual", "status": "Active"},
                {"id": 3, "name": "Chitra", "city": "Chennai", "state": "TN", "type": "Agency", "status": "Suspended"},
                {"id": 4, "name": "Dev"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_filter_requires_every_present_key() {
        let criteria = FilterCriteria::new()
            .with_type(RegistrationType::Agency)
            .with_state("KA");
        let hits: Vec<_> = records().into_iter().filter(|r| criteria.matches(r)).collect();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let criteria = FilterCriteria::new();
        assert!(criteria.is_empty());
        assert!(records().iter().all(|r| criteria.matches(r)));
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let criteria = FilterCriteria::new().with_state("ka");
        assert!(!records().iter().any(|r| criteria.matches(r)));
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let all = records();
        let by_city: Vec<_> = all.iter().filter(|r| matches_term(r, "mYsU")).collect();
        assert_eq!(by_city.len(), 1);

        let by_status: Vec<_> = all.iter().filter(|r| matches_term(r, "suspend")).collect();
        assert_eq!(by_status.len(), 1);

        // The record with only a name must not trip the search.
        let by_name: Vec<_> = all.iter().filter(|r| matches_term(r, "dev")).collect();
        assert_eq!(by_name.len(), 1);
    }

    #[test]
    fn test_statistics() {
        let stats = Statistics::from_records(&records());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type[&RegistrationType::Agency], 2);
        assert_eq!(stats.by_type[&RegistrationType::SubAgency], 0);
        assert_eq!(stats.by_status[&Status::Active], 2);
        assert_eq!(stats.by_status[&Status::Inactive], 0);
        assert_eq!(stats.by_state["KA"], 2);
        assert_eq!(stats.by_city.len(), 3);
    }

    #[test]
    fn test_statistics_serialize_labels() {
        let stats = Statistics::from_records(&records());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byType"]["Sub Agency"], 0);
        assert_eq!(json["byStatus"]["Suspended"], 1);
    }
}
