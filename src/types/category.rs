//! Closed category sets for registrations.
//!
//! `type` and `status` accept a fixed set of values. Unknown values are
//! rejected when parsed rather than silently ignored later.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of registrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegistrationType {
    Individual,
    Agency,
    #[serde(rename = "Sub Agency")]
    SubAgency,
}

impl RegistrationType {
    /// All variants, in display order.
    pub const ALL: [RegistrationType; 3] = [Self::Individual, Self::Agency, Self::SubAgency];

    /// The stored label for this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Agency => "Agency",
            Self::SubAgency => "Sub Agency",
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationType {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CategoryError::UnknownType(s.to_string()))
    }
}

/// Lifecycle status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Active,
    Inactive,
    Suspended,
}

impl Status {
    /// All variants, in display order.
    pub const ALL: [Status; 3] = [Self::Active, Self::Inactive, Self::Suspended];

    /// The stored label for this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CategoryError::UnknownStatus(s.to_string()))
    }
}

/// Error type for category parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    #[error("unknown registration type '{0}' (expected Individual, Agency or Sub Agency)")]
    UnknownType(String),
    #[error("unknown status '{0}' (expected Active, Inactive or Suspended)")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_agency_label() {
        let parsed: RegistrationType = "Sub Agency".parse().unwrap();
        assert_eq!(parsed, RegistrationType::SubAgency);
        assert_eq!(
            serde_json::to_string(&RegistrationType::SubAgency).unwrap(),
            "\"Sub Agency\""
        );
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!("agency".parse::<RegistrationType>().is_err());
        assert!("Pending".parse::<Status>().is_err());
        assert!(serde_json::from_str::<Status>("\"Pending\"").is_err());
    }

    #[test]
    fn test_status_display() {
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
    }
}
