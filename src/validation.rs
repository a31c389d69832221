//! Form validation for new registrations.
//!
//! Every violation is collected so the caller can report them all at once.

use crate::types::{NewRegistration, RegistrationType, Status};
use serde::Serialize;

/// Outcome of validating a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True iff `errors` is empty.
    pub valid: bool,
    /// Human-readable violations, in field order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check a submission against the required field list, the multi-valued
/// fields, the postal code format and the closed category sets.
pub fn validate(data: &NewRegistration) -> ValidationReport {
    let mut errors = Vec::new();

    let required: [(&str, &str); 10] = [
        ("name", data.name.as_str()),
        ("address1", data.address1.as_str()),
        ("city", data.city.as_str()),
        ("state", data.state.as_str()),
        ("postalCode", data.postal_code.as_str()),
        ("dob", data.dob.as_str()),
        ("gender", data.gender.as_str()),
        ("status", data.status.as_str()),
        ("onboardingDate", data.onboarding_date.as_str()),
        ("type", data.registration_type.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(format!("{} is required", field));
        }
    }

    let multi: [(&str, &[String]); 4] = [
        ("cityMulti", data.city_multi.as_slice()),
        ("pinCode", data.pin_code.as_slice()),
        ("areaMulti", data.area_multi.as_slice()),
        ("languages", data.languages.as_slice()),
    ];
    for (field, values) in multi {
        if values.is_empty() {
            errors.push(format!("{} must have at least one value", field));
        }
    }

    if !data.postal_code.trim().is_empty() && !is_postal_code(&data.postal_code) {
        errors.push("postalCode must be exactly 6 digits".to_string());
    }

    let status = data.status.trim();
    if !status.is_empty() {
        if let Err(e) = status.parse::<Status>() {
            errors.push(e.to_string());
        }
    }

    let kind = data.registration_type.trim();
    if !kind.is_empty() {
        if let Err(e) = kind.parse::<RegistrationType>() {
            errors.push(e.to_string());
        }
    }

    ValidationReport::from_errors(errors)
}

/// Exactly six ASCII digits.
pub fn is_postal_code(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> NewRegistration {
        NewRegistration {
            name: "Alice".to_string(),
            address1: "1 Main Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
            dob: "1990-01-01".to_string(),
            gender: "Female".to_string(),
            status: "Active".to_string(),
            registration_type: "Individual".to_string(),
            onboarding_date: "2024-01-01".to_string(),
            city_multi: vec!["A".to_string()],
            pin_code: vec!["560001".to_string()],
            area_multi: vec!["X".to_string()],
            languages: vec!["en".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_submission_is_valid() {
        let report = validate(&complete());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_submission_reports_every_field() {
        let report = validate(&NewRegistration::default());
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 14);
        assert!(!report.errors.iter().any(|e| e.contains("6 digits")));
    }

    #[test]
    fn test_malformed_postal_code() {
        let mut data = complete();
        data.postal_code = "56001A".to_string();
        let report = validate(&data);
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["postalCode must be exactly 6 digits"]);
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mut data = complete();
        data.city = "   ".to_string();
        let report = validate(&data);
        assert_eq!(report.errors, vec!["city is required"]);
    }

    #[test]
    fn test_blank_postal_code_is_only_missing() {
        let mut data = complete();
        data.postal_code = "   ".to_string();
        let report = validate(&data);
        assert_eq!(report.errors, vec!["postalCode is required"]);
    }

    #[test]
    fn test_unknown_category_reported() {
        let mut data = complete();
        data.status = "Pending".to_string();
        data.registration_type = "Corporate".to_string();
        let report = validate(&data);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_is_postal_code() {
        assert!(is_postal_code("560001"));
        assert!(!is_postal_code("56000"));
        assert!(!is_postal_code("5600011"));
        assert!(!is_postal_code("５６０００１"));
    }
}
