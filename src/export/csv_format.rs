//! CSV export of the registration collection.

use crate::error::{StoreError, StoreResult};
use crate::types::Registration;

/// Column headers, in output order.
pub const CSV_HEADER: [&str; 11] = [
    "ID",
    "Name",
    "Email",
    "City",
    "State",
    "Postal Code",
    "Type",
    "Status",
    "Gender",
    "DOB",
    "Submitted At",
];

/// Render records as CSV: a bare header row, then one fully quoted row per
/// record. An empty collection renders as the empty string.
pub fn to_csv(records: &[Registration]) -> StoreResult<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut header = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    header.write_record(CSV_HEADER).map_err(csv_error)?;
    let buf = header.into_inner().map_err(|e| csv_error(e.into_error()))?;

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf);

    for record in records {
        let submitted_at = record
            .submitted_at
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_default();

        wtr.write_record([
            record.id.to_string().as_str(),
            record.name.as_deref().unwrap_or(""),
            record.email.as_deref().unwrap_or(""),
            record.city.as_deref().unwrap_or(""),
            record.state.as_deref().unwrap_or(""),
            record.postal_code.as_deref().unwrap_or(""),
            record.registration_type.map_or("", |t| t.as_str()),
            record.status.map_or("", |s| s.as_str()),
            record.gender.as_deref().unwrap_or(""),
            record.dob.as_deref().unwrap_or(""),
            submitted_at.as_str(),
        ])
        .map_err(csv_error)?;
    }

    let bytes = wtr.into_inner().map_err(|e| csv_error(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Export(e.to_string()))
}

fn csv_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Export(format!("csv: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Registration {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_collection_is_empty_string() {
        assert_eq!(to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_header_plus_one_line_per_record() {
        let records = vec![
            record(r#"{"id": 1, "name": "Alice", "city": "Pune", "type": "Agency"}"#),
            record(r#"{"id": 2, "name": "Bob"}"#),
            record(r#"{"id": 3}"#),
        ];
        let csv = to_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "ID,Name,Email,City,State,Postal Code,Type,Status,Gender,DOB,Submitted At"
        );
        assert_eq!(lines[1], r#""1","Alice","","Pune","","","Agency","","","","""#);
    }

    #[test]
    fn test_every_row_field_quoted() {
        let records = vec![record(
            r#"{"id": 7, "name": "Ann \"Jo\" Lee", "submittedAt": "2024-03-01T10:00:00Z"}"#,
        )];
        let csv = to_csv(&records).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert!(row.starts_with('"') && row.ends_with('"'));
        assert!(row.contains(r#""Ann ""Jo"" Lee""#));
        assert!(row.contains("2024-03-01T10:00:00.000Z"));
    }
}
