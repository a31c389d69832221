//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::storage::Statistics;
use crate::types::{Registration, Status};
use crate::validation::ValidationReport;
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print records as a table.
pub fn print_plain(records: &[Registration]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    if records.is_empty() {
        writeln!(out, "  {}", style("No registrations to display.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(
        out,
        "  {:<16}  {:<20}  {:<14}  {:<6}  {:<11}  {}",
        style("ID").bold(),
        style("NAME").bold(),
        style("CITY").bold(),
        style("STATE").bold(),
        style("TYPE").bold(),
        style("STATUS").bold()
    )?;
    writeln!(out, "  {}", style(THIN_RULE).dim())?;

    for record in records {
        writeln!(out, "{}", table_row(record))?;
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(out, "  {} registration(s)", style(records.len()).bold())?;
    writeln!(out)?;

    Ok(())
}

/// One table line. Cells are padded before styling so escape codes do not
/// count towards the column width.
fn table_row(record: &Registration) -> String {
    let status = record.status.map_or("-", Status::as_str);
    format!(
        "  {}  {:<20}  {:<14}  {:<6}  {:<11}  {}",
        style(format!("{:<16}", record.id)).dim(),
        truncate_string(record.display_name(), 20),
        truncate_string(record.city.as_deref().unwrap_or("-"), 14),
        truncate_string(record.state.as_deref().unwrap_or("-"), 6),
        record.registration_type.map_or("-", |t| t.as_str()),
        status_style(record.status).apply_to(status)
    )
}

/// Print every field of a single record.
pub fn print_record(record: &Registration) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "  {} {}", style("Registration").cyan().bold(), record.display_name())?;
    writeln!(out, "{}", style(RULE).cyan())?;

    let join = |values: &[String]| {
        if values.is_empty() {
            "-".to_string()
        } else {
            values.join(", ")
        }
    };
    let opt = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let rows = [
        ("ID", record.id.to_string()),
        ("Email", opt(&record.email)),
        ("Address", opt(&record.address1)),
        ("Address 2", opt(&record.address2)),
        ("City", opt(&record.city)),
        ("State", opt(&record.state)),
        ("Postal Code", opt(&record.postal_code)),
        ("DOB", opt(&record.dob)),
        ("Gender", opt(&record.gender)),
        (
            "Type",
            record
                .registration_type
                .map_or("-".to_string(), |t| t.to_string()),
        ),
        ("Status", record.status.map_or("-".to_string(), |s| s.to_string())),
        ("Onboarded", opt(&record.onboarding_date)),
        ("Cities", join(&record.city_multi)),
        ("Pin Codes", join(&record.pin_code)),
        ("Areas", join(&record.area_multi)),
        ("Languages", join(&record.languages)),
        (
            "Submitted",
            record.submitted_at.map_or("-".to_string(), |t| t.to_rfc3339()),
        ),
        (
            "Updated",
            record.updated_at.map_or("-".to_string(), |t| t.to_rfc3339()),
        ),
        (
            "Imported",
            record.imported_at.map_or("-".to_string(), |t| t.to_rfc3339()),
        ),
        ("Version", record.version.clone()),
    ];

    for (label, value) in rows {
        writeln!(out, "  {:<12} {}", style(format!("{}:", label)).bold(), value)?;
    }
    for (key, value) in &record.extra {
        writeln!(out, "  {:<12} {}", style(format!("{}:", key)).dim(), value)?;
    }

    writeln!(out)?;
    Ok(())
}

/// Print collection statistics.
pub fn print_statistics(stats: &Statistics) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                  {} Statistics", style("Registration").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;
    writeln!(out, "  {} {}", style("Total:").bold(), style(stats.total).bold())?;
    writeln!(out)?;

    writeln!(out, "  {}", style("By type").bold())?;
    for (kind, count) in &stats.by_type {
        writeln!(out, "    {:<12} {}", kind.as_str(), count)?;
    }
    writeln!(out, "  {}", style("By status").bold())?;
    for (status, count) in &stats.by_status {
        writeln!(
            out,
            "    {:<12} {}",
            status_style(Some(*status)).apply_to(status.as_str()),
            count
        )?;
    }
    writeln!(out, "  {}", style("By state").bold())?;
    for (state, count) in &stats.by_state {
        writeln!(out, "    {:<12} {}", state, count)?;
    }
    writeln!(out, "  {}", style("By city").bold())?;
    for (city, count) in &stats.by_city {
        writeln!(out, "    {:<12} {}", city, count)?;
    }

    writeln!(out)?;
    Ok(())
}

/// Print a validation report.
pub fn print_validation(report: &ValidationReport) {
    if report.valid {
        print_success("Registration is valid");
        return;
    }

    print_error(&format!("{} problem(s) found:", report.errors.len()));
    for error in &report.errors {
        eprintln!("  {} {}", style("•").red(), error);
    }
}

fn status_style(status: Option<Status>) -> Style {
    match status {
        Some(Status::Active) => Style::new().green().bold(),
        Some(Status::Inactive) => Style::new().yellow(),
        Some(Status::Suspended) => Style::new().red(),
        None => Style::new().dim(),
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_align_across_id_widths() {
        let short: Registration =
            serde_json::from_str(r#"{"id": 7, "name": "Alice", "city": "Pune"}"#).unwrap();
        let long: Registration =
            serde_json::from_str(r#"{"id": 1700000000123.5, "name": "Bob", "city": "Goa"}"#)
                .unwrap();

        let short_row = console::strip_ansi_codes(&table_row(&short)).into_owned();
        let long_row = console::strip_ansi_codes(&table_row(&long)).into_owned();

        assert_eq!(short_row.find("Alice"), Some(20));
        assert_eq!(long_row.find("Bob"), Some(20));
        assert_eq!(short_row.find("Pune"), long_row.find("Goa"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }
}
