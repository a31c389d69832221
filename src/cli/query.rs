//! Query subcommands.
//!
//! Handles `stats`, `search`, `filter` and `range`.

use super::{Context, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::FilterCriteria;
use crate::types::{RegistrationType, Status};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;

/// Show collection statistics.
#[derive(Parser, Debug)]
pub struct StatsCommand {
    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let stats = ctx.open_store()?.statistics();

        if self.json {
            output::print_json(&stats)?;
        } else {
            output::print_statistics(&stats)?;
        }

        Ok(())
    }
}

/// Case-insensitive search.
#[derive(Parser, Debug)]
pub struct SearchCommand {
    /// Text to look for
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl SearchCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let hits = ctx.open_store()?.search(&self.term);
        output::print_records(&hits, self.format.unwrap_or_else(|| ctx.default_format()))?;
        Ok(())
    }
}

/// Exact-match filter.
#[derive(Parser, Debug)]
pub struct FilterCommand {
    /// Registration type (Individual, Agency, Sub Agency)
    #[arg(short = 't', long = "type")]
    pub registration_type: Option<RegistrationType>,

    /// Status (Active, Inactive, Suspended)
    #[arg(short, long)]
    pub status: Option<Status>,

    /// City, matched exactly
    #[arg(short, long)]
    pub city: Option<String>,

    /// State, matched exactly
    #[arg(long)]
    pub state: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl FilterCommand {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            registration_type: self.registration_type,
            status: self.status,
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }

    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let criteria = self.criteria();
        if criteria.is_empty() && !ctx.quiet {
            output::print_warning("no filter given; showing every registration");
        }

        let hits = ctx.open_store()?.filter(&criteria);
        output::print_records(&hits, self.format.unwrap_or_else(|| ctx.default_format()))?;
        Ok(())
    }
}

/// Registrations submitted within a date range.
#[derive(Parser, Debug)]
pub struct RangeCommand {
    /// Start of the range (RFC 3339 or YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: String,

    /// End of the range (RFC 3339 or YYYY-MM-DD, inclusive through that day)
    #[arg(long, value_name = "DATE")]
    pub to: String,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl RangeCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let start = parse_instant(&self.from, false)?;
        let end = parse_instant(&self.to, true)?;

        if start > end {
            return Err(CliError::Other(format!(
                "range start {} is after end {}",
                start, end
            )));
        }

        let hits = ctx.open_store()?.date_range(start, end);
        output::print_records(&hits, self.format.unwrap_or_else(|| ctx.default_format()))?;
        Ok(())
    }
}

/// Parse an RFC 3339 timestamp or a bare date. A bare date means the start
/// of that day, or its last instant when `end_of_day` is set.
fn parse_instant(value: &str, end_of_day: bool) -> CliResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CliError::Other(format!("invalid date '{}'", value)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| CliError::Other(format!("invalid date '{}'", value)))?;

    Ok(date.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_rfc3339() {
        let at = parse_instant("2024-01-15T12:00:00+05:30", false).unwrap();
        assert_eq!(at.to_rfc3339(), "2024-01-15T06:30:00+00:00");
    }

    #[test]
    fn test_parse_instant_bare_date() {
        let start = parse_instant("2024-01-15", false).unwrap();
        let end = parse_instant("2024-01-15", true).unwrap();

        assert_eq!(start.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert!(end > start);
        assert_eq!(end.date_naive(), start.date_naive());
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(parse_instant("15/01/2024", false).is_err());
    }

    #[test]
    fn test_filter_criteria_from_flags() {
        let cmd = FilterCommand {
            registration_type: Some(RegistrationType::Agency),
            status: None,
            city: None,
            state: Some("KA".to_string()),
            format: None,
        };
        let criteria = cmd.criteria();

        assert_eq!(criteria.registration_type, Some(RegistrationType::Agency));
        assert_eq!(criteria.state.as_deref(), Some("KA"));
        assert!(criteria.status.is_none());
    }
}
