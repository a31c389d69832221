//! Record management subcommands.
//!
//! Handles `add`, `list`, `show`, `update`, `delete` and `clear`.

use super::{Context, OutputFormat};
use crate::error::{CliError, CliResult, StoreError};
use crate::output;
use crate::storage::Confirm;
use crate::types::{NewRegistration, RecordId};
use crate::validation;
use clap::Parser;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Save a new registration.
#[derive(Parser, Debug)]
pub struct AddCommand {
    /// JSON file holding the form submission
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Save even if validation fails
    #[arg(long)]
    pub force: bool,
}

impl AddCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let content = fs::read_to_string(&self.file)?;
        let data: NewRegistration = serde_json::from_str(&content).map_err(StoreError::from)?;

        let report = validation::validate(&data);
        if !report.valid {
            if !self.force {
                return Err(StoreError::Validation(report.errors).into());
            }
            output::print_warning(&format!(
                "saving despite {} validation problem(s)",
                report.errors.len()
            ));
        }

        let mut store = ctx.open_store()?;
        let record = store.create(data)?;

        if !ctx.quiet {
            output::print_success(&format!("Saved registration {}", record.summary()));
            if let Some(path) = store.sink().written().last() {
                output::print_info(&format!("Collection written to {}", path.display()));
            }
        }

        Ok(())
    }
}

/// List stored registrations.
#[derive(Parser, Debug)]
pub struct ListCommand {
    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl ListCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx.open_store()?;
        let records = store.read_all();

        output::print_records(&records, self.format.unwrap_or_else(|| ctx.default_format()))?;
        Ok(())
    }
}

/// Show one registration.
#[derive(Parser, Debug)]
pub struct ShowCommand {
    /// Registration ID
    #[arg(value_name = "ID")]
    pub id: RecordId,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

impl ShowCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx.open_store()?;
        let record = store
            .read_by_id(self.id)
            .ok_or_else(|| StoreError::NotFound(self.id.to_string()))?;

        if self.json {
            output::print_json(&record)?;
        } else {
            output::print_record(&record)?;
        }

        Ok(())
    }
}

/// Update fields of a registration.
#[derive(Parser, Debug)]
pub struct UpdateCommand {
    /// Registration ID
    #[arg(value_name = "ID")]
    pub id: RecordId,

    /// Field assignment, e.g. `--set city=Mysuru` or `--set languages=["en","kn"]`
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub assignments: Vec<String>,

    /// JSON object of fields to merge
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,
}

impl UpdateCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let partial = self.partial()?;
        if partial.is_empty() && !ctx.quiet {
            output::print_warning("no fields given; only the update timestamp will change");
        }

        let mut store = ctx.open_store()?;
        let record = store.update(self.id, &partial)?;

        if !ctx.quiet {
            output::print_success(&format!("Updated registration {}", record.summary()));
        }

        Ok(())
    }

    /// Collect `--json` and `--set` into one object; `--set` wins on conflicts.
    fn partial(&self) -> CliResult<Map<String, Value>> {
        let mut partial = match &self.json {
            Some(raw) => match serde_json::from_str(raw).map_err(StoreError::from)? {
                Value::Object(map) => map,
                _ => return Err(CliError::Other("--json must be a JSON object".to_string())),
            },
            None => Map::new(),
        };

        for assignment in &self.assignments {
            let (field, value) = parse_assignment(assignment)?;
            partial.insert(field, value);
        }

        Ok(partial)
    }
}

/// Split `field=value`. Values that look like JSON arrays, objects or
/// `null` are parsed; everything else stays a string.
fn parse_assignment(assignment: &str) -> CliResult<(String, Value)> {
    let (field, raw) = assignment
        .split_once('=')
        .ok_or_else(|| CliError::Other(format!("expected FIELD=VALUE, got '{}'", assignment)))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(CliError::Other(format!("missing field name in '{}'", assignment)));
    }

    let trimmed = raw.trim_start();
    let value = if trimmed.starts_with('[') || trimmed.starts_with('{') || raw == "null" {
        serde_json::from_str(raw).map_err(StoreError::from)?
    } else {
        Value::String(raw.to_string())
    };

    Ok((field.to_string(), value))
}

/// Delete a registration.
#[derive(Parser, Debug)]
pub struct DeleteCommand {
    /// Registration ID
    #[arg(value_name = "ID")]
    pub id: RecordId,
}

impl DeleteCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let mut store = ctx.open_store()?;
        store.delete(self.id)?;

        if !ctx.quiet {
            output::print_success(&format!("Deleted registration {}", self.id));
        }

        Ok(())
    }
}

/// Delete every registration.
#[derive(Parser, Debug)]
pub struct ClearCommand {
    /// Skip confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl ClearCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let mut store = ctx.open_store()?;

        let result = if self.yes {
            store.clear_all(&mut |_: &str| true)
        } else {
            store.clear_all(&mut StdinConfirm)
        };

        match result {
            Ok(()) => {
                if !ctx.quiet {
                    output::print_success("All registrations deleted");
                }
                Ok(())
            }
            Err(StoreError::Cancelled) => {
                println!("Cancelled.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Interactive `[y/N]` prompt on stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => input.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::context;
    use serde_json::json;

    fn write_alice(dir: &std::path::Path) -> PathBuf {
        let file = dir.join("alice.json");
        fs::write(
            &file,
            json!({
                "name": "Alice", "address1": "1 Main Road", "city": "Bengaluru",
                "state": "KA", "postalCode": "560001", "dob": "1990-01-01",
                "gender": "Female", "status": "Active", "type": "Individual",
                "onboardingDate": "2024-01-01", "cityMulti": ["A"],
                "pinCode": ["560001"], "areaMulti": ["X"], "languages": ["en"]
            })
            .to_string(),
        )
        .unwrap();
        file
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("city=Mysuru").unwrap(),
            ("city".to_string(), json!("Mysuru"))
        );
        assert_eq!(
            parse_assignment("postalCode=560002").unwrap(),
            ("postalCode".to_string(), json!("560002"))
        );
        assert_eq!(
            parse_assignment("languages=[\"en\",\"kn\"]").unwrap(),
            ("languages".to_string(), json!(["en", "kn"]))
        );
        assert_eq!(
            parse_assignment("address2=null").unwrap().1,
            Value::Null
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_add_then_update_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        AddCommand {
            file: write_alice(dir.path()),
            force: false,
        }
        .execute(&ctx)
        .unwrap();

        let id = ctx.open_store().unwrap().read_all()[0].id;
        assert!(dir.path().join("downloads").exists());

        UpdateCommand {
            id,
            assignments: vec!["city=Mysuru".to_string()],
            json: Some(r#"{"city": "Hubli", "gender": "F"}"#.to_string()),
        }
        .execute(&ctx)
        .unwrap();

        let record = ctx.open_store().unwrap().read_by_id(id).unwrap();
        assert_eq!(record.city.as_deref(), Some("Mysuru"));
        assert_eq!(record.gender.as_deref(), Some("F"));

        DeleteCommand { id }.execute(&ctx).unwrap();
        assert!(ctx.open_store().unwrap().read_all().is_empty());
    }

    #[test]
    fn test_add_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"{"name": "Bob", "postalCode": "12"}"#).unwrap();

        let err = AddCommand {
            file: file.clone(),
            force: false,
        }
        .execute(&ctx)
        .unwrap_err();
        assert!(matches!(err, CliError::Store(StoreError::Validation(_))));
        assert!(ctx.open_store().unwrap().read_all().is_empty());

        AddCommand { file, force: true }.execute(&ctx).unwrap();
        assert_eq!(ctx.open_store().unwrap().read_all().len(), 1);
    }

    #[test]
    fn test_clear_with_yes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        AddCommand {
            file: write_alice(dir.path()),
            force: false,
        }
        .execute(&ctx)
        .unwrap();

        ClearCommand { yes: true }.execute(&ctx).unwrap();
        assert!(ctx.open_store().unwrap().read_all().is_empty());
    }
}
