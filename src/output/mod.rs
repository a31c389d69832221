//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of registrations.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::print_csv;
pub use json_format::print_json;
pub use plain::{
    print_error, print_info, print_plain, print_record, print_statistics, print_success,
    print_validation, print_warning,
};

use crate::cli::OutputFormat;
use crate::types::Registration;
use std::io;

/// Format and print records according to the specified format.
pub fn print_records(records: &[Registration], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(records),
        OutputFormat::Json => json_format::print_json(records),
        OutputFormat::Csv => csv_format::print_csv(records),
    }
}
