//! CSV output formatting.

use crate::export;
use crate::types::Registration;
use std::io::{self, Write};

/// Print records in CSV format.
pub fn print_csv(records: &[Registration]) -> io::Result<()> {
    let csv = export::to_csv(records).map_err(io::Error::other)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(csv.as_bytes())?;
    out.flush()
}
