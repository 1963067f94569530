//! Output lines for shell results.

use filestash_core::Record;
use std::io::{self, Write};
use std::path::Path;

pub const NO_FILES: &str = "No files uploaded yet.";
pub const KEY_NOT_FOUND: &str = "No file found with that key.";
pub const FAREWELL: &str = "Exiting... Bye!";

pub fn banner(out: &mut dyn Write, command_names: &[&str]) -> io::Result<()> {
    writeln!(out, "==============================")?;
    writeln!(out, "filestash - local file archive")?;
    writeln!(out, "==============================")?;
    writeln!(out, "Commands: {}", command_names.join(" | "))
}

pub fn uploaded(out: &mut dyn Write, record: &Record) -> io::Result<()> {
    writeln!(out, "File uploaded successfully! Unique Key: {}", record.key)
}

pub fn downloaded(out: &mut dyn Write, dest: &Path) -> io::Result<()> {
    writeln!(out, "File downloaded successfully to: {}", dest.display())
}

/// One line per record under a header, or [`NO_FILES`].
pub fn record_table(out: &mut dyn Write, records: &[Record]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{NO_FILES}");
    }

    writeln!(out, "\nKey | Original Filename | Stored Filename | Uploaded At")?;
    writeln!(out, "{}", "-".repeat(61))?;
    for record in records {
        let [key, original, stored, uploaded_at] = record.fields().map(|(_, value)| value);
        writeln!(out, "{key} | {original} | {stored} | {uploaded_at}")?;
    }
    Ok(())
}

/// `field: value` lines for one record, or [`KEY_NOT_FOUND`].
pub fn record_info(out: &mut dyn Write, record: Option<&Record>) -> io::Result<()> {
    let Some(record) = record else {
        return writeln!(out, "{KEY_NOT_FOUND}");
    };

    writeln!(out, "\nFile Information:")?;
    for (field, value) in record.fields() {
        writeln!(out, "{field}: {value}")?;
    }
    Ok(())
}
