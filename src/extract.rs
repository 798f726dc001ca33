//! Statement extraction from `updateSql` output.
//!
//! Liquibase prints each changeset as a comment header followed by its DDL,
//! then bookkeeping `INSERT INTO DATABASECHANGELOG` rows:
//!
//! ```text
//! -- Changeset changelog/ddl.xml::1700000000000-1::dev     <- marker, kept
//! CREATE TABLE orders (id INT NOT NULL, ...);              <- converted
//! ALTER TABLE orders ADD CONSTRAINT ...;                   <- converted
//! INSERT INTO DATABASECHANGELOG (...) VALUES (...);        <- terminator, dropped
//! ```

use crate::convert::Converter;

/// Marker that opens a changeset block in the tool output.
pub const DEFAULT_MARKER: &str = "Changeset changelog/ddl.xml";

/// Marks the end of a changeset's DDL.
pub const TERMINATOR: &str = "INSERT INTO";

/// Collect marker lines and the converted statements following them.
///
/// The marker line is kept verbatim. Statements up to the next line
/// containing [`TERMINATOR`] are converted; the terminator line itself is
/// dropped. Without a terminator everything to the end is kept.
pub fn extract_statements(output: &str, marker: &str, converter: &Converter) -> Vec<String> {
    let mut result = Vec::new();
    let mut inside = false;

    for line in output.lines() {
        if inside {
            if line.contains(TERMINATOR) {
                inside = false;
            } else {
                result.push(converter.convert(line));
            }
            continue;
        }
        if line.contains(marker) {
            result.push(line.to_string());
            inside = true;
        }
    }

    result
}

/// Same as [`extract_statements`] on raw process output.
pub fn extract_from_bytes(output: &[u8], marker: &str, converter: &Converter) -> Vec<String> {
    extract_statements(&String::from_utf8_lossy(output), marker, converter)
}
