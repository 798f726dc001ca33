//! Small pattern parsers using nom.
//!
//! Generated SQL is never parsed as a grammar. These parsers recognise the
//! handful of fragments the dialect converter rewrites and the `key: value`
//! lines of Liquibase properties files.
//!
//! ```text
//! VARCHAR2(255)          db.schema: inventory
//! ─────┬── ─┬─           ────┬──── ──┬──────
//!      │    └── length       │       └── value
//!      └── type tag          └── key
//! ```

use nom::{
    IResult,
    bytes::complete::{tag, take_until},
    character::complete::{char, digit1},
    combinator::rest,
    sequence::{delimited, separated_pair},
};

const VARCHAR2_OPEN: &str = "VARCHAR2(";
const PROPERTY_SEPARATOR: &str = ": ";

/// Parse `VARCHAR2(<digits>)`, returning the digits.
pub fn varchar2_length(input: &str) -> IResult<&str, &str> {
    delimited(tag(VARCHAR2_OPEN), digit1, char(')'))(input)
}

/// Rewrite every `VARCHAR2(<digits>)` into `VARCHAR2(<digits> char)`.
///
/// Lengths already carrying a semantic (`VARCHAR2(10 char)`,
/// `VARCHAR2(10 BYTE)`) do not match and are left alone.
pub fn rewrite_varchar2(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut input = line;

    while let Some(pos) = input.find(VARCHAR2_OPEN) {
        out.push_str(&input[..pos]);
        let candidate = &input[pos..];
        match varchar2_length(candidate) {
            Ok((remaining, digits)) => {
                out.push_str(VARCHAR2_OPEN);
                out.push_str(digits);
                out.push_str(" char)");
                input = remaining;
            }
            Err(_) => {
                out.push_str(VARCHAR2_OPEN);
                input = &candidate[VARCHAR2_OPEN.len()..];
            }
        }
    }
    out.push_str(input);
    out
}

fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_until(PROPERTY_SEPARATOR), tag(PROPERTY_SEPARATOR), rest)(input)
}

/// Split a properties line on `": "`.
///
/// Returns `None` unless the line splits into exactly two parts, so
/// `schema: db: inventory` is rejected.
pub fn property(line: &str) -> Option<(&str, &str)> {
    match key_value(line) {
        Ok((_, (key, value))) if !value.contains(PROPERTY_SEPARATOR) => Some((key, value)),
        _ => None,
    }
}
