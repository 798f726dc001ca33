//! Schema qualifier stripping.
//!
//! Liquibase prefixes generated table names with the schema configured for
//! the target (`inventory.orders`). The per-dialect properties file names
//! that schema on a line containing `db`; every `<schema>.` found in a
//! statement is removed.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{MigrenderError, MigrenderResult};
use crate::parser::property;

/// Qualifiers read from a dialect's properties file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifiers {
    names: Vec<String>,
}

impl Qualifiers {
    /// Collect qualifiers from properties text.
    ///
    /// Only lines containing `db` that split into exactly two parts on
    /// `": "` contribute.
    pub fn parse(properties: &str) -> Self {
        let names = properties
            .lines()
            .filter(|line| line.contains("db"))
            .filter_map(property)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
            .collect();
        Self { names }
    }

    /// Read qualifiers from a properties file.
    pub fn read(path: &Path) -> MigrenderResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| MigrenderError::io(path, e))?;
        Ok(Self::parse(&content))
    }

    /// Read qualifiers, logging and falling back to none when the file
    /// can't be read.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::read(path) {
            Ok(qualifiers) => {
                debug!(
                    path = %path.display(),
                    qualifiers = ?qualifiers.names,
                    "Loaded schema qualifiers"
                );
                qualifiers
            }
            Err(e) => {
                warn!(error = %e, "Cannot read dialect config, schema qualifiers are kept");
                Self::default()
            }
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Remove every `<qualifier>.` from a statement.
    pub fn strip(&self, sql: &str) -> String {
        let mut sql = sql.to_string();
        for name in &self.names {
            sql = sql.replace(&format!("{}.", name), "");
        }
        sql
    }
}
