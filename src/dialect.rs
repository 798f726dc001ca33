//! Target database dialects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MigrenderError;

/// A database engine the changelog is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mysql,
    SqlServer,
    Oracle,
}

impl Dialect {
    /// Every dialect, in render order.
    pub const ALL: [Dialect; 3] = [Dialect::Mysql, Dialect::SqlServer, Dialect::Oracle];

    /// Lowercase name, also used for config and output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
        }
    }

    /// Whether generated statements get their schema qualifier removed.
    pub fn strips_qualifier(&self) -> bool {
        matches!(self, Dialect::Mysql | Dialect::Oracle)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = MigrenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "oracle" => Ok(Dialect::Oracle),
            other => Err(MigrenderError::Config(format!(
                "Unknown dialect: '{}'. Expected: mysql, sqlserver, or oracle",
                other
            ))),
        }
    }
}
