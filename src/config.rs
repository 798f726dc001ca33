//! Run settings.
//!
//! Built-in defaults mirror the layout of a Liquibase project checkout:
//!
//! ```text
//! ./liquibase/liquibase          tool
//! ./changelog/ddl.xml            intermediate changelog (removed after the run)
//! ./config/diff.properties       diff source/reference connection
//! ./config/<dialect>.properties  per-dialect connection and schema
//! ./out/<dialect>.sql            rendered scripts
//! ```
//!
//! A `migrender.toml` may override any of them:
//!
//! ```toml
//! tool = "/opt/liquibase/liquibase"
//! output_dir = "build/sql"
//!
//! [dialects.oracle]
//! defaults_file = "config/oracle-prod.properties"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dialect::Dialect;
use crate::error::{MigrenderError, MigrenderResult};
use crate::extract::DEFAULT_MARKER;

/// Local settings file name looked up in the working directory.
pub const SETTINGS_FILE: &str = "migrender.toml";

/// Value forced into `JAVA_TOOL_OPTIONS` so the tool writes UTF-8.
pub const DEFAULT_JAVA_TOOL_OPTIONS: &str = "-Dfile.encoding=UTF-8";

/// Per-dialect overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialectSettings {
    pub defaults_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Everything a run needs. Relative paths resolve against `working_dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub working_dir: PathBuf,
    pub tool: PathBuf,
    pub changelog: PathBuf,
    pub diff_defaults_file: PathBuf,
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub marker: String,
    pub java_tool_options: String,
    pub keep_changelog: bool,
    pub dialects: HashMap<Dialect, DialectSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            tool: PathBuf::from("liquibase/liquibase"),
            changelog: PathBuf::from("changelog/ddl.xml"),
            diff_defaults_file: PathBuf::from("config/diff.properties"),
            config_dir: PathBuf::from("config"),
            output_dir: PathBuf::from("out"),
            marker: DEFAULT_MARKER.to_string(),
            java_tool_options: DEFAULT_JAVA_TOOL_OPTIONS.to_string(),
            keep_changelog: false,
            dialects: HashMap::new(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text; missing keys take defaults.
    pub fn from_toml(content: &str) -> MigrenderResult<Self> {
        toml::from_str(content).map_err(|e| MigrenderError::Config(e.to_string()))
    }

    /// Load settings from a file.
    pub fn from_file(path: &Path) -> MigrenderResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| MigrenderError::io(path, e))?;
        Self::from_toml(&content)
            .map_err(|e| MigrenderError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Find and load settings.
    ///
    /// An explicit path must exist. Otherwise `./migrender.toml`, then
    /// `<config dir>/migrender/config.toml`, then the defaults.
    pub fn discover(explicit: Option<&Path>) -> MigrenderResult<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let candidates = std::iter::once(PathBuf::from(SETTINGS_FILE))
            .chain(dirs::config_dir().map(|d| d.join("migrender").join("config.toml")));

        for candidate in candidates {
            if candidate.is_file() {
                return Ok((Self::from_file(&candidate)?, Some(candidate)));
            }
        }
        Ok((Self::default(), None))
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    pub fn changelog_path(&self) -> PathBuf {
        self.resolve(&self.changelog)
    }

    /// Properties file passed as `--defaultsFile` when rendering `dialect`.
    pub fn defaults_file(&self, dialect: Dialect) -> PathBuf {
        self.dialects
            .get(&dialect)
            .and_then(|d| d.defaults_file.clone())
            .unwrap_or_else(|| self.config_dir.join(format!("{}.properties", dialect)))
    }

    /// Where the rendered script for `dialect` is written.
    pub fn output_path(&self, dialect: Dialect) -> PathBuf {
        let path = self
            .dialects
            .get(&dialect)
            .and_then(|d| d.output.clone())
            .unwrap_or_else(|| self.output_dir.join(format!("{}.sql", dialect)));
        self.resolve(&path)
    }
}
