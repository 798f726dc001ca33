//! The external migration tool.
//!
//! Both invocations capture stdout followed by stderr into one buffer:
//!
//! ```bash
//! liquibase --changeLogFile=changelog/ddl.xml --defaultsFile=config/diff.properties diffChangeLog
//! liquibase --changeLogFile=changelog/ddl.xml --defaultsFile=config/oracle.properties updateSql
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use crate::config::Settings;
use crate::dialect::Dialect;
use crate::error::{MigrenderError, MigrenderResult};

/// Operations the pipeline needs from the migration tool.
///
/// Implemented by [`Liquibase`]; tests substitute their own.
pub trait MigrationTool: Send + Sync + 'static {
    /// Diff the configured databases into the changelog.
    fn diff_changelog(&self) -> impl Future<Output = MigrenderResult<Vec<u8>>> + Send;

    /// Render the changelog as SQL for `dialect`, returning the raw output.
    fn update_sql(&self, dialect: Dialect) -> impl Future<Output = MigrenderResult<Vec<u8>>> + Send;
}

/// Runs the Liquibase command line.
#[derive(Debug, Clone)]
pub struct Liquibase {
    binary: PathBuf,
    working_dir: PathBuf,
    changelog: PathBuf,
    diff_defaults_file: PathBuf,
    dialect_defaults: Vec<(Dialect, PathBuf)>,
}

impl Liquibase {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            binary: settings.resolve(&settings.tool),
            working_dir: settings.working_dir.clone(),
            changelog: settings.changelog.clone(),
            diff_defaults_file: settings.diff_defaults_file.clone(),
            dialect_defaults: Dialect::ALL
                .iter()
                .map(|d| (*d, settings.defaults_file(*d)))
                .collect(),
        }
    }

    fn defaults_file(&self, dialect: Dialect) -> &Path {
        self.dialect_defaults
            .iter()
            .find(|(d, _)| *d == dialect)
            .map(|(_, path)| path.as_path())
            .unwrap_or(&self.diff_defaults_file)
    }

    fn args(&self, defaults_file: &Path, command: &str) -> Vec<String> {
        vec![
            format!("--changeLogFile={}", self.changelog.display()),
            format!("--defaultsFile={}", defaults_file.display()),
            command.to_string(),
        ]
    }

    async fn run(&self, defaults_file: &Path, command: &str) -> MigrenderResult<Vec<u8>> {
        let args = self.args(defaults_file, command);
        let command_line = format!("{} {}", self.binary.display(), args.join(" "));
        debug!(command = %command_line, "Running migration tool");

        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|source| MigrenderError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        check_output(command_line, output)
    }
}

/// Merge stdout and stderr, failing on a non-zero exit.
fn check_output(command: String, output: Output) -> MigrenderResult<Vec<u8>> {
    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);

    if output.status.success() {
        Ok(combined)
    } else {
        Err(MigrenderError::CommandFailed {
            command,
            status: output.status.to_string(),
            output: String::from_utf8_lossy(&combined).into_owned(),
        })
    }
}

impl MigrationTool for Liquibase {
    fn diff_changelog(&self) -> impl Future<Output = MigrenderResult<Vec<u8>>> + Send {
        async move { self.run(&self.diff_defaults_file, "diffChangeLog").await }
    }

    fn update_sql(
        &self,
        dialect: Dialect,
    ) -> impl Future<Output = MigrenderResult<Vec<u8>>> + Send {
        async move { self.run(self.defaults_file(dialect), "updateSql").await }
    }
}
