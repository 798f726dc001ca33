//! Two-phase run: diff the databases, then render every dialect.
//!
//! ```text
//!   spawn ──► diffChangeLog ──oneshot──► main flow
//!                                          │ success
//!                 ┌────────────────────────┼────────────────────────┐
//!                 ▼                        ▼                        ▼
//!        updateSql mysql        updateSql sqlserver        updateSql oracle
//!        extract/convert/write  extract/convert/write      extract/convert/write
//!                 └────────────────────────┼────────────────────────┘
//!                                        join
//!                                          ▼
//!                                 remove changelog
//! ```
//!
//! A failing dialect never stops the other two. Nothing is retried.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::convert::Converter;
use crate::dialect::Dialect;
use crate::error::{MigrenderError, MigrenderResult};
use crate::extract::extract_from_bytes;
use crate::qualifier::Qualifiers;
use crate::tool::MigrationTool;
use crate::writer::write_lines;

/// Result of the diff phase, handed to the main flow once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DiffOutcome {
    Success,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DialectOutcome {
    Written { path: PathBuf, lines: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectReport {
    pub dialect: Dialect,
    #[serde(flatten)]
    pub outcome: DialectOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CleanupOutcome {
    Removed,
    Kept,
    Failed { error: String },
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub diff: DiffOutcome,
    /// Empty when the diff failed.
    pub dialects: Vec<DialectReport>,
    pub cleanup: CleanupOutcome,
}

impl RunReport {
    pub fn written(&self) -> impl Iterator<Item = &DialectReport> {
        self.dialects
            .iter()
            .filter(|d| matches!(d.outcome, DialectOutcome::Written { .. }))
    }
}

/// Build the converter for `dialect`, reading its schema qualifiers when
/// the dialect strips them.
pub fn converter_for(settings: &Settings, dialect: Dialect) -> Converter {
    let qualifiers = if dialect.strips_qualifier() {
        Qualifiers::load_or_empty(&settings.resolve(&settings.defaults_file(dialect)))
    } else {
        Qualifiers::default()
    };
    Converter::new(dialect, qualifiers)
}

pub struct Pipeline<T: MigrationTool> {
    tool: Arc<T>,
    settings: Arc<Settings>,
}

impl<T: MigrationTool> Pipeline<T> {
    pub fn new(tool: T, settings: Settings) -> Self {
        Self {
            tool: Arc::new(tool),
            settings: Arc::new(settings),
        }
    }

    /// Run the diff, the renders and the cleanup.
    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();

        let diff = self.diff().await;
        let dialects = match &diff {
            DiffOutcome::Success => self.render_all().await,
            DiffOutcome::Failed { .. } => {
                warn!("Changelog generation failed, skipping SQL generation");
                Vec::new()
            }
        };
        let cleanup = self.cleanup().await;

        RunReport {
            started_at,
            finished_at: Utc::now(),
            diff,
            dialects,
            cleanup,
        }
    }

    async fn diff(&self) -> DiffOutcome {
        let (tx, rx) = oneshot::channel();
        let tool = Arc::clone(&self.tool);

        tokio::spawn(async move {
            info!("Start to generate changelog");
            let outcome = match tool.diff_changelog().await {
                Ok(_) => {
                    info!("Generated changelog successfully");
                    DiffOutcome::Success
                }
                Err(e) => {
                    log_failure("diffChangeLog", &e);
                    DiffOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(outcome);
        });

        rx.await.unwrap_or_else(|_| DiffOutcome::Failed {
            error: "diff task ended without reporting".to_string(),
        })
    }

    async fn render_all(&self) -> Vec<DialectReport> {
        let [mysql, sqlserver, oracle] = Dialect::ALL.map(|dialect| {
            tokio::spawn(render_dialect(
                Arc::clone(&self.tool),
                Arc::clone(&self.settings),
                dialect,
            ))
        });
        let (mysql, sqlserver, oracle) = tokio::join!(mysql, sqlserver, oracle);

        Dialect::ALL
            .into_iter()
            .zip([mysql, sqlserver, oracle])
            .map(|(dialect, joined)| joined.unwrap_or_else(|e| panicked(dialect, e)))
            .collect()
    }

    async fn cleanup(&self) -> CleanupOutcome {
        if self.settings.keep_changelog {
            return CleanupOutcome::Kept;
        }
        let path = self.settings.changelog_path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => CleanupOutcome::Removed,
            Err(e) => {
                let e = MigrenderError::io(&path, e);
                error!(error = %e, "Error removing changelog");
                CleanupOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

async fn render_dialect<T: MigrationTool>(
    tool: Arc<T>,
    settings: Arc<Settings>,
    dialect: Dialect,
) -> DialectReport {
    info!(%dialect, "Start to generate sql");
    let outcome = match render(tool.as_ref(), settings, dialect).await {
        Ok((path, lines)) => {
            info!(%dialect, path = %path.display(), lines, "Generated sql successfully");
            DialectOutcome::Written { path, lines }
        }
        Err(e) => {
            log_failure(dialect.as_str(), &e);
            DialectOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    DialectReport { dialect, outcome }
}

async fn render<T: MigrationTool>(
    tool: &T,
    settings: Arc<Settings>,
    dialect: Dialect,
) -> MigrenderResult<(PathBuf, usize)> {
    let output = tool.update_sql(dialect).await?;
    // qualifier lookup and the write touch the filesystem
    tokio::task::spawn_blocking(move || write_dialect(&settings, dialect, &output))
        .await
        .map_err(|e| MigrenderError::Task(e.to_string()))?
}

/// Extract, convert and write one dialect's tool output.
fn write_dialect(
    settings: &Settings,
    dialect: Dialect,
    output: &[u8],
) -> MigrenderResult<(PathBuf, usize)> {
    let converter = converter_for(settings, dialect);
    let lines = extract_from_bytes(output, &settings.marker, &converter);
    let path = settings.output_path(dialect);
    write_lines(&lines, &path)?;
    Ok((path, lines.len()))
}

fn panicked(dialect: Dialect, e: JoinError) -> DialectReport {
    error!(%dialect, error = %e, "Render task did not complete");
    DialectReport {
        dialect,
        outcome: DialectOutcome::Failed {
            error: e.to_string(),
        },
    }
}

fn log_failure(unit: &str, e: &MigrenderError) {
    match e.output() {
        Some(output) => error!(unit, error = %e, output, "Error executing migration tool"),
        None => error!(unit, error = %e, "Error executing migration tool"),
    }
}
