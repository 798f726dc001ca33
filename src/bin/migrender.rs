//! migrender — Liquibase changelog to per-dialect SQL
//!
//! # Usage
//!
//! ```bash
//! # Diff, render mysql/sqlserver/oracle into ./out, remove the changelog
//! migrender
//!
//! # Keep changelog/ddl.xml and print the run report as JSON
//! migrender run --keep-changelog --format json
//!
//! # Post-process a saved `updateSql` output
//! migrender convert --dialect oracle update.log -o out/oracle.sql
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use migrender::extract::extract_from_bytes;
use migrender::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "migrender")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render a Liquibase diff into MySQL, SQL Server and Oracle scripts", long_about = None)]
#[command(after_help = "EXAMPLES:
    migrender                                   # diff and render all dialects
    migrender run --keep-changelog -f json      # keep changelog/ddl.xml, JSON report
    migrender convert -d sqlserver update.log   # post-process saved output
    migrender dialects                          # show config and output paths")]
struct Cli {
    /// Settings file (default: ./migrender.toml, then the user config dir)
    #[arg(short, long, env = "MIGRENDER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Project directory holding liquibase/, config/ and changelog/
    #[arg(short = 'C', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliDialect {
    Mysql,
    Sqlserver,
    Oracle,
}

impl From<CliDialect> for Dialect {
    fn from(val: CliDialect) -> Self {
        match val {
            CliDialect::Mysql => Dialect::Mysql,
            CliDialect::Sqlserver => Dialect::SqlServer,
            CliDialect::Oracle => Dialect::Oracle,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Diff the databases and render every dialect (default)
    Run {
        /// Leave the intermediate changelog in place
        #[arg(long)]
        keep_changelog: bool,
        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Extract and convert statements from saved updateSql output
    Convert {
        /// Target dialect
        #[arg(short, long, value_enum)]
        dialect: CliDialect,
        /// File holding the tool output
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List dialects with their config and output files
    Dialects,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "migrender=debug" } else { "migrender=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (mut settings, source) = Settings::discover(cli.config.as_deref())?;
    if let Some(path) = &source {
        tracing::debug!(path = %path.display(), "Loaded settings");
    }
    if let Some(dir) = cli.working_dir {
        settings.working_dir = dir;
    }
    settings.working_dir = absolute_working_dir(&settings.working_dir)?;

    match cli.command {
        Some(Commands::Dialects) => {
            show_dialects(&settings);
            Ok(())
        }
        Some(Commands::Convert {
            dialect,
            input,
            output,
        }) => convert_file(&settings, dialect.into(), &input, output.as_deref()),
        Some(Commands::Run {
            keep_changelog,
            format,
        }) => {
            settings.keep_changelog |= keep_changelog;
            run_pipeline(settings, format)
        }
        None => run_pipeline(settings, OutputFormat::Text),
    }
}

fn absolute_working_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let current = std::env::current_dir()
        .map_err(|e| MigrenderError::Startup(format!("cannot read current directory: {}", e)))?;
    Ok(current.join(dir))
}

fn set_java_tool_options(value: &str) -> Result<()> {
    if value.contains('\0') {
        bail!(MigrenderError::Startup(
            "JAVA_TOOL_OPTIONS must not contain NUL".to_string()
        ));
    }
    // SAFETY: runs before the runtime is built, no other threads exist yet.
    unsafe { std::env::set_var("JAVA_TOOL_OPTIONS", value) };
    Ok(())
}

fn run_pipeline(settings: Settings, format: OutputFormat) -> Result<()> {
    set_java_tool_options(&settings.java_tool_options)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let tool = Liquibase::from_settings(&settings);
    let report = runtime.block_on(Pipeline::new(tool, settings).run());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    match &report.diff {
        DiffOutcome::Success => println!("{} {}", "✓".green(), "Changelog generated".white()),
        DiffOutcome::Failed { error } => {
            println!("{} {} {}", "✗".red(), "Changelog failed:".red().bold(), error);
            println!("{}", "  SQL generation skipped.".yellow());
        }
    }

    for entry in &report.dialects {
        match &entry.outcome {
            DialectOutcome::Written { path, lines } => println!(
                "{} {:10} → {} ({} lines)",
                "✓".green(),
                entry.dialect.to_string().cyan(),
                path.display().to_string().white(),
                lines
            ),
            DialectOutcome::Failed { error } => println!(
                "{} {:10} {}",
                "✗".red(),
                entry.dialect.to_string().cyan(),
                error.red()
            ),
        }
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "{}",
        format!("Finished in {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0).dimmed()
    );
}

fn convert_file(
    settings: &Settings,
    dialect: Dialect,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let raw = std::fs::read(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let converter = converter_for(settings, dialect);
    let lines = extract_from_bytes(&raw, &settings.marker, &converter);

    if lines.is_empty() {
        eprintln!(
            "{} no '{}' block found in {}",
            "⚠".yellow(),
            settings.marker,
            input.display()
        );
    }

    match output {
        Some(path) => {
            write_lines(&lines, path)?;
            println!(
                "{} Wrote {} lines to {}",
                "✓".green(),
                lines.len(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", lines.join("\n")),
    }
    Ok(())
}

fn show_dialects(settings: &Settings) {
    println!(
        "{:10} {:40} {}",
        "Dialect".white().bold(),
        "Defaults file".white().bold(),
        "Output".white().bold()
    );
    println!("{}", "─".repeat(80).dimmed());
    for dialect in Dialect::ALL {
        println!(
            "{:10} {:40} {}",
            dialect.to_string().cyan().bold(),
            settings.defaults_file(dialect).display().to_string(),
            settings.output_path(dialect).display().to_string().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrender::config::DEFAULT_JAVA_TOOL_OPTIONS;

    #[test]
    fn test_set_java_tool_options() {
        set_java_tool_options(DEFAULT_JAVA_TOOL_OPTIONS).unwrap();
        assert_eq!(
            std::env::var("JAVA_TOOL_OPTIONS").unwrap(),
            "-Dfile.encoding=UTF-8"
        );
    }

    #[test]
    fn test_java_tool_options_rejects_nul() {
        let err = set_java_tool_options("-Dfile.encoding=UTF-8\0-Xmx1g").unwrap_err();
        assert!(err.to_string().contains("must not contain NUL"));
    }

    #[test]
    fn test_absolute_working_dir_keeps_absolute() {
        let dir = PathBuf::from("/srv/project");
        assert_eq!(absolute_working_dir(&dir).unwrap(), dir);
    }
}
