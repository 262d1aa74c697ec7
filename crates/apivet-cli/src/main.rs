use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use apivet_core::{AcceptedChanges, ApiChange, CompatConfig, CompatReport, Severity};
use apivet_engine::{ApiDiff, Artifact, CheckOutcome, CompatPipeline, ScopeFilter};

/// ApiVet - Backward-compatibility vetting for library APIs
#[derive(Parser)]
#[command(name = "apivet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: apivet.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a diff report for unaccepted breaking changes
    Check {
        /// Path to the change records produced by the diff tool (JSON)
        diff: PathBuf,

        /// Path to the accepted-changes file (one entry per line)
        #[arg(short, long)]
        accepted: Option<PathBuf>,

        /// Baseline version label
        #[arg(short, long)]
        baseline: Option<String>,

        /// Candidate version label
        #[arg(long, default_value = "current")]
        candidate: String,

        /// Output file for report.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing for logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        CompatConfig::from_file(config_path)?
    } else if Path::new("apivet.toml").exists() {
        CompatConfig::from_file(Path::new("apivet.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        CompatConfig::default()
    };

    match cli.command {
        Commands::Check {
            diff,
            accepted,
            baseline,
            candidate,
            output,
        } => check_command(
            &config,
            &diff,
            accepted.as_deref(),
            baseline,
            candidate,
            output.as_deref(),
            cli.verbose,
        ),
    }
}

/// Check command - digest a diff report and fail on unaccepted violations
fn check_command(
    config: &CompatConfig,
    diff: &Path,
    accepted_path: Option<&Path>,
    baseline: Option<String>,
    candidate: String,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if !config.enabled {
        println!("{}", "Backward-compatibility checks are disabled".yellow());
        return Ok(());
    }

    let baseline = baseline
        .or_else(|| config.previous_version.clone())
        .unwrap_or_else(|| "previous".to_string());

    if verbose {
        eprintln!("{} {} against {}...", "Checking".cyan(), candidate, baseline);
    }

    let mut accepted = load_accepted_changes(config, accepted_path, verbose)?;
    if let Some(prefix) = &config.module_prefix {
        accepted.retain_prefix(prefix);
    }

    let filter = ScopeFilter::new(config.excluded_packages.iter().cloned());
    let pipeline =
        CompatPipeline::new(JsonDiffSource::new(diff), accepted).with_filter(filter);

    let old = Artifact::new(baseline.as_str());
    let new = Artifact::new(candidate.as_str()).with_path(diff);

    let outcome = pipeline.run(&old, &new)?;

    let report =
        CompatReport::from_violations(baseline.as_str(), candidate.as_str(), &outcome.violations);

    if let Some(output) = output {
        report
            .save_to_file(output)
            .with_context(|| format!("failed to write report to {}", output.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), output.display());
        }
    }

    print_check_summary(&report, &outcome);

    // Exit with error code if there are unaccepted violations
    if !outcome.passed() {
        std::process::exit(1);
    }

    Ok(())
}

/// Resolve the accepted-changes set from the flag or the config
///
/// An explicit `--accepted` path must exist. A path from the config only
/// applies when the file is present, matching how a shared accepted-changes
/// file is optional per module.
fn load_accepted_changes(
    config: &CompatConfig,
    flag_path: Option<&Path>,
    verbose: bool,
) -> Result<AcceptedChanges> {
    if let Some(path) = flag_path {
        if verbose {
            eprintln!("{} {}", "Loading accepted changes from:".cyan(), path.display());
        }
        return AcceptedChanges::from_file(path)
            .with_context(|| format!("failed to load accepted changes from {}", path.display()));
    }

    if let Some(path) = config.resolved_accepted_changes() {
        if path.exists() {
            if verbose {
                eprintln!("{} {}", "Loading accepted changes from:".cyan(), path.display());
            }
            return AcceptedChanges::from_file(&path).with_context(|| {
                format!("failed to load accepted changes from {}", path.display())
            });
        }
        tracing::warn!(path = %path.display(), "configured accepted-changes file does not exist");
    }

    Ok(AcceptedChanges::new())
}

/// Reads change records from a JSON report produced by a bytecode diff tool
struct JsonDiffSource {
    path: PathBuf,
}

impl JsonDiffSource {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ApiDiff for JsonDiffSource {
    fn name(&self) -> &'static str {
        "json-report"
    }

    fn diff(&self, _old: &Artifact, _new: &Artifact) -> Result<Vec<ApiChange>> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read diff report {}", self.path.display()))?;
        let changes: Vec<ApiChange> = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse diff report {}", self.path.display()))?;
        Ok(changes)
    }
}

/// Print check summary to stdout
fn print_check_summary(report: &CompatReport, outcome: &CheckOutcome) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Backward Compatibility Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Baseline:  {}", report.baseline);
    println!("Candidate: {}", report.candidate);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total violations: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.accepted > 0 {
        println!("  Accepted: {}", format!("{}", report.summary.accepted).yellow());
    } else {
        println!("  Accepted: {}", format!("{}", report.summary.accepted).green());
    }
    println!();

    if outcome.violations.is_empty() {
        println!("{}", "✓ No compatibility violations found!".green().bold());
    } else {
        println!("{}", "Violations:".bold());
        for violation in &outcome.violations {
            let severity_str = match violation.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Accepted => "ACCEPTED".yellow(),
            };

            println!(
                "  [{}] {}: {}",
                severity_str,
                violation.identity(),
                violation.reason
            );
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn json_diff_source_parses_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.json");
        std::fs::write(
            &path,
            r#"[{"kind": "method", "owning_class": "com.acme.Widget", "member_name": "render", "binary_compatible": false}]"#,
        )
        .unwrap();

        let source = JsonDiffSource::new(&path);
        let changes = source
            .diff(&Artifact::new("1.2.0"), &Artifact::new("1.3.0"))
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].fully_qualified_name(), "com.acme.Widget#render");
    }

    #[test]
    fn json_diff_source_missing_file_fails() {
        let source = JsonDiffSource::new("/nonexistent/diff.json");
        let result = source.diff(&Artifact::new("1.2.0"), &Artifact::new("1.3.0"));
        assert!(result.is_err());
    }

    #[test]
    fn config_accepted_file_is_optional() {
        let mut config = CompatConfig::default();
        config.accepted_changes = Some(PathBuf::from("does-not-exist.txt"));
        config.project_root = PathBuf::from("/nonexistent");

        let accepted = load_accepted_changes(&config, None, false).unwrap();
        assert!(accepted.is_empty());
    }

    #[test]
    fn explicit_accepted_flag_must_exist() {
        let config = CompatConfig::default();
        let result =
            load_accepted_changes(&config, Some(Path::new("/nonexistent/accepted.txt")), false);
        assert!(result.is_err());
    }

    #[test]
    fn accepted_file_entries_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accepted.txt");
        std::fs::write(&path, "com.acme.Widget#render\n\ncom.acme.Gadget\n").unwrap();

        let config = CompatConfig::default();
        let accepted = load_accepted_changes(&config, Some(&path), false).unwrap();

        assert_eq!(accepted.len(), 2);
        assert!(accepted.contains("com.acme.Widget#render"));
        assert!(accepted.contains("com.acme.Gadget"));
    }
}
