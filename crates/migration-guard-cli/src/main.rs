use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::panic::{self, UnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use migration_guard_core::config::{DEFAULT_CONFIG_FILE, ENV_CONFIG};
use migration_guard_core::{EnvOverrides, Policy, ScanResult};
use migration_guard_engine::Scanner;

/// Migration Guard - reject SQL migrations that step outside the approved namespace
#[derive(Parser)]
#[command(name = "migration-guard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Migrations root, scanned recursively for .sql files
    #[arg(long, default_value = "supabase/migrations")]
    dir: PathBuf,

    /// Path to policy file
    #[arg(long, env = ENV_CONFIG, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print the offending (normalized) statement under each violation
    #[arg(long)]
    explain: bool,

    /// Also write the scan result as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Exit code for a run with policy violations
const EXIT_VIOLATIONS: u8 = 1;
/// Exit code for setup failures (config, missing directory, no files, I/O)
const EXIT_SETUP: u8 = 2;

fn main() -> ExitCode {
    // A .env file may carry MIGRATION_GUARD_* overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !std::io::stderr().is_terminal() || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match catch_panic(|| run(&cli)) {
        Ok(result) if result.is_clean() => {
            println!(
                "migration-guard: {} ({})",
                "OK".green().bold(),
                plural(result.files_scanned, "file")
            );
            ExitCode::SUCCESS
        }
        Ok(result) => {
            print_violations(&result, cli.explain);
            ExitCode::from(EXIT_VIOLATIONS)
        }
        Err(e) => {
            eprintln!("migration-guard: {:#}", e);
            ExitCode::from(EXIT_SETUP)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load the policy and scan the migrations tree
fn run(cli: &Cli) -> Result<ScanResult> {
    let policy = Policy::load(&cli.config, EnvOverrides::from_env())?;
    tracing::debug!(config = %cli.config.display(), ?policy, "policy resolved");

    let result = Scanner::new(&policy).scan_dir(&cli.dir)?;
    tracing::debug!(counts = ?result.counts_by_code(), "violations by code");

    if let Some(path) = &cli.report {
        result
            .save_to_file(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        tracing::debug!(path = %path.display(), "report saved");
    }

    Ok(result)
}

/// Turn a panic inside `f` into an error so it exits like any other failure
fn catch_panic<T>(f: impl FnOnce() -> Result<T> + UnwindSafe) -> Result<T> {
    panic::catch_unwind(f).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(anyhow!("internal error: {}", message))
    })
}

fn print_violations(result: &ScanResult, explain: bool) {
    eprintln!(
        "migration-guard: {} ({})",
        "failed".red().bold(),
        plural(result.issue_count(), "issue")
    );

    for violation in &result.violations {
        eprintln!("- {}: {}", violation.file.display(), violation.message);
        if explain {
            eprintln!("  statement: {}", violation.statement.dimmed());
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panics_become_errors() {
        let err = catch_panic(|| -> Result<()> { panic!("scanner exploded") }).unwrap_err();
        assert_eq!(err.to_string(), "internal error: scanner exploded");

        let err = catch_panic(|| -> Result<()> { panic!("{} files", 3) }).unwrap_err();
        assert_eq!(err.to_string(), "internal error: 3 files");
    }

    #[test]
    fn results_pass_through() {
        assert_eq!(catch_panic(|| Ok(7)).unwrap(), 7);
        assert!(catch_panic(|| -> Result<()> { Err(anyhow!("bad config")) }).is_err());
    }

    #[test]
    fn plural_nouns() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(3, "issue"), "3 issues");
    }
}
