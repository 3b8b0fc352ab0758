//! Aggregation of statement checks across migration files

use migration_guard_core::{Policy, ScanResult, Violation};
use migration_guard_sql::check_sql;
use std::path::{Path, PathBuf};

use crate::{discover_sql_files, ScanError};

/// A migration file's path and contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read a source file from disk
    pub fn read(path: &Path) -> Result<Self, ScanError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(path, contents))
    }
}

/// Checks migration files against a single, read-only policy
///
/// Files are independent of each other; the only ordering guarantee is the
/// report order (file path, then statement order).
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'p> {
    policy: &'p Policy,
}

impl<'p> Scanner<'p> {
    pub fn new(policy: &'p Policy) -> Self {
        Self { policy }
    }

    /// Check one file; returns the number of statements and their violations
    pub fn scan_file(&self, path: &Path, sql: &str) -> (usize, Vec<Violation>) {
        let checked = check_sql(sql, self.policy);
        let statements = checked.len();

        let violations: Vec<Violation> = checked
            .into_iter()
            .flat_map(|(statement, issues)| {
                issues
                    .into_iter()
                    .map(move |issue| Violation::new(path, statement.clone(), issue))
            })
            .collect();

        tracing::debug!(
            file = %path.display(),
            statements,
            violations = violations.len(),
            "checked migration file"
        );

        (statements, violations)
    }

    /// Check a set of in-memory files, reporting them in path order
    pub fn scan_sources(&self, sources: impl IntoIterator<Item = SourceFile>) -> ScanResult {
        let mut sources: Vec<SourceFile> = sources.into_iter().collect();
        sources.sort_by(|a, b| a.path.cmp(&b.path));

        let mut result = ScanResult::new();
        for source in &sources {
            let (statements, violations) = self.scan_file(&source.path, &source.contents);
            result.add_file(statements, violations);
        }

        result
    }

    /// Discover, read and check every `.sql` file under `dir`
    ///
    /// A missing directory, an empty tree or an unreadable file aborts the run.
    pub fn scan_dir(&self, dir: &Path) -> Result<ScanResult, ScanError> {
        let files = discover_sql_files(dir)?;
        if files.is_empty() {
            return Err(ScanError::NoSqlFiles(dir.to_path_buf()));
        }

        let sources = files
            .iter()
            .map(|path| SourceFile::read(path))
            .collect::<Result<Vec<_>, _>>()?;

        let result = self.scan_sources(sources);
        tracing::debug!(
            files = result.files_scanned,
            statements = result.statements_checked,
            violations = result.issue_count(),
            "scan complete"
        );

        Ok(result)
    }
}
