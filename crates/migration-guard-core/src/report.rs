//! Scan report (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::diagnostic::{Violation, ViolationCode};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Result of one guard run over a migrations tree
///
/// Violations are ordered by file path, then by statement order within the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Number of .sql files scanned
    pub files_scanned: usize,

    /// Number of non-empty statements classified
    pub statements_checked: usize,

    /// All violations, in deterministic order
    pub violations: Vec<Violation>,
}

impl ScanResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            files_scanned: 0,
            statements_checked: 0,
            violations: Vec::new(),
        }
    }

    /// Record a scanned file and its violations
    pub fn add_file(&mut self, statements: usize, violations: Vec<Violation>) {
        self.files_scanned += 1;
        self.statements_checked += statements;
        self.violations.extend(violations);
    }

    /// True when no violations were found
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.violations.len()
    }

    /// Count violations per code
    pub fn counts_by_code(&self) -> BTreeMap<ViolationCode, usize> {
        let mut counts = BTreeMap::new();
        for violation in &self.violations {
            *counts.entry(violation.code).or_insert(0) += 1;
        }
        counts
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new()
    }
}
