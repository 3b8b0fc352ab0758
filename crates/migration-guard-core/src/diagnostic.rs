//! Violation codes and per-statement issues
//!
//! IMPORTANT: Violation codes are stable.
//! NEVER rename or remove codes - reports and CI filters depend on them.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Violation code registry
///
/// These codes are STABLE.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    // Schema rules
    /// Schema explicitly listed in the blocklist
    BlockedSchema,

    /// Schema present in neither the allowlist nor the blocklist
    SchemaNotAllowlisted,

    // Naming rules
    /// Object name does not start with the required prefix
    MissingPrefix,

    /// Object name could not be parsed as `name` or `schema.name`
    UnrecognizedName,

    // Statement rules
    /// CREATE EXTENSION with no extension allowlist configured
    ExtensionNotSupported,

    /// CREATE EXTENSION naming an extension outside the allowlist
    ExtensionNotAllowed,

    /// GRANT or REVOKE statement
    GrantRevoke,

    /// DDL statement matching no known statement kind
    UnrecognizedDdl,
}

impl ViolationCode {
    /// Get the violation code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockedSchema => "BLOCKED_SCHEMA",
            Self::SchemaNotAllowlisted => "SCHEMA_NOT_ALLOWLISTED",
            Self::MissingPrefix => "MISSING_PREFIX",
            Self::UnrecognizedName => "UNRECOGNIZED_NAME",
            Self::ExtensionNotSupported => "EXTENSION_NOT_SUPPORTED",
            Self::ExtensionNotAllowed => "EXTENSION_NOT_ALLOWED",
            Self::GrantRevoke => "GRANT_REVOKE",
            Self::UnrecognizedDdl => "UNRECOGNIZED_DDL",
        }
    }
}

impl std::fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single policy problem found in one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable violation code
    pub code: ViolationCode,

    /// Human-readable message
    pub message: String,
}

impl Issue {
    /// Create an issue from a code and message
    pub fn new(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn blocked_schema(schema: &str) -> Self {
        Self::new(
            ViolationCode::BlockedSchema,
            format!("blocked schema reference: {}", schema),
        )
    }

    pub fn schema_not_allowlisted(schema: &str) -> Self {
        Self::new(
            ViolationCode::SchemaNotAllowlisted,
            format!("schema not allowlisted: {}", schema),
        )
    }

    /// Missing prefix; `name` is `None` when the object name could not be extracted
    pub fn missing_prefix(context: &str, name: Option<&str>) -> Self {
        Self::new(
            ViolationCode::MissingPrefix,
            format!(
                "missing required prefix for {}: {}",
                context,
                name.unwrap_or("<unknown>")
            ),
        )
    }

    pub fn unrecognized_name(context: &str, raw: &str) -> Self {
        Self::new(
            ViolationCode::UnrecognizedName,
            format!("unrecognized {} name: {}", context, raw),
        )
    }

    pub fn extension_not_supported() -> Self {
        Self::new(
            ViolationCode::ExtensionNotSupported,
            "CREATE EXTENSION is not supported (no allowlist configured)",
        )
    }

    pub fn extension_not_allowed(extension: &str) -> Self {
        Self::new(
            ViolationCode::ExtensionNotAllowed,
            format!("extension not allowed: {}", extension),
        )
    }

    pub fn grant_revoke() -> Self {
        Self::new(
            ViolationCode::GrantRevoke,
            "GRANT/REVOKE is not supported (blocked by policy)",
        )
    }

    pub fn unrecognized_ddl() -> Self {
        Self::new(
            ViolationCode::UnrecognizedDdl,
            "Unrecognized DDL statement (blocked by default)",
        )
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// An issue tagged with the file and normalized statement it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Migration file the statement was read from
    pub file: PathBuf,

    /// Normalized statement text (lowercase, comments and literals stripped)
    pub statement: String,

    /// Stable violation code
    pub code: ViolationCode,

    /// Human-readable message
    pub message: String,
}

impl Violation {
    /// Attach file and statement context to an issue
    pub fn new(file: impl Into<PathBuf>, statement: impl Into<String>, issue: Issue) -> Self {
        Self {
            file: file.into(),
            statement: statement.into(),
            code: issue.code,
            message: issue.message,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}
