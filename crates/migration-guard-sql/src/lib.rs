//! SQL scanning and policy classification
//!
//! This crate handles:
//! - Stripping comments and literal content from raw migration SQL
//! - Splitting normalized SQL into statements
//! - Parsing and validating schema-qualified names
//! - Classifying DDL statements and checking them against a [`Policy`]
//!
//! It is a heuristic lexer, not a SQL parser. Anything it cannot classify
//! is rejected rather than passed.
//!
//! [`Policy`]: migration_guard_core::Policy

pub mod normalizer;
pub mod splitter;
pub mod names;
pub mod classifier;

pub use normalizer::normalize;
pub use splitter::split_statements;
pub use names::{QualifiedName, validate_schema, require_prefix, validate_qualified_name};
pub use classifier::{StatementKind, classify, is_ddl};

use migration_guard_core::{Issue, Policy};

/// Normalize, split and classify a whole migration file
///
/// Returns each statement (normalized text) paired with its issues, in
/// statement order. Statements without issues are included with an empty list.
pub fn check_sql(sql: &str, policy: &Policy) -> Vec<(String, Vec<Issue>)> {
    let normalized = normalize(sql);
    split_statements(&normalized)
        .into_iter()
        .map(|stmt| (stmt.to_string(), classify(stmt, policy)))
        .collect()
}
