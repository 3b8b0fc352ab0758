//! Pattern-based DDL classification
//!
//! Each normalized statement is checked in three passes:
//!
//! 1. every `schema.identifier` occurrence has its schema validated
//! 2. DDL statements (`create`, `alter`, `drop`, `truncate`, `grant`, `revoke`,
//!    `comment`) are matched against an ordered list of statement kinds and the
//!    extracted object names are validated; DDL matching no kind is rejected
//! 3. every `references <name>` clause of a DDL statement is validated as a
//!    foreign key target
//!
//! Non-DDL statements only get the first pass.

use std::sync::LazyLock;

use migration_guard_core::{Issue, Policy, ViolationCode};
use regex::{Captures, Regex};

use crate::names::{validate_qualified_name, validate_schema};

/// A recognized DDL statement and the raw identifiers it names
///
/// Identifiers are borrowed from the normalized statement and may be
/// schema-qualified or malformed; validation happens in [`StatementKind::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind<'a> {
    /// CREATE / ALTER / DROP TABLE
    Table { name: &'a str },

    /// DROP TRIGGER ... ON ...
    DropTrigger { trigger: &'a str, table: &'a str },

    /// CREATE / ALTER / DROP [MATERIALIZED] VIEW
    View { name: &'a str },

    /// CREATE [UNIQUE] INDEX ... ON ...
    CreateIndex { index: &'a str, table: &'a str },

    /// DROP INDEX
    DropIndex { index: &'a str },

    /// CREATE / ALTER / DROP SEQUENCE
    Sequence { name: &'a str },

    /// CREATE / ALTER / DROP FUNCTION
    Function { name: &'a str },

    /// CREATE / ALTER / DROP TYPE
    Type { name: &'a str },

    /// CREATE TRIGGER ... ON ...
    CreateTrigger { trigger: &'a str, table: &'a str },

    /// COMMENT ON TABLE / VIEW / TYPE / SEQUENCE / INDEX / TRIGGER
    CommentOnObject { object: &'a str, name: &'a str },

    /// CREATE EXTENSION
    CreateExtension { extension: &'a str },

    /// COMMENT ON COLUMN table.column (only the table part is kept)
    CommentOnColumn { table: &'a str },

    /// COMMENT ON FUNCTION name(...)
    CommentOnFunction { name: &'a str },

    /// GRANT or REVOKE, always rejected
    GrantRevoke,

    /// CREATE / ALTER / DROP POLICY ... ON ...
    Policy { policy: &'a str, table: &'a str },
}

static SCHEMA_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-z_][a-z0-9_]*)\s*\.\s*([a-z_][a-z0-9_]*)\b").unwrap()
});

static DDL_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|alter|drop|truncate|grant|revoke|comment)\b").unwrap()
});

static REFERENCES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breferences\s+([a-z0-9_.]+)").unwrap());

// Statement kind patterns, tried in the order of `StatementKind::detect`
static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|alter|drop)\s+table\s+(if\s+not\s+exists\s+|if\s+exists\s+)?(only\s+)?([a-z0-9_.]+)").unwrap()
});

static DROP_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^drop\s+trigger\s+(if\s+exists\s+)?([a-z0-9_.]+)\s+on\s+([a-z0-9_.]+)").unwrap()
});

static VIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|alter|drop)\s+(or\s+replace\s+)?(materialized\s+)?view\s+(if\s+not\s+exists\s+|if\s+exists\s+)?([a-z0-9_.]+)").unwrap()
});

static CREATE_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^create\s+(unique\s+)?index\s+(concurrently\s+)?(if\s+not\s+exists\s+)?([a-z0-9_.]+)\s+on\s+(only\s+)?([a-z0-9_.]+)").unwrap()
});

static DROP_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^drop\s+index\s+(concurrently\s+)?(if\s+exists\s+)?([a-z0-9_.]+)").unwrap()
});

static SEQUENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|alter|drop)\s+sequence\s+(if\s+not\s+exists\s+|if\s+exists\s+)?([a-z0-9_.]+)").unwrap()
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|alter|drop)\s+(or\s+replace\s+)?function\s+(if\s+exists\s+)?([a-z0-9_.]+)").unwrap()
});

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|alter|drop)\s+type\s+(if\s+exists\s+)?([a-z0-9_.]+)").unwrap()
});

// `(?s)` lets the ON clause sit on a later line; `.*?` stops at the first ON
static CREATE_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^create\s+(or\s+replace\s+)?trigger\s+([a-z0-9_.]+).*?\bon\s+([a-z0-9_.]+)").unwrap()
});

static COMMENT_ON_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^comment\s+on\s+(table|view|type|sequence|index|trigger)\s+([a-z0-9_.]+)").unwrap()
});

static CREATE_EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^create\s+extension\s+(if\s+not\s+exists\s+)?"?([a-z0-9_-]+)"?"#).unwrap()
});

static COMMENT_ON_COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^comment\s+on\s+column\s+([a-z0-9_.]+)\s*\.\s*([a-z0-9_]+)").unwrap()
});

static COMMENT_ON_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^comment\s+on\s+function\s+([a-z0-9_.]+)\s*\(").unwrap()
});

static GRANT_REVOKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(grant|revoke)\b").unwrap());

static POLICY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(create|alter|drop)\s+policy\s+(if\s+exists\s+)?([a-z0-9_.]+).*?\bon\s+([a-z0-9_.]+)").unwrap()
});

/// Text of a capture group, empty when the group did not participate
fn group<'a>(caps: &Captures<'a>, index: usize) -> &'a str {
    caps.get(index).map_or("", |m| m.as_str())
}

impl<'a> StatementKind<'a> {
    /// Match a normalized DDL statement against the known statement kinds
    ///
    /// Order matters - the first matching kind wins, so more specific
    /// patterns (DROP TRIGGER ... ON) come before broader ones.
    pub fn detect(stmt: &'a str) -> Option<Self> {
        if let Some(caps) = TABLE_RE.captures(stmt) {
            return Some(Self::Table { name: group(&caps, 4) });
        }

        if let Some(caps) = DROP_TRIGGER_RE.captures(stmt) {
            return Some(Self::DropTrigger {
                trigger: group(&caps, 2),
                table: group(&caps, 3),
            });
        }

        if let Some(caps) = VIEW_RE.captures(stmt) {
            return Some(Self::View { name: group(&caps, 5) });
        }

        if let Some(caps) = CREATE_INDEX_RE.captures(stmt) {
            return Some(Self::CreateIndex {
                index: group(&caps, 4),
                table: group(&caps, 6),
            });
        }

        if let Some(caps) = DROP_INDEX_RE.captures(stmt) {
            return Some(Self::DropIndex { index: group(&caps, 3) });
        }

        if let Some(caps) = SEQUENCE_RE.captures(stmt) {
            return Some(Self::Sequence { name: group(&caps, 3) });
        }

        if let Some(caps) = FUNCTION_RE.captures(stmt) {
            return Some(Self::Function { name: group(&caps, 4) });
        }

        if let Some(caps) = TYPE_RE.captures(stmt) {
            return Some(Self::Type { name: group(&caps, 3) });
        }

        if let Some(caps) = CREATE_TRIGGER_RE.captures(stmt) {
            return Some(Self::CreateTrigger {
                trigger: group(&caps, 2),
                table: group(&caps, 3),
            });
        }

        if let Some(caps) = COMMENT_ON_OBJECT_RE.captures(stmt) {
            return Some(Self::CommentOnObject {
                object: group(&caps, 1),
                name: group(&caps, 2),
            });
        }

        if let Some(caps) = CREATE_EXTENSION_RE.captures(stmt) {
            return Some(Self::CreateExtension { extension: group(&caps, 2) });
        }

        if let Some(caps) = COMMENT_ON_COLUMN_RE.captures(stmt) {
            return Some(Self::CommentOnColumn { table: group(&caps, 1) });
        }

        if let Some(caps) = COMMENT_ON_FUNCTION_RE.captures(stmt) {
            return Some(Self::CommentOnFunction { name: group(&caps, 1) });
        }

        if GRANT_REVOKE_RE.is_match(stmt) {
            return Some(Self::GrantRevoke);
        }

        if let Some(caps) = POLICY_RE.captures(stmt) {
            return Some(Self::Policy {
                policy: group(&caps, 3),
                table: group(&caps, 4),
            });
        }

        None
    }

    /// Validate the names this statement touches
    pub fn validate(&self, policy: &Policy) -> Vec<Issue> {
        match *self {
            Self::Table { name } => validate_qualified_name(name, policy, "table"),
            Self::View { name } => validate_qualified_name(name, policy, "view"),
            Self::DropIndex { index } => validate_qualified_name(index, policy, "index"),
            Self::Sequence { name } => validate_qualified_name(name, policy, "sequence"),
            Self::Function { name } | Self::CommentOnFunction { name } => {
                validate_qualified_name(name, policy, "function")
            }
            Self::Type { name } => validate_qualified_name(name, policy, "type"),
            Self::CommentOnObject { object, name } => validate_qualified_name(name, policy, object),
            Self::CommentOnColumn { table } => validate_qualified_name(table, policy, "column"),
            Self::CreateIndex { index, table } => {
                let mut issues = validate_qualified_name(index, policy, "index");
                issues.extend(validate_qualified_name(table, policy, "table"));
                issues
            }
            Self::DropTrigger { trigger, table } | Self::CreateTrigger { trigger, table } => {
                let mut issues = validate_qualified_name(trigger, policy, "trigger");
                issues.extend(validate_qualified_name(table, policy, "table"));
                issues
            }
            Self::Policy { policy: name, table } => {
                let mut issues = validate_qualified_name(name, policy, "policy");
                issues.extend(validate_qualified_name(table, policy, "table"));
                issues
            }
            Self::CreateExtension { extension } => validate_extension(extension, policy)
                .into_iter()
                .collect(),
            Self::GrantRevoke => vec![Issue::grant_revoke()],
        }
    }
}

/// An empty extension allowlist forbids every extension
fn validate_extension(extension: &str, policy: &Policy) -> Option<Issue> {
    if policy.allowed_extensions.is_empty() {
        Some(Issue::extension_not_supported())
    } else if policy.allowed_extensions.contains(extension) {
        None
    } else {
        Some(Issue::extension_not_allowed(extension))
    }
}

/// True when the statement starts with a DDL keyword
pub fn is_ddl(stmt: &str) -> bool {
    DDL_START_RE.is_match(stmt)
}

/// Check one normalized statement against the policy
///
/// Issues are ordered: schema references, then the statement kind (or the
/// unrecognized-DDL rejection), then foreign key targets. A schema issue from
/// the kind check is dropped when the schema scan already reported it; every
/// other issue is kept, repeats included.
pub fn classify(stmt: &str, policy: &Policy) -> Vec<Issue> {
    let mut issues: Vec<Issue> = SCHEMA_REF_RE
        .captures_iter(stmt)
        .filter_map(|caps| validate_schema(caps.get(1).map(|m| m.as_str()), policy))
        .collect();

    if !is_ddl(stmt) {
        return issues;
    }

    let kind_issues: Vec<Issue> = match StatementKind::detect(stmt) {
        Some(kind) => kind
            .validate(policy)
            .into_iter()
            .filter(|issue| !repeats_schema_scan(issue, &issues))
            .collect(),
        None => vec![Issue::unrecognized_ddl()],
    };
    issues.extend(kind_issues);

    for caps in REFERENCES_RE.captures_iter(stmt) {
        issues.extend(validate_qualified_name(group(&caps, 1), policy, "foreign key"));
    }

    issues
}

/// A schema issue for a schema the blanket scan already reported
fn repeats_schema_scan(issue: &Issue, scanned: &[Issue]) -> bool {
    matches!(
        issue.code,
        ViolationCode::BlockedSchema | ViolationCode::SchemaNotAllowlisted
    ) && scanned.contains(issue)
}
