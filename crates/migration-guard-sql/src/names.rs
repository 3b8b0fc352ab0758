//! Qualified-name parsing and policy validation
//!
//! Identifiers reaching this module come from normalized SQL, so they are
//! lowercase and free of quotes, comments and literal content.

use migration_guard_core::{Issue, Policy};

/// A dotted identifier split into its schema and object parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    /// Schema part, if the identifier was `schema.name`
    pub schema: Option<&'a str>,

    /// Object part; `None` when empty or when the identifier is invalid
    pub name: Option<&'a str>,

    /// More than one dot
    pub invalid: bool,
}

impl<'a> QualifiedName<'a> {
    /// Parse `name` or `schema.name`; anything with more dots is invalid
    pub fn parse(raw: &'a str) -> Self {
        let non_empty = |part: &'a str| Some(part).filter(|p| !p.is_empty());
        let parts: Vec<&str> = raw.split('.').collect();

        match parts.as_slice() {
            [name] => Self {
                schema: None,
                name: non_empty(*name),
                invalid: false,
            },
            [schema, name] => Self {
                schema: non_empty(*schema),
                name: non_empty(*name),
                invalid: false,
            },
            _ => Self {
                schema: None,
                name: None,
                invalid: true,
            },
        }
    }
}

/// Check a schema against the allow and block lists
///
/// Unscoped references (`None`) are not schema-checked.
pub fn validate_schema(schema: Option<&str>, policy: &Policy) -> Option<Issue> {
    let schema = schema?;

    if policy.is_schema_allowed(schema) {
        None
    } else if policy.is_schema_blocked(schema) {
        Some(Issue::blocked_schema(schema))
    } else {
        Some(Issue::schema_not_allowlisted(schema))
    }
}

/// Check that `name` starts with the policy's required prefix
pub fn require_prefix(name: Option<&str>, policy: &Policy, context: &str) -> Option<Issue> {
    match name {
        Some(name) if policy.has_required_prefix(name) => None,
        _ => Some(Issue::missing_prefix(context, name)),
    }
}

/// Validate a raw (possibly schema-qualified) identifier
///
/// Returns a single "unrecognized" issue for unparseable names, otherwise
/// zero, one or two issues (schema, then prefix).
pub fn validate_qualified_name(raw: &str, policy: &Policy, context: &str) -> Vec<Issue> {
    let parsed = QualifiedName::parse(raw);
    if parsed.invalid || parsed.name.is_none() {
        return vec![Issue::unrecognized_name(context, raw)];
    }

    validate_schema(parsed.schema, policy)
        .into_iter()
        .chain(require_prefix(parsed.name, policy, context))
        .collect()
}
