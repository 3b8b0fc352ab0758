//! Policy configuration (migration-guard.config.json + environment overrides)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the policy file
pub const ENV_CONFIG: &str = "MIGRATION_GUARD_CONFIG";
/// Environment variable overriding `requiredPrefix`
pub const ENV_PREFIX: &str = "MIGRATION_GUARD_PREFIX";
/// Environment variable overriding `allowedSchemas` (comma list)
pub const ENV_ALLOWED_SCHEMAS: &str = "MIGRATION_GUARD_ALLOWED_SCHEMAS";
/// Environment variable overriding `blockedSchemas` (comma list)
pub const ENV_BLOCKED_SCHEMAS: &str = "MIGRATION_GUARD_BLOCKED_SCHEMAS";
/// Environment variable overriding `allowedExtensions` (comma list)
pub const ENV_ALLOWED_EXTENSIONS: &str = "MIGRATION_GUARD_ALLOWED_EXTENSIONS";

/// Default policy file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "migration-guard.config.json";

/// Raw policy file as written on disk
///
/// Every field is optional here; [`Policy::resolve`] applies defaults and
/// rejects a policy without a required prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyFile {
    #[serde(default)]
    pub required_prefix: Option<String>,

    #[serde(default)]
    pub allowed_schemas: Option<Vec<String>>,

    #[serde(default)]
    pub blocked_schemas: Option<Vec<String>>,

    #[serde(default)]
    pub allowed_extensions: Option<Vec<String>>,
}

impl PolicyFile {
    /// Load a policy file from disk
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    /// Parse a policy file from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Environment overrides, captured once per run
///
/// Each value, when present, replaces the policy file value entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub required_prefix: Option<String>,
    pub allowed_schemas: Option<Vec<String>>,
    pub blocked_schemas: Option<Vec<String>>,
    pub allowed_extensions: Option<Vec<String>>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function
    ///
    /// Unset and empty variables both count as "no override".
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            required_prefix: get(ENV_PREFIX),
            allowed_schemas: get(ENV_ALLOWED_SCHEMAS).map(|v| split_list(&v)),
            blocked_schemas: get(ENV_BLOCKED_SCHEMAS).map(|v| split_list(&v)),
            allowed_extensions: get(ENV_ALLOWED_EXTENSIONS).map(|v| split_list(&v)),
        }
    }
}

/// Split a comma list, trimming and lowercasing items and dropping empties
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn lowercase_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().to_lowercase())
        .collect()
}

/// Resolved, immutable policy for one run
///
/// All values are lowercase; comparisons against normalized SQL are exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    /// Prefix every created/altered object name must start with (never empty)
    pub required_prefix: String,

    /// Schemas that may be referenced
    pub allowed_schemas: BTreeSet<String>,

    /// Schemas reported with a dedicated "blocked" message
    pub blocked_schemas: BTreeSet<String>,

    /// Extensions CREATE EXTENSION may install; empty means none at all
    pub allowed_extensions: BTreeSet<String>,
}

impl Policy {
    /// Create a policy with the default schema allowlist (`public`) and no extensions
    pub fn new(required_prefix: impl AsRef<str>) -> Result<Self, ConfigError> {
        let required_prefix = required_prefix.as_ref().trim().to_lowercase();
        if required_prefix.is_empty() {
            return Err(ConfigError::MissingPrefix);
        }

        Ok(Self {
            required_prefix,
            allowed_schemas: lowercase_set(["public"]),
            blocked_schemas: BTreeSet::new(),
            allowed_extensions: BTreeSet::new(),
        })
    }

    /// Replace the schema allowlist
    pub fn with_allowed_schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_schemas = lowercase_set(schemas);
        self
    }

    /// Replace the schema blocklist
    pub fn with_blocked_schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked_schemas = lowercase_set(schemas);
        self
    }

    /// Replace the extension allowlist
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = lowercase_set(extensions);
        self
    }

    /// Merge a policy file with environment overrides
    ///
    /// Overrides replace file values; they are never merged item by item.
    pub fn resolve(file: PolicyFile, env: EnvOverrides) -> Result<Self, ConfigError> {
        let prefix = env
            .required_prefix
            .or(file.required_prefix)
            .unwrap_or_default();

        let mut policy = Self::new(prefix)?;

        if let Some(allowed) = env.allowed_schemas.or(file.allowed_schemas) {
            policy = policy.with_allowed_schemas(allowed);
        }
        if let Some(blocked) = env.blocked_schemas.or(file.blocked_schemas) {
            policy = policy.with_blocked_schemas(blocked);
        }
        if let Some(extensions) = env.allowed_extensions.or(file.allowed_extensions) {
            policy = policy.with_allowed_extensions(extensions);
        }

        Ok(policy)
    }

    /// Load the policy file at `path` and apply overrides
    pub fn load(path: &Path, env: EnvOverrides) -> Result<Self, ConfigError> {
        let file = PolicyFile::from_file(path)?;
        Self::resolve(file, env)
    }

    pub fn is_schema_allowed(&self, schema: &str) -> bool {
        self.allowed_schemas.contains(schema)
    }

    pub fn is_schema_blocked(&self, schema: &str) -> bool {
        self.blocked_schemas.contains(schema)
    }

    /// Check whether a (lowercase) name carries the required prefix
    pub fn has_required_prefix(&self, name: &str) -> bool {
        name.starts_with(&self.required_prefix)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("requiredPrefix is missing (set in config or MIGRATION_GUARD_PREFIX)")]
    MissingPrefix,
}
