//! Migration Guard engine
//!
//! This crate drives a guard run over a migrations tree:
//! - Discovering `.sql` files (recursively, sorted by path)
//! - Checking every statement of every file against the policy
//! - Aggregating violations into a [`ScanResult`](migration_guard_core::ScanResult)

pub mod discovery;
pub mod scanner;

pub use discovery::discover_sql_files;
pub use scanner::{Scanner, SourceFile};

use std::path::PathBuf;

/// Setup failures that abort a run before or outside of classification
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("migrations directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("no .sql files found in {}", .0.display())]
    NoSqlFiles(PathBuf),

    #[error("failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
