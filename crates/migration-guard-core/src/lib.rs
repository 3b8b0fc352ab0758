//! Migration Guard Core
//!
//! Core domain model shared by the scanner and the CLI: the resolved policy,
//! the violations it produces, and the per-run scan report.
//! Never rename violation codes - they are part of the public API.

pub mod diagnostic;
pub mod report;
pub mod config;

pub use diagnostic::{Issue, Violation, ViolationCode};
pub use report::{ScanResult, ReportVersion};
pub use config::{Policy, PolicyFile, EnvOverrides, ConfigError};
