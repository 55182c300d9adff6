//! Error types for starlift using snafu.
//!
//! This module defines structured error types with context selectors for
//! all error conditions in the codebase.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur during configuration parsing and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// A required configuration value is empty.
    #[snafu(display("Configuration value '{key}' must not be empty"))]
    MissingValue { key: &'static str },

    /// A storage location is not an s3:// URL.
    #[snafu(display("Configuration value '{key}' must be an s3:// URL, got '{value}'"))]
    InvalidLocation { key: &'static str, value: String },

    /// The IAM role identifier does not look like a role ARN.
    #[snafu(display("'{value}' does not look like an IAM role ARN"))]
    InvalidIamArn { value: String },

    /// A value would be spliced into a SQL literal but contains characters
    /// that cannot be safely embedded (quotes, control characters).
    #[snafu(display(
        "Configuration value '{key}' contains characters not allowed in a SQL literal: {value:?}"
    ))]
    UnsafeValue { key: &'static str, value: String },
}

// ============ ETL Error (top-level) ============

/// The catalog a failed statement belonged to, for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementStage {
    Drop,
    Create,
    Copy,
    Insert,
}

impl std::fmt::Display for StatementStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatementStage::Drop => "drop",
            StatementStage::Create => "create",
            StatementStage::Copy => "copy",
            StatementStage::Insert => "insert",
        };
        f.write_str(s)
    }
}

/// Top-level errors for an ETL run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EtlError {
    /// Configuration error.
    #[snafu(display("Configuration error"), context(false))]
    Config { source: ConfigError },

    /// Failed to connect to the warehouse.
    #[snafu(display("Failed to connect to warehouse"))]
    Connect { source: sqlx::Error },

    /// A statement failed. The run stops at the first failure and surfaces
    /// the engine's error unchanged; there are no statement-level retries.
    #[snafu(display("Statement '{name}' failed during {stage} stage"))]
    Statement {
        name: &'static str,
        stage: StatementStage,
        source: sqlx::Error,
    },
}
