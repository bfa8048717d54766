//! # Error Handling
//!
//! This module defines the centralized error type for the `service-bootstrap`
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! anticipated failure mode, with messages that tell the operator what went
//! wrong and, where possible, where to look next.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure the collector, the assembler, the runner or the
//!   Terraform driver can report.
//! - **`Result<T>`**: alias for `std::result::Result<T, Error>`.
//!
//! Validation failures during prompting never surface here: they are recovered
//! locally by re-prompting. What reaches this type is either an abort (the
//! operator declined a required confirmation, or a non-interactive run lacks a
//! value) or the failure of an external tool.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for service-bootstrap operations
#[derive(Error, Debug)]
pub enum Error {
    /// The operator declined a confirmation marked as abort-on-decline.
    #[error("Aborted: {message}")]
    Aborted { message: String },

    /// A prompt was needed while running with `--no-input` and the field has
    /// no default.
    #[error("Missing value for {field}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    MissingInput {
        field: String,
        /// Optional hint naming the flag or environment variable to use
        hint: Option<String>,
    },

    /// A value supplied on the command line failed validation and could not
    /// be prompted for.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// An interactive prompt failed (closed terminal, broken pipe, ...).
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// An external tool could not be started or exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// `terraform init` exited non-zero; apply was not attempted.
    #[error(
        "Error performing Terraform init for {module} (check {} and {})",
        stderr_path.display(),
        log_path.display()
    )]
    TerraformInit {
        module: String,
        stderr_path: PathBuf,
        log_path: PathBuf,
    },

    /// `terraform apply` exited non-zero. A compensating destroy was run; if
    /// it failed too, its log paths are carried in `destroy_failure`.
    #[error(
        "Error applying Terraform {module} configuration (check {} and {}){}",
        stderr_path.display(),
        log_path.display(),
        destroy_failure.as_ref().map(|(stderr, log)| format!(
            "\nError performing Terraform destroy (check {} and {})",
            stderr.display(),
            log.display()
        )).unwrap_or_default()
    )]
    TerraformApply {
        module: String,
        stderr_path: PathBuf,
        log_path: PathBuf,
        destroy_failure: Option<(PathBuf, PathBuf)>,
    },

    /// A file the pipeline relies on is missing from the generated service.
    #[error("Template output error: {message}")]
    TemplateOutput { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
