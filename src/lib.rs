//! # Service Bootstrap Library
//!
//! This library provides the core functionality for bootstrapping a web
//! service from a project template: it gathers and validates the project
//! settings, derives the Terraform and GitLab variables they imply, and
//! drives the external tools that render the service and provision its
//! infrastructure. It is designed to be used by the `service-bootstrap`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use service_bootstrap::collector::{Collector, CollectorDefaults, CollectorOptions};
//! use service_bootstrap::prompt::NoInputPrompter;
//! use service_bootstrap::tfvars;
//!
//! let mut prompter = NoInputPrompter::new(true);
//! let options = CollectorOptions {
//!     project_name: Some("My Project".to_string()),
//!     output_dir: Some(std::env::temp_dir().join("service-bootstrap-doc")),
//!     deployment_type: Some("other-k8s".to_string()),
//!     media_storage: Some("local".to_string()),
//!     terraform_backend: Some("gitlab".to_string()),
//!     gitlab_group_slug: Some("my-group".to_string()),
//!     gitlab_private_token: Some("mYV4l1DT0k3N".to_string()),
//!     ..Default::default()
//! };
//! let config = Collector::new(&mut prompter, CollectorDefaults::default())
//!     .collect(options)
//!     .unwrap();
//! assert_eq!(config.project_slug, "my-project");
//!
//! let vars = tfvars::assemble(&config);
//! assert!(vars.get("environment_prod").is_some());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the record every step consumes, with its
//!   closed choices and the stack layout derived from the environment
//!   distribution.
//! - **Collection (`collector`, `prompt`, `validation`, `slug`)**: resolves
//!   every field from supplied values or prompts, re-asking on invalid input.
//! - **Variables (`tfvars`, `gitlab`)**: the grouped Terraform variables and
//!   the GitLab CI/CD variables derived from a record.
//! - **Execution (`runner`, `terraform`, `process`)**: the bootstrap steps and
//!   the external tools they drive, behind a mockable command runner.
//!
//! ## Execution Flow
//!
//! 1.  **Collect**: build a validated `BootstrapConfig`.
//! 2.  **Render**: generate the service from the template.
//! 3.  **Prepare**: env file, formatting, requirements, static directories.
//! 4.  **Provision**: GitLab project and Terraform Cloud workspaces through
//!     Terraform, with a compensating destroy when an apply fails.

pub mod collector;
pub mod config;
pub mod defaults;
pub mod error;
pub mod gitlab;
pub mod output;
pub mod process;
pub mod prompt;
pub mod runner;
pub mod secret;
pub mod slug;
pub mod suggestions;
pub mod terraform;
pub mod tfvars;
pub mod validation;

#[cfg(test)]
mod slug_proptest;

#[cfg(test)]
mod validation_proptest;
