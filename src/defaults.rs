//! Default values for service-bootstrap.
//!
//! This module provides centralized default values used by the collector and
//! the runner, ensuring consistency and avoiding duplication. Values that may
//! come from the environment are not read here: the CLI resolves them once and
//! passes them in.

use std::path::PathBuf;

/// Environment variable holding the GitLab private token.
pub const GITLAB_TOKEN_ENV_VAR: &str = "GITLAB_PRIVATE_TOKEN";

/// Environment variable overriding the output directory.
pub const OUTPUT_BASE_DIR_ENV_VAR: &str = "OUTPUT_BASE_DIR";

pub const SERVICE_SLUG: &str = "backend";

pub const INTERNAL_SERVICE_PORT: u16 = 8000;

/// Minimum length of a required secret.
pub const SECRET_MIN_LENGTH: usize = 8;

pub const TERRAFORM_CLOUD_HOSTNAME: &str = "app.terraform.io";

pub const DIGITALOCEAN_REGION: &str = "fra1";
pub const DIGITALOCEAN_DATABASE_NODE_SIZE: &str = "db-s-1vcpu-2gb";
pub const DIGITALOCEAN_REDIS_NODE_SIZE: &str = "db-s-1vcpu-2gb";

pub const AWS_S3_REGION: &str = "eu-west-1";

pub const POSTGRES_IMAGE: &str = "postgres:14-bullseye";
pub const POSTGRES_PERSISTENT_VOLUME_CAPACITY: &str = "10Gi";
pub const POSTGRES_PERSISTENT_VOLUME_CLAIM_CAPACITY: &str = "10Gi";
pub const POSTGRES_PERSISTENT_VOLUME_HOST_PATH: &str = "/var/lib/postgresql/data";
pub const REDIS_IMAGE: &str = "redis:6.2-bullseye";

pub const DOMAIN_PREFIX_DEV: &str = "dev";
pub const DOMAIN_PREFIX_STAGE: &str = "stage";
pub const DOMAIN_PREFIX_PROD: &str = "www";
pub const DOMAIN_PREFIX_MONITORING: &str = "logs";

/// Name of the Terraform module provisioning the GitLab project.
pub const TERRAFORM_MODULE_GITLAB: &str = "gitlab";

/// Name of the Terraform module provisioning Terraform Cloud workspaces.
pub const TERRAFORM_MODULE_TERRAFORM_CLOUD: &str = "terraform-cloud";

/// Template rendered when `--template` is not given.
pub const TEMPLATE_DIR: &str = ".";

/// Directory holding one sub-directory per Terraform module.
pub const TERRAFORM_MODULES_DIR: &str = "terraform";

/// Returns the default directory holding Terraform data for a run.
pub fn default_terraform_dir(run_id: &str) -> PathBuf {
    PathBuf::from(".terraform").join(run_id)
}

/// Returns the default directory holding the log files for a run.
pub fn default_logs_dir(run_id: &str) -> PathBuf {
    PathBuf::from(".logs").join(run_id)
}
