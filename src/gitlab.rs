//! # GitLab CI Variables
//!
//! Builds the group and project CI/CD variables the `gitlab` Terraform module
//! creates next to the repository. Each variable is rendered as an HCL object
//! (`{value = "...", masked = true}`) and each set as an HCL map, which is the
//! form the module expects in `TF_VAR_gitlab_group_variables` and
//! `TF_VAR_gitlab_project_variables`.
//!
//! With the `terraform-cloud` backend the pipelines only need the Terraform
//! Cloud token; every other variable is specific to the `gitlab` backend.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::{BootstrapConfig, Environment, MediaStorage, TerraformBackend};
use crate::error::Result;
use crate::secret::{random_token, PASSWORD_LENGTH};
use crate::tfvars::quote;

/// One CI/CD variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub value: String,
    pub masked: bool,
}

impl Variable {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: false,
        }
    }

    pub fn masked(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: true,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.masked {
            write!(f, "{{value = {}, masked = true}}", quote(&self.value))
        } else {
            write!(f, "{{value = {}}}", quote(&self.value))
        }
    }
}

/// An ordered set of variables. Setting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSet {
    entries: Vec<(String, Variable)>,
}

impl VariableSet {
    pub fn set(&mut self, name: &str, variable: Variable) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = variable,
            None => self.entries.push((name.to_string(), variable)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, variable)| variable)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as an HCL map: `{NAME = {value = "..."}, ...}`.
    pub fn to_hcl(&self) -> String {
        let items: Vec<String> = self
            .entries
            .iter()
            .map(|(name, variable)| format!("{} = {}", name, variable))
            .collect();
        format!("{{{}}}", items.join(", "))
    }
}

/// Group and project variables for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitlabVariables {
    pub group: VariableSet,
    pub project: VariableSet,
}

/// Build the GitLab variables for `config`.
///
/// Reads the Kubernetes CA certificate file when `other-k8s` credentials
/// were collected.
pub fn gitlab_variables(config: &BootstrapConfig) -> Result<GitlabVariables> {
    let mut vars = GitlabVariables::default();
    let group = &mut vars.group;
    let project = &mut vars.project;

    if let Some(dsn) = &config.sentry_dsn {
        project.set("SENTRY_DSN", Variable::masked(dsn));
    }

    match config.terraform_backend {
        TerraformBackend::TerraformCloud => {
            if let Some(tfc) = &config.terraform_cloud {
                group.set("TFC_TOKEN", Variable::masked(&tfc.token));
            }
        }
        TerraformBackend::Gitlab => {
            project.set("BACKEND_SERVICE_SLUG", Variable::plain(&config.service_slug));
            for stack in &config.stacks {
                for environment in &stack.environments {
                    group.set(
                        &stack_slug_variable(*environment),
                        Variable::plain(stack.slug),
                    );
                }
            }
            project.set(
                "BACKEND_SERVICE_PORT",
                Variable::plain(config.internal_service_port.to_string()),
            );
            if let Some(domain) = &config.project_domain {
                group.set("DOMAIN", Variable::plain(domain));
            }
            if let Some(email) = &config.letsencrypt_certificate_email {
                project.set("LETSENCRYPT_CERTIFICATE_EMAIL", Variable::plain(email));
                project.set("SSL_ENABLED", Variable::plain("true"));
            }
            if config.use_redis {
                project.set("USE_REDIS", Variable::plain("true"));
            }
            if let Some(url) = &config.project_url_monitoring {
                project.set("MONITORING_URL", Variable::plain(url));
                project.set(
                    "GRAFANA_PASSWORD",
                    Variable::masked(random_token(PASSWORD_LENGTH)),
                );
                if let Some(prefix) = &config.domain_prefix_monitoring {
                    project.set("MONITORING_DOMAIN_PREFIX", Variable::plain(prefix));
                }
            }

            if let Some(digitalocean) = &config.digitalocean {
                if let Some(token) = &digitalocean.token {
                    group.set("DIGITALOCEAN_TOKEN", Variable::masked(token));
                }
                project.set(
                    "CREATE_DOMAIN",
                    Variable::plain(digitalocean.create_domain.to_string()),
                );
                project.set(
                    "DIGITALOCEAN_K8S_CLUSTER_REGION",
                    Variable::plain(&digitalocean.k8s_cluster_region),
                );
                project.set(
                    "DIGITALOCEAN_DATABASE_CLUSTER_REGION",
                    Variable::plain(&digitalocean.database_cluster_region),
                );
                project.set(
                    "DIGITALOCEAN_DATABASE_CLUSTER_NODE_SIZE",
                    Variable::plain(&digitalocean.database_cluster_node_size),
                );
                if let Some(redis) = digitalocean.redis.as_ref().filter(|_| config.use_redis) {
                    project.set(
                        "DIGITALOCEAN_REDIS_CLUSTER_REGION",
                        Variable::plain(&redis.cluster_region),
                    );
                    project.set(
                        "DIGITALOCEAN_REDIS_CLUSTER_NODE_SIZE",
                        Variable::plain(&redis.cluster_node_size),
                    );
                }
            }

            if let Some(other) = &config.other_k8s {
                if let Some(kubernetes) = &other.kubernetes {
                    let certificate = std::fs::read(&kubernetes.cluster_ca_certificate)?;
                    group.set(
                        "KUBERNETES_CLUSTER_CA_CERTIFICATE",
                        Variable::masked(STANDARD.encode(&certificate)),
                    );
                    group.set("KUBERNETES_HOST", Variable::plain(&kubernetes.host));
                    group.set("KUBERNETES_TOKEN", Variable::masked(&kubernetes.token));
                }
                project.set("POSTGRES_IMAGE", Variable::plain(&other.postgres_image));
                project.set(
                    "POSTGRES_PERSISTENT_VOLUME_CAPACITY",
                    Variable::plain(&other.postgres_persistent_volume_capacity),
                );
                project.set(
                    "POSTGRES_PERSISTENT_VOLUME_CLAIM_CAPACITY",
                    Variable::plain(&other.postgres_persistent_volume_claim_capacity),
                );
                project.set(
                    "POSTGRES_PERSISTENT_VOLUME_HOST_PATH",
                    Variable::plain(&other.postgres_persistent_volume_host_path),
                );
                if let Some(image) = other.redis_image.as_ref().filter(|_| config.use_redis) {
                    project.set("REDIS_IMAGE", Variable::plain(image));
                }
            }

            if let Some(s3) = config.s3.as_ref().filter(|_| config.media_storage.is_s3()) {
                if let Some(credentials) = &s3.credentials {
                    group.set("S3_ACCESS_ID", Variable::masked(&credentials.access_id));
                    group.set("S3_SECRET_KEY", Variable::masked(&credentials.secret_key));
                }
                group.set("S3_REGION", Variable::plain(&s3.region));
                group.set("S3_HOST", Variable::plain(&s3.host));
                if config.media_storage == MediaStorage::AwsS3 {
                    if let Some(bucket) = &s3.bucket_name {
                        group.set("S3_BUCKET_NAME", Variable::plain(bucket));
                    }
                }
            }
        }
    }

    log::debug!(
        "gitlab variables: group [{}], project [{}]",
        vars.group.names().collect::<Vec<_>>().join(", "),
        vars.project.names().collect::<Vec<_>>().join(", ")
    );
    Ok(vars)
}

/// Name of the group variable holding the stack slug of `environment`.
pub fn stack_slug_variable(environment: Environment) -> String {
    format!("STACK_SLUG_{}", environment.slug().to_uppercase())
}
