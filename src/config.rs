//! # Configuration Record
//!
//! This module defines the record the collector builds and every later step
//! consumes: identity fields, topology (deployment type, environment
//! distribution, per-environment URLs), provisioning settings and the derived
//! stack layout.
//!
//! ## Closed choices
//!
//! Every enumerated field implements [`Choice`], which gives the collector a
//! uniform way to list the accepted values and parse operator input. The
//! textual values are the ones the templates and the Terraform modules expect
//! (`digitalocean-k8s`, `terraform-cloud`, ...).
//!
//! ## Branch-specific settings
//!
//! Settings that only exist for one deployment type, media storage backend or
//! Terraform backend are grouped in `Option`al structs, so a record can never
//! carry, say, DigitalOcean regions for an `other-k8s` deployment.

use std::fmt;
use std::path::PathBuf;

/// A closed set of textual values.
pub trait Choice: Sized + Copy + 'static {
    /// Every variant, in prompt order.
    const ALL: &'static [Self];

    /// The textual value of the variant.
    fn as_str(&self) -> &'static str;

    /// Parse a value, ignoring ASCII case and surrounding whitespace.
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|choice| choice.as_str().eq_ignore_ascii_case(value))
    }

    /// The textual values of every variant.
    fn values() -> Vec<&'static str> {
        Self::ALL.iter().map(Choice::as_str).collect()
    }
}

macro_rules! impl_display_for_choice {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

/// Where the service is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentType {
    DigitaloceanK8s,
    OtherK8s,
}

impl Choice for DeploymentType {
    const ALL: &'static [Self] = &[Self::DigitaloceanK8s, Self::OtherK8s];

    fn as_str(&self) -> &'static str {
        match self {
            Self::DigitaloceanK8s => "digitalocean-k8s",
            Self::OtherK8s => "other-k8s",
        }
    }
}

/// How the three environments are spread across stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentDistribution {
    /// A single stack holds dev, stage and prod.
    One,
    /// dev and stage share a stack, prod is isolated.
    Two,
    /// One stack per environment.
    Three,
}

impl Choice for EnvironmentDistribution {
    const ALL: &'static [Self] = &[Self::One, Self::Two, Self::Three];

    fn as_str(&self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
        }
    }
}

impl EnvironmentDistribution {
    /// The stack layout for this distribution.
    ///
    /// Stacks are returned in a stable order and partition
    /// [`Environment::ALL`] with no omissions or duplicates.
    pub fn stacks(self) -> Vec<Stack> {
        use Environment::*;
        match self {
            Self::One => vec![Stack::new(STACK_MAIN, vec![Dev, Stage, Prod])],
            Self::Two => vec![
                Stack::new(STACK_DEV, vec![Dev, Stage]),
                Stack::new(STACK_MAIN, vec![Prod]),
            ],
            Self::Three => vec![
                Stack::new(STACK_DEV, vec![Dev]),
                Stack::new(STACK_STAGE, vec![Stage]),
                Stack::new(STACK_MAIN, vec![Prod]),
            ],
        }
    }
}

pub const STACK_MAIN: &str = "main";
pub const STACK_DEV: &str = "dev";
pub const STACK_STAGE: &str = "stage";

/// A deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Environment {
    Dev,
    Stage,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Stage, Environment::Prod];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Stage => "stage",
            Self::Prod => "prod",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dev => "Development",
            Self::Stage => "Staging",
            Self::Prod => "Production",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Dev => 0,
            Self::Stage => 1,
            Self::Prod => 2,
        }
    }
}

/// A named provisioning unit holding one or more environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    pub slug: &'static str,
    pub environments: Vec<Environment>,
}

impl Stack {
    fn new(slug: &'static str, environments: Vec<Environment>) -> Self {
        Self { slug, environments }
    }
}

/// Where Terraform keeps its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerraformBackend {
    Gitlab,
    TerraformCloud,
}

impl Choice for TerraformBackend {
    const ALL: &'static [Self] = &[Self::Gitlab, Self::TerraformCloud];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Gitlab => "gitlab",
            Self::TerraformCloud => "terraform-cloud",
        }
    }
}

/// Where uploaded media files are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStorage {
    DigitaloceanS3,
    AwsS3,
    Local,
    None,
}

impl Choice for MediaStorage {
    const ALL: &'static [Self] = &[Self::DigitaloceanS3, Self::AwsS3, Self::Local, Self::None];

    fn as_str(&self) -> &'static str {
        match self {
            Self::DigitaloceanS3 => "digitalocean-s3",
            Self::AwsS3 => "aws-s3",
            Self::Local => "local",
            Self::None => "none",
        }
    }
}

impl MediaStorage {
    /// Whether the backend is an S3-compatible object storage.
    pub fn is_s3(self) -> bool {
        matches!(self, Self::DigitaloceanS3 | Self::AwsS3)
    }
}

impl_display_for_choice!(
    DeploymentType,
    EnvironmentDistribution,
    TerraformBackend,
    MediaStorage
);

/// URL and optional domain prefix of one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub environment: Environment,
    pub url: String,
    pub domain_prefix: Option<String>,
}

/// Terraform Cloud settings, present only with the `terraform-cloud` backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformCloudSettings {
    pub hostname: String,
    pub token: String,
    pub organization: String,
    pub create_organization: bool,
    /// Empty unless the organization is created.
    pub admin_email: String,
}

/// DigitalOcean settings, present only for `digitalocean-k8s` deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalOceanSettings {
    pub create_domain: bool,
    pub k8s_cluster_region: String,
    pub database_cluster_region: String,
    pub database_cluster_node_size: String,
    /// Present only when redis is used.
    pub redis: Option<DigitalOceanRedis>,
    /// Collected only when GitLab group variables are created.
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalOceanRedis {
    pub cluster_region: String,
    pub cluster_node_size: String,
}

/// Settings for a generic Kubernetes cluster (`other-k8s`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherK8sSettings {
    pub postgres_image: String,
    pub postgres_persistent_volume_capacity: String,
    pub postgres_persistent_volume_claim_capacity: String,
    pub postgres_persistent_volume_host_path: String,
    /// Present only when redis is used.
    pub redis_image: Option<String>,
    /// Collected only when GitLab group variables are created.
    pub kubernetes: Option<KubernetesCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubernetesCredentials {
    pub host: String,
    pub token: String,
    pub cluster_ca_certificate: PathBuf,
}

/// Object storage settings, present only for S3-compatible media storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub region: String,
    pub host: String,
    /// Set only for `aws-s3`.
    pub bucket_name: Option<String>,
    /// Collected only when GitLab group variables are created.
    pub credentials: Option<S3Credentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Credentials {
    pub access_id: String,
    pub secret_key: String,
}

/// GitLab settings, present only when GitLab is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitlabSettings {
    pub group_slug: String,
    pub private_token: String,
    pub create_group_variables: bool,
}

/// The fully validated configuration of one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub project_name: String,
    pub project_slug: String,
    pub service_slug: String,
    pub project_dirname: String,
    pub output_dir: PathBuf,
    pub service_dir: PathBuf,
    /// The service directory already existed and the operator agreed to
    /// replace it.
    pub replace_service_dir: bool,
    pub internal_service_port: u16,
    pub deployment_type: DeploymentType,
    pub environment_distribution: EnvironmentDistribution,
    pub project_domain: Option<String>,
    /// Ordered dev, stage, prod.
    pub environments: [EnvironmentSettings; 3],
    pub letsencrypt_certificate_email: Option<String>,
    pub project_url_monitoring: Option<String>,
    pub domain_prefix_monitoring: Option<String>,
    pub terraform_backend: TerraformBackend,
    pub terraform_cloud: Option<TerraformCloudSettings>,
    pub use_redis: bool,
    pub digitalocean: Option<DigitalOceanSettings>,
    pub other_k8s: Option<OtherK8sSettings>,
    pub sentry_dsn: Option<String>,
    pub media_storage: MediaStorage,
    pub s3: Option<S3Settings>,
    pub gitlab: Option<GitlabSettings>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    /// Derived from `environment_distribution`.
    pub stacks: Vec<Stack>,
}

impl BootstrapConfig {
    pub fn environment(&self, environment: Environment) -> &EnvironmentSettings {
        &self.environments[environment.index()]
    }

    /// The slug of the stack holding `environment`.
    pub fn stack_of(&self, environment: Environment) -> Option<&'static str> {
        self.stacks
            .iter()
            .find(|stack| stack.environments.contains(&environment))
            .map(|stack| stack.slug)
    }
}
