//! # Shared Collection Arguments
//!
//! The flags and environment variables every collecting command accepts, and
//! the glue that turns them into a [`BootstrapConfig`] through the collector.
//! Environment fallbacks are resolved here, once, by clap; the library never
//! reads the environment itself.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args};

use service_bootstrap::collector::{Collector, CollectorDefaults, CollectorOptions};
use service_bootstrap::config::BootstrapConfig;
use service_bootstrap::defaults::{GITLAB_TOKEN_ENV_VAR, OUTPUT_BASE_DIR_ENV_VAR};
use service_bootstrap::prompt::{NoInputPrompter, Prompter, TerminalPrompter};

/// Service settings. Anything not given here is asked interactively.
#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Never prompt: use defaults and fail on values without one
    #[arg(long)]
    pub no_input: bool,

    /// Answer yes to confirmations (with --no-input)
    #[arg(short, long)]
    pub yes: bool,

    /// Directory the service is generated in
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Overrides --output-dir
    #[arg(long, value_name = "PATH", env = OUTPUT_BASE_DIR_ENV_VAR, hide = true)]
    pub output_base_dir: Option<PathBuf>,

    #[arg(long, value_name = "NAME")]
    pub project_name: Option<String>,

    #[arg(long, value_name = "SLUG")]
    pub project_slug: Option<String>,

    #[arg(long, value_name = "SLUG")]
    pub service_slug: Option<String>,

    /// Name of the generated directory (the service or the project slug)
    #[arg(long, value_name = "NAME")]
    pub project_dirname: Option<String>,

    #[arg(long, value_name = "PORT")]
    pub internal_service_port: Option<u16>,

    /// digitalocean-k8s or other-k8s
    #[arg(long, value_name = "TYPE")]
    pub deployment_type: Option<String>,

    /// Number of stacks: 1, 2 or 3
    #[arg(long, value_name = "N")]
    pub environment_distribution: Option<String>,

    /// Project domain; an empty value means none
    #[arg(long, value_name = "DOMAIN")]
    pub project_domain: Option<String>,

    #[arg(long, value_name = "PREFIX")]
    pub domain_prefix_dev: Option<String>,

    #[arg(long, value_name = "PREFIX")]
    pub domain_prefix_stage: Option<String>,

    #[arg(long, value_name = "PREFIX")]
    pub domain_prefix_prod: Option<String>,

    #[arg(long, value_name = "PREFIX")]
    pub domain_prefix_monitoring: Option<String>,

    #[arg(long, value_name = "URL")]
    pub project_url_dev: Option<String>,

    #[arg(long, value_name = "URL")]
    pub project_url_stage: Option<String>,

    #[arg(long, value_name = "URL")]
    pub project_url_prod: Option<String>,

    #[arg(long, value_name = "URL")]
    pub project_url_monitoring: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub letsencrypt_certificate_email: Option<String>,

    /// gitlab or terraform-cloud
    #[arg(long, value_name = "BACKEND")]
    pub terraform_backend: Option<String>,

    #[arg(long, value_name = "HOST")]
    pub terraform_cloud_hostname: Option<String>,

    #[arg(long, value_name = "TOKEN", env = "TFC_TOKEN", hide_env_values = true)]
    pub terraform_cloud_token: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub terraform_cloud_organization: Option<String>,

    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub terraform_cloud_organization_create: Option<bool>,

    #[arg(long, value_name = "EMAIL")]
    pub terraform_cloud_admin_email: Option<String>,

    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub use_redis: Option<bool>,

    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub digitalocean_create_domain: Option<bool>,

    #[arg(long, value_name = "REGION")]
    pub digitalocean_k8s_cluster_region: Option<String>,

    #[arg(long, value_name = "REGION")]
    pub digitalocean_database_cluster_region: Option<String>,

    #[arg(long, value_name = "SIZE")]
    pub digitalocean_database_cluster_node_size: Option<String>,

    #[arg(long, value_name = "REGION")]
    pub digitalocean_redis_cluster_region: Option<String>,

    #[arg(long, value_name = "SIZE")]
    pub digitalocean_redis_cluster_node_size: Option<String>,

    #[arg(long, value_name = "TOKEN", env = "DIGITALOCEAN_TOKEN", hide_env_values = true)]
    pub digitalocean_token: Option<String>,

    #[arg(long, value_name = "IMAGE")]
    pub postgres_image: Option<String>,

    #[arg(long, value_name = "SIZE")]
    pub postgres_persistent_volume_capacity: Option<String>,

    #[arg(long, value_name = "SIZE")]
    pub postgres_persistent_volume_claim_capacity: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub postgres_persistent_volume_host_path: Option<String>,

    #[arg(long, value_name = "IMAGE")]
    pub redis_image: Option<String>,

    #[arg(long, value_name = "URL")]
    pub kubernetes_host: Option<String>,

    #[arg(long, value_name = "TOKEN", env = "KUBERNETES_TOKEN", hide_env_values = true)]
    pub kubernetes_token: Option<String>,

    /// Path to the cluster CA certificate
    #[arg(long, value_name = "PATH")]
    pub kubernetes_cluster_ca_certificate: Option<PathBuf>,

    #[arg(long, value_name = "DSN", env = "SENTRY_DSN", hide_env_values = true)]
    pub sentry_dsn: Option<String>,

    /// digitalocean-s3, aws-s3, local or none
    #[arg(long, value_name = "STORAGE")]
    pub media_storage: Option<String>,

    #[arg(long, value_name = "REGION")]
    pub s3_region: Option<String>,

    #[arg(long, value_name = "HOST")]
    pub s3_host: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub s3_bucket_name: Option<String>,

    #[arg(long, value_name = "ID", env = "S3_ACCESS_ID", hide_env_values = true)]
    pub s3_access_id: Option<String>,

    #[arg(long, value_name = "KEY", env = "S3_SECRET_KEY", hide_env_values = true)]
    pub s3_secret_key: Option<String>,

    /// Configure GitLab
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub use_gitlab: Option<bool>,

    /// Skip GitLab (same as --use-gitlab false)
    #[arg(long, conflicts_with = "use_gitlab")]
    pub no_gitlab: bool,

    /// GitLab group slug; an empty value disables GitLab
    #[arg(long, value_name = "SLUG")]
    pub gitlab_group_slug: Option<String>,

    #[arg(long, value_name = "TOKEN", env = GITLAB_TOKEN_ENV_VAR, hide_env_values = true)]
    pub gitlab_private_token: Option<String>,

    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub create_group_variables: Option<bool>,

    /// Owner of the generated files
    #[arg(long, value_name = "UID", env = "UID")]
    pub uid: Option<u32>,

    #[arg(long, value_name = "GID", env = "GID")]
    pub gid: Option<u32>,
}

impl CollectArgs {
    fn into_parts(self) -> (CollectorDefaults, CollectorOptions) {
        let defaults = CollectorDefaults {
            output_base_dir: self.output_base_dir,
            ..CollectorDefaults::default()
        };
        let options = CollectorOptions {
            output_dir: self.output_dir,
            project_name: self.project_name,
            project_slug: self.project_slug,
            service_slug: self.service_slug,
            project_dirname: self.project_dirname,
            internal_service_port: self.internal_service_port,
            deployment_type: self.deployment_type,
            environment_distribution: self.environment_distribution,
            project_domain: self.project_domain,
            domain_prefix_dev: self.domain_prefix_dev,
            domain_prefix_stage: self.domain_prefix_stage,
            domain_prefix_prod: self.domain_prefix_prod,
            domain_prefix_monitoring: self.domain_prefix_monitoring,
            project_url_dev: self.project_url_dev,
            project_url_stage: self.project_url_stage,
            project_url_prod: self.project_url_prod,
            project_url_monitoring: self.project_url_monitoring,
            letsencrypt_certificate_email: self.letsencrypt_certificate_email,
            terraform_backend: self.terraform_backend,
            terraform_cloud_hostname: self.terraform_cloud_hostname,
            terraform_cloud_token: self.terraform_cloud_token,
            terraform_cloud_organization: self.terraform_cloud_organization,
            terraform_cloud_organization_create: self.terraform_cloud_organization_create,
            terraform_cloud_admin_email: self.terraform_cloud_admin_email,
            use_redis: self.use_redis,
            digitalocean_create_domain: self.digitalocean_create_domain,
            digitalocean_k8s_cluster_region: self.digitalocean_k8s_cluster_region,
            digitalocean_database_cluster_region: self.digitalocean_database_cluster_region,
            digitalocean_database_cluster_node_size: self.digitalocean_database_cluster_node_size,
            digitalocean_redis_cluster_region: self.digitalocean_redis_cluster_region,
            digitalocean_redis_cluster_node_size: self.digitalocean_redis_cluster_node_size,
            digitalocean_token: self.digitalocean_token,
            postgres_image: self.postgres_image,
            postgres_persistent_volume_capacity: self.postgres_persistent_volume_capacity,
            postgres_persistent_volume_claim_capacity: self
                .postgres_persistent_volume_claim_capacity,
            postgres_persistent_volume_host_path: self.postgres_persistent_volume_host_path,
            redis_image: self.redis_image,
            kubernetes_host: self.kubernetes_host,
            kubernetes_token: self.kubernetes_token,
            kubernetes_cluster_ca_certificate: self.kubernetes_cluster_ca_certificate,
            sentry_dsn: self.sentry_dsn,
            media_storage: self.media_storage,
            s3_region: self.s3_region,
            s3_host: self.s3_host,
            s3_bucket_name: self.s3_bucket_name,
            s3_access_id: self.s3_access_id,
            s3_secret_key: self.s3_secret_key,
            use_gitlab: if self.no_gitlab {
                Some(false)
            } else {
                self.use_gitlab
            },
            gitlab_group_slug: self.gitlab_group_slug,
            gitlab_private_token: self.gitlab_private_token,
            create_group_variables: self.create_group_variables,
            uid: self.uid,
            gid: self.gid,
        };
        (defaults, options)
    }

    /// Collect the configuration, prompting on the terminal unless
    /// `--no-input` was given.
    pub fn collect(self) -> Result<BootstrapConfig> {
        let mut prompter: Box<dyn Prompter> = if self.no_input {
            Box::new(NoInputPrompter::new(self.yes))
        } else {
            Box::new(TerminalPrompter::new())
        };
        let (defaults, options) = self.into_parts();
        let config = Collector::new(prompter.as_mut(), defaults).collect(options)?;
        log::debug!("collected configuration: {:?}", config.service_dir);
        Ok(config)
    }
}
