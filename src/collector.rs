//! # Option Collector
//!
//! Builds a validated [`BootstrapConfig`] from a mix of supplied values
//! (command-line flags and environment variables, already resolved by the
//! CLI) and interactive prompts.
//!
//! ## Resolution rule
//!
//! Every field follows the same rule: a supplied value is used when it is
//! valid; otherwise the operator is asked, with a default derived from the
//! fields collected so far; invalid answers print a corrective message and
//! the question is asked again.
//!
//! Supplied slugs that are not already normalized are never coerced
//! silently: their normalized form becomes the prompt default.
//!
//! ## Conditional flows
//!
//! - Deployment-specific settings are asked only for the selected deployment
//!   type, and `other-k8s` forces a single stack.
//! - Object storage settings are asked only for S3-compatible media storage.
//! - GitLab settings are asked only when GitLab is used; cloud credentials
//!   only when GitLab group variables are created.
//!
//! Declining a confirmation that guards a precondition (the GitLab group
//! exists, an existing service directory may be deleted) aborts the whole
//! collection with [`Error::Aborted`].

use std::path::{Path, PathBuf};

use crate::config::{
    BootstrapConfig, Choice, DeploymentType, DigitalOceanRedis, DigitalOceanSettings,
    Environment, EnvironmentDistribution, EnvironmentSettings, GitlabSettings,
    KubernetesCredentials, MediaStorage, OtherK8sSettings, S3Credentials, S3Settings,
    TerraformBackend, TerraformCloudSettings,
};
use crate::defaults;
use crate::error::{Error, Result};
use crate::prompt::{ask_masked, ask_secret, ask_validated, confirm_or_abort, Prompter};
use crate::slug::{
    is_identifier, is_slug, slugify, PROJECT_SLUG_SEPARATOR, SERVICE_SLUG_SEPARATOR,
};
use crate::suggestions::did_you_mean;
use crate::validation::{
    validate_domain, validate_email, validate_not_empty, validate_port, validate_secret,
    validate_url, Requirement, Validation,
};

/// Values supplied before collection starts. `None` means "ask".
///
/// For optional text fields `Some("")` is an explicit "unused".
#[derive(Debug, Clone, Default)]
pub struct CollectorOptions {
    pub output_dir: Option<PathBuf>,
    pub project_name: Option<String>,
    pub project_slug: Option<String>,
    pub service_slug: Option<String>,
    pub project_dirname: Option<String>,
    pub internal_service_port: Option<u16>,
    pub deployment_type: Option<String>,
    pub environment_distribution: Option<String>,
    pub project_domain: Option<String>,
    pub domain_prefix_dev: Option<String>,
    pub domain_prefix_stage: Option<String>,
    pub domain_prefix_prod: Option<String>,
    pub domain_prefix_monitoring: Option<String>,
    pub project_url_dev: Option<String>,
    pub project_url_stage: Option<String>,
    pub project_url_prod: Option<String>,
    pub project_url_monitoring: Option<String>,
    pub letsencrypt_certificate_email: Option<String>,
    pub terraform_backend: Option<String>,
    pub terraform_cloud_hostname: Option<String>,
    pub terraform_cloud_token: Option<String>,
    pub terraform_cloud_organization: Option<String>,
    pub terraform_cloud_organization_create: Option<bool>,
    pub terraform_cloud_admin_email: Option<String>,
    pub use_redis: Option<bool>,
    pub digitalocean_create_domain: Option<bool>,
    pub digitalocean_k8s_cluster_region: Option<String>,
    pub digitalocean_database_cluster_region: Option<String>,
    pub digitalocean_database_cluster_node_size: Option<String>,
    pub digitalocean_redis_cluster_region: Option<String>,
    pub digitalocean_redis_cluster_node_size: Option<String>,
    pub digitalocean_token: Option<String>,
    pub postgres_image: Option<String>,
    pub postgres_persistent_volume_capacity: Option<String>,
    pub postgres_persistent_volume_claim_capacity: Option<String>,
    pub postgres_persistent_volume_host_path: Option<String>,
    pub redis_image: Option<String>,
    pub kubernetes_host: Option<String>,
    pub kubernetes_token: Option<String>,
    pub kubernetes_cluster_ca_certificate: Option<PathBuf>,
    pub sentry_dsn: Option<String>,
    pub media_storage: Option<String>,
    pub s3_region: Option<String>,
    pub s3_host: Option<String>,
    pub s3_bucket_name: Option<String>,
    pub s3_access_id: Option<String>,
    pub s3_secret_key: Option<String>,
    pub use_gitlab: Option<bool>,
    pub gitlab_group_slug: Option<String>,
    pub gitlab_private_token: Option<String>,
    pub create_group_variables: Option<bool>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

/// Defaults the collector starts from, resolved once at the entry point.
#[derive(Debug, Clone)]
pub struct CollectorDefaults {
    /// Overrides the supplied output directory when set (`OUTPUT_BASE_DIR`).
    pub output_base_dir: Option<PathBuf>,
    pub service_slug: String,
    pub internal_service_port: u16,
    pub deployment_type: DeploymentType,
    pub terraform_backend: TerraformBackend,
    pub media_storage: MediaStorage,
}

impl Default for CollectorDefaults {
    fn default() -> Self {
        Self {
            output_base_dir: None,
            service_slug: defaults::SERVICE_SLUG.to_string(),
            internal_service_port: defaults::INTERNAL_SERVICE_PORT,
            deployment_type: DeploymentType::DigitaloceanK8s,
            terraform_backend: TerraformBackend::Gitlab,
            media_storage: MediaStorage::DigitaloceanS3,
        }
    }
}

/// Collects a [`BootstrapConfig`] through a [`Prompter`].
pub struct Collector<'a, P: Prompter + ?Sized> {
    prompter: &'a mut P,
    defaults: CollectorDefaults,
}

impl<'a, P: Prompter + ?Sized> Collector<'a, P> {
    pub fn new(prompter: &'a mut P, defaults: CollectorDefaults) -> Self {
        Self { prompter, defaults }
    }

    /// Run the whole collection.
    pub fn collect(&mut self, o: CollectorOptions) -> Result<BootstrapConfig> {
        let project_name =
            self.resolve_text(o.project_name, "Project name", None, validate_not_empty)?;
        let project_slug = self.clean_project_slug(&project_name, o.project_slug)?;
        let service_slug = self.clean_service_slug(o.service_slug)?;
        let project_dirname =
            self.clean_project_dirname(o.project_dirname, &project_slug, &service_slug)?;
        let output_dir = self
            .defaults
            .output_base_dir
            .clone()
            .or(o.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let (service_dir, replace_service_dir) =
            self.clean_service_dir(&output_dir, &project_dirname)?;
        let internal_service_port = self.clean_internal_service_port(o.internal_service_port)?;
        let deployment_type = self.clean_deployment_type(o.deployment_type)?;
        let environment_distribution =
            self.clean_environment_distribution(o.environment_distribution, deployment_type)?;

        let project_domain = self
            .resolve_text(
                o.project_domain,
                "Project domain (leave blank if unused)",
                Some(""),
                |v| validate_domain(v, Requirement::Optional),
            )
            .map(non_empty)?;
        let environments = self.clean_environments(
            &project_slug,
            project_domain.as_deref(),
            [
                (o.project_url_dev, o.domain_prefix_dev),
                (o.project_url_stage, o.domain_prefix_stage),
                (o.project_url_prod, o.domain_prefix_prod),
            ],
        )?;
        let letsencrypt_certificate_email = self
            .resolve_text(
                o.letsencrypt_certificate_email,
                "Let's Encrypt certificates email (leave blank if unused)",
                Some(""),
                |v| validate_email(v, Requirement::Optional),
            )
            .map(non_empty)?;
        let project_url_monitoring = self
            .resolve_text(
                o.project_url_monitoring,
                "Monitoring URL (leave blank if unused)",
                Some(""),
                |v| validate_url(v, Requirement::Optional),
            )
            .map(non_empty)?;
        let domain_prefix_monitoring = match (&project_domain, &project_url_monitoring) {
            (Some(_), Some(_)) => self
                .resolve_slug(
                    o.domain_prefix_monitoring,
                    "Monitoring domain prefix",
                    Some(defaults::DOMAIN_PREFIX_MONITORING),
                    PROJECT_SLUG_SEPARATOR,
                    |_| Ok(()),
                )
                .map(Some)?,
            _ => None,
        };

        let terraform_backend = self.clean_terraform_backend(o.terraform_backend)?;
        let terraform_cloud = match terraform_backend {
            TerraformBackend::TerraformCloud => Some(self.clean_terraform_cloud(
                o.terraform_cloud_hostname,
                o.terraform_cloud_token,
                o.terraform_cloud_organization,
                o.terraform_cloud_organization_create,
                o.terraform_cloud_admin_email,
            )?),
            TerraformBackend::Gitlab => None,
        };

        let use_redis = self.resolve_confirm(o.use_redis, "Do you want to use Redis?", Some(false))?;

        let mut digitalocean = None;
        let mut other_k8s = None;
        match deployment_type {
            DeploymentType::DigitaloceanK8s => {
                let create_domain = match project_domain {
                    Some(_) => self.resolve_confirm(
                        o.digitalocean_create_domain,
                        "Do you want to create the DigitalOcean domain?",
                        Some(true),
                    )?,
                    None => false,
                };
                let k8s_cluster_region = self.resolve_text(
                    o.digitalocean_k8s_cluster_region,
                    "DigitalOcean Kubernetes cluster region",
                    Some(defaults::DIGITALOCEAN_REGION),
                    validate_not_empty,
                )?;
                let database_cluster_region = self.resolve_text(
                    o.digitalocean_database_cluster_region,
                    "DigitalOcean database cluster region",
                    Some(defaults::DIGITALOCEAN_REGION),
                    validate_not_empty,
                )?;
                let database_cluster_node_size = self.resolve_text(
                    o.digitalocean_database_cluster_node_size,
                    "DigitalOcean database cluster node size",
                    Some(defaults::DIGITALOCEAN_DATABASE_NODE_SIZE),
                    validate_not_empty,
                )?;
                let redis = if use_redis {
                    Some(DigitalOceanRedis {
                        cluster_region: self.resolve_text(
                            o.digitalocean_redis_cluster_region,
                            "DigitalOcean Redis cluster region",
                            Some(defaults::DIGITALOCEAN_REGION),
                            validate_not_empty,
                        )?,
                        cluster_node_size: self.resolve_text(
                            o.digitalocean_redis_cluster_node_size,
                            "DigitalOcean Redis cluster node size",
                            Some(defaults::DIGITALOCEAN_REDIS_NODE_SIZE),
                            validate_not_empty,
                        )?,
                    })
                } else {
                    None
                };
                digitalocean = Some(DigitalOceanSettings {
                    create_domain,
                    k8s_cluster_region,
                    database_cluster_region,
                    database_cluster_node_size,
                    redis,
                    token: None,
                });
            }
            DeploymentType::OtherK8s => {
                let postgres_image = self.resolve_text(
                    o.postgres_image,
                    "Postgres image",
                    Some(defaults::POSTGRES_IMAGE),
                    validate_not_empty,
                )?;
                let postgres_persistent_volume_capacity = self.resolve_text(
                    o.postgres_persistent_volume_capacity,
                    "Postgres persistent volume capacity",
                    Some(defaults::POSTGRES_PERSISTENT_VOLUME_CAPACITY),
                    validate_not_empty,
                )?;
                let postgres_persistent_volume_claim_capacity = self.resolve_text(
                    o.postgres_persistent_volume_claim_capacity,
                    "Postgres persistent volume claim capacity",
                    Some(defaults::POSTGRES_PERSISTENT_VOLUME_CLAIM_CAPACITY),
                    validate_not_empty,
                )?;
                let postgres_persistent_volume_host_path = self.resolve_text(
                    o.postgres_persistent_volume_host_path,
                    "Postgres persistent volume host path",
                    Some(defaults::POSTGRES_PERSISTENT_VOLUME_HOST_PATH),
                    validate_not_empty,
                )?;
                let redis_image = if use_redis {
                    Some(self.resolve_text(
                        o.redis_image,
                        "Redis image",
                        Some(defaults::REDIS_IMAGE),
                        validate_not_empty,
                    )?)
                } else {
                    None
                };
                other_k8s = Some(OtherK8sSettings {
                    postgres_image,
                    postgres_persistent_volume_capacity,
                    postgres_persistent_volume_claim_capacity,
                    postgres_persistent_volume_host_path,
                    redis_image,
                    kubernetes: None,
                });
            }
        }

        let sentry_dsn = self
            .resolve_masked(
                o.sentry_dsn,
                "Sentry DSN (leave blank if unused)",
                true,
                |v| validate_url(v, Requirement::Optional),
            )
            .map(non_empty)?;

        let media_storage = self.clean_media_storage(o.media_storage)?;
        let mut s3 = self.clean_s3(
            media_storage,
            &project_slug,
            o.s3_region,
            o.s3_host,
            o.s3_bucket_name,
        )?;

        let gitlab = self.clean_gitlab(
            &project_slug,
            o.use_gitlab,
            o.gitlab_group_slug,
            o.gitlab_private_token,
            o.create_group_variables,
        )?;

        if gitlab.as_ref().is_some_and(|g| g.create_group_variables) {
            if let Some(settings) = digitalocean.as_mut() {
                settings.token = Some(self.resolve_secret(
                    o.digitalocean_token,
                    "DigitalOcean token",
                    Requirement::Required,
                )?);
            }
            if let Some(settings) = other_k8s.as_mut() {
                settings.kubernetes = Some(self.clean_kubernetes_credentials(
                    o.kubernetes_host,
                    o.kubernetes_token,
                    o.kubernetes_cluster_ca_certificate,
                )?);
            }
            if let Some(settings) = s3.as_mut() {
                settings.credentials = Some(S3Credentials {
                    access_id: self.resolve_secret(
                        o.s3_access_id,
                        "S3 Access Key ID",
                        Requirement::Required,
                    )?,
                    secret_key: self.resolve_secret(
                        o.s3_secret_key,
                        "S3 Secret Access Key",
                        Requirement::Required,
                    )?,
                });
            }
        }

        Ok(BootstrapConfig {
            project_name,
            project_slug,
            service_slug,
            project_dirname,
            output_dir,
            service_dir,
            replace_service_dir,
            internal_service_port,
            deployment_type,
            environment_distribution,
            project_domain,
            environments,
            letsencrypt_certificate_email,
            project_url_monitoring,
            domain_prefix_monitoring,
            terraform_backend,
            terraform_cloud,
            use_redis,
            digitalocean,
            other_k8s,
            sentry_dsn,
            media_storage,
            s3,
            gitlab,
            uid: o.uid,
            gid: o.gid,
            stacks: environment_distribution.stacks(),
        })
    }

    /// Project slug, defaulting to the slugified project name.
    pub fn clean_project_slug(
        &mut self,
        project_name: &str,
        supplied: Option<String>,
    ) -> Result<String> {
        let default = slugify(project_name, PROJECT_SLUG_SEPARATOR);
        self.resolve_slug(
            supplied,
            "Project slug",
            Some(&default).filter(|d| !d.is_empty()).map(String::as_str),
            PROJECT_SLUG_SEPARATOR,
            |_| Ok(()),
        )
    }

    /// Service slug: a separator-free identifier, `backend` by default.
    pub fn clean_service_slug(&mut self, supplied: Option<String>) -> Result<String> {
        let default = self.defaults.service_slug.clone();
        self.resolve_slug(
            supplied,
            "Service slug",
            Some(default.as_str()),
            SERVICE_SLUG_SEPARATOR,
            |slug| {
                if is_identifier(slug) {
                    Ok(())
                } else {
                    Err(format!(
                        "\"{}\" is not a valid identifier: it must start with a letter.",
                        slug
                    ))
                }
            },
        )
    }

    /// Project directory name: one of the service slug or the project slug.
    pub fn clean_project_dirname(
        &mut self,
        supplied: Option<String>,
        project_slug: &str,
        service_slug: &str,
    ) -> Result<String> {
        let mut choices = vec![service_slug];
        if project_slug != service_slug {
            choices.push(project_slug);
        }
        if let Some(value) = supplied {
            if choices.contains(&value.trim()) {
                return Ok(value.trim().to_string());
            }
            self.reject_supplied(
                "Project dirname",
                format!("\"{}\" is not one of {}.", value, choices.join(", ")),
            )?;
        }
        self.prompter.select("Project dirname", &choices, 0)
    }

    /// Absolute service directory; an existing one must be confirmed for
    /// deletion.
    pub fn clean_service_dir(
        &mut self,
        output_dir: &Path,
        project_dirname: &str,
    ) -> Result<(PathBuf, bool)> {
        let service_dir = std::path::absolute(output_dir.join(project_dirname))?;
        if service_dir.is_dir() {
            confirm_or_abort(
                self.prompter,
                &format!(
                    "A directory \"{}\" already exists and must be deleted. Continue?",
                    service_dir.display()
                ),
            )?;
            return Ok((service_dir, true));
        }
        Ok((service_dir, false))
    }

    pub fn clean_internal_service_port(&mut self, supplied: Option<u16>) -> Result<u16> {
        if let Some(port) = supplied.filter(|p| *p != 0) {
            return Ok(port);
        }
        let default = self.defaults.internal_service_port.to_string();
        let port = ask_validated(
            self.prompter,
            "Internal service port",
            Some(&default),
            validate_port,
        )?;
        port.parse().map_err(|_| Error::InvalidValue {
            field: "internal service port".to_string(),
            message: port.clone(),
        })
    }

    pub fn clean_deployment_type(&mut self, supplied: Option<String>) -> Result<DeploymentType> {
        let default = self.defaults.deployment_type;
        self.resolve_choice(supplied, "Deploy type", default)
    }

    /// Environment distribution; `other-k8s` always uses a single stack.
    pub fn clean_environment_distribution(
        &mut self,
        supplied: Option<String>,
        deployment_type: DeploymentType,
    ) -> Result<EnvironmentDistribution> {
        if deployment_type == DeploymentType::OtherK8s {
            if supplied.as_deref().is_some_and(|v| v.trim() != "1") {
                log::warn!("other-k8s deployments use a single stack, ignoring the distribution");
            }
            return Ok(EnvironmentDistribution::One);
        }
        self.resolve_choice(
            supplied,
            "Environment distribution (1: one stack, 2: dev+stage and prod, 3: one stack per environment)",
            EnvironmentDistribution::One,
        )
    }

    /// URLs and domain prefixes of the three environments.
    ///
    /// With a project domain, each environment gets a domain prefix and its
    /// URL defaults to `https://<prefix>.<domain>`; without one, URLs default
    /// to `https://<prefix>.<project_slug>.com`.
    pub fn clean_environments(
        &mut self,
        project_slug: &str,
        project_domain: Option<&str>,
        supplied: [(Option<String>, Option<String>); 3],
    ) -> Result<[EnvironmentSettings; 3]> {
        let [dev, stage, prod] = supplied;
        Ok([
            self.clean_environment(Environment::Dev, project_slug, project_domain, dev)?,
            self.clean_environment(Environment::Stage, project_slug, project_domain, stage)?,
            self.clean_environment(Environment::Prod, project_slug, project_domain, prod)?,
        ])
    }

    fn clean_environment(
        &mut self,
        environment: Environment,
        project_slug: &str,
        project_domain: Option<&str>,
        (url, prefix): (Option<String>, Option<String>),
    ) -> Result<EnvironmentSettings> {
        let default_prefix = match environment {
            Environment::Dev => defaults::DOMAIN_PREFIX_DEV,
            Environment::Stage => defaults::DOMAIN_PREFIX_STAGE,
            Environment::Prod => defaults::DOMAIN_PREFIX_PROD,
        };
        let domain_prefix = match project_domain {
            Some(_) => Some(self.resolve_slug(
                prefix,
                &format!("{} domain prefix", environment.name()),
                Some(default_prefix),
                PROJECT_SLUG_SEPARATOR,
                |_| Ok(()),
            )?),
            None => None,
        };
        let default_url = match (project_domain, &domain_prefix) {
            (Some(domain), Some(prefix)) => format!("https://{}.{}", prefix, domain),
            _ => format!("https://{}.{}.com", default_prefix, project_slug),
        };
        let url = self.resolve_text(
            url,
            &format!("{} environment complete URL", environment.name()),
            Some(&default_url),
            |v| validate_url(v, Requirement::Required),
        )?;
        Ok(EnvironmentSettings {
            environment,
            url,
            domain_prefix,
        })
    }

    pub fn clean_terraform_backend(&mut self, supplied: Option<String>) -> Result<TerraformBackend> {
        let default = self.defaults.terraform_backend;
        self.resolve_choice(supplied, "Terraform backend", default)
    }

    /// Terraform Cloud settings. The admin email is required only when the
    /// organization is created, and empty otherwise.
    pub fn clean_terraform_cloud(
        &mut self,
        hostname: Option<String>,
        token: Option<String>,
        organization: Option<String>,
        create_organization: Option<bool>,
        admin_email: Option<String>,
    ) -> Result<TerraformCloudSettings> {
        let hostname = self.resolve_text(
            hostname,
            "Terraform host name",
            Some(defaults::TERRAFORM_CLOUD_HOSTNAME),
            |v| validate_domain(v, Requirement::Required),
        )?;
        let token = self.resolve_secret(
            token,
            "Terraform Cloud User token",
            Requirement::Required,
        )?;
        let organization = self.resolve_text(
            organization,
            "Terraform Organization",
            None,
            validate_not_empty,
        )?;
        let create_organization = self.resolve_confirm(
            create_organization,
            "Do you want to create Terraform Cloud Organization?",
            Some(false),
        )?;
        let admin_email = if create_organization {
            self.resolve_text(
                admin_email,
                "Terraform Cloud Organization admin email (e.g. tech@20tab.com)",
                None,
                |v| validate_email(v, Requirement::Required),
            )?
        } else {
            String::new()
        };
        Ok(TerraformCloudSettings {
            hostname,
            token,
            organization,
            create_organization,
            admin_email,
        })
    }

    pub fn clean_media_storage(&mut self, supplied: Option<String>) -> Result<MediaStorage> {
        let default = self.defaults.media_storage;
        self.resolve_choice(supplied, "Media storage", default)
    }

    /// Object storage settings for S3-compatible media storage, `None`
    /// otherwise. Credentials are collected later, with the GitLab group
    /// variables.
    pub fn clean_s3(
        &mut self,
        media_storage: MediaStorage,
        project_slug: &str,
        region: Option<String>,
        host: Option<String>,
        bucket_name: Option<String>,
    ) -> Result<Option<S3Settings>> {
        let settings = match media_storage {
            MediaStorage::DigitaloceanS3 => {
                let region = self.resolve_text(
                    region,
                    "DigitalOcean Spaces region",
                    Some(defaults::DIGITALOCEAN_REGION),
                    validate_not_empty,
                )?;
                let host = host
                    .filter(|h| !h.trim().is_empty())
                    .unwrap_or_else(|| format!("{}.digitaloceanspaces.com", region));
                S3Settings {
                    region,
                    host,
                    bucket_name: None,
                    credentials: None,
                }
            }
            MediaStorage::AwsS3 => {
                let region = self.resolve_text(
                    region,
                    "AWS S3 region name",
                    Some(defaults::AWS_S3_REGION),
                    validate_not_empty,
                )?;
                let host = host
                    .filter(|h| !h.trim().is_empty())
                    .unwrap_or_else(|| format!("s3.{}.amazonaws.com", region));
                let bucket_name = self.resolve_text(
                    bucket_name,
                    "AWS S3 bucket name",
                    Some(project_slug),
                    validate_not_empty,
                )?;
                S3Settings {
                    region,
                    host,
                    bucket_name: Some(bucket_name),
                    credentials: None,
                }
            }
            MediaStorage::Local | MediaStorage::None => return Ok(None),
        };
        Ok(Some(settings))
    }

    /// GitLab settings, `None` when GitLab is not used.
    ///
    /// A declined "configure GitLab?" or an empty group slug disables GitLab
    /// whatever the Terraform backend. A supplied group slug implies GitLab.
    pub fn clean_gitlab(
        &mut self,
        project_slug: &str,
        use_gitlab: Option<bool>,
        group_slug: Option<String>,
        private_token: Option<String>,
        create_group_variables: Option<bool>,
    ) -> Result<Option<GitlabSettings>> {
        if use_gitlab == Some(false) {
            return Ok(None);
        }
        let group_slug = match group_slug {
            Some(slug) if slug.trim().is_empty() => return Ok(None),
            other => other,
        };
        if group_slug.is_none() {
            let use_gitlab =
                self.resolve_confirm(use_gitlab, "Do you want to configure GitLab?", Some(true))?;
            if !use_gitlab {
                return Ok(None);
            }
        }
        let group_slug = self.resolve_slug(
            group_slug,
            "GitLab group slug",
            Some(project_slug),
            PROJECT_SLUG_SEPARATOR,
            |_| Ok(()),
        )?;
        confirm_or_abort(
            self.prompter,
            &format!(
                "Make sure the GitLab \"{}\" group exists before proceeding. Continue?",
                group_slug
            ),
        )?;
        let private_token = self.resolve_secret(
            private_token,
            "GitLab private token (with API scope enabled)",
            Requirement::Required,
        )?;
        let create_group_variables = self.resolve_confirm(
            create_group_variables,
            "Do you want to create GitLab group variables?",
            Some(false),
        )?;
        Ok(Some(GitlabSettings {
            group_slug,
            private_token,
            create_group_variables,
        }))
    }

    fn clean_kubernetes_credentials(
        &mut self,
        host: Option<String>,
        token: Option<String>,
        cluster_ca_certificate: Option<PathBuf>,
    ) -> Result<KubernetesCredentials> {
        let host = self.resolve_text(host, "Kubernetes host", None, |v| {
            validate_url(v, Requirement::Required)
        })?;
        let token = self.resolve_secret(token, "Kubernetes token", Requirement::Required)?;
        let cluster_ca_certificate = self.resolve_text(
            cluster_ca_certificate.map(|p| p.display().to_string()),
            "Kubernetes cluster CA certificate file path",
            None,
            |v| {
                if Path::new(v).is_file() {
                    Ok(())
                } else {
                    Err(format!("\"{}\" is not an existing file.", v))
                }
            },
        )?;
        Ok(KubernetesCredentials {
            host,
            token,
            cluster_ca_certificate: PathBuf::from(cluster_ca_certificate),
        })
    }

    /// Report an invalid supplied value. Unattended runs cannot recover.
    fn reject_supplied(&mut self, field: &str, message: String) -> Result<()> {
        if !self.prompter.is_interactive() {
            return Err(Error::InvalidValue {
                field: field.to_string(),
                message,
            });
        }
        self.prompter.message(&message);
        Ok(())
    }

    fn resolve_text<F>(
        &mut self,
        supplied: Option<String>,
        prompt: &str,
        default: Option<&str>,
        validate: F,
    ) -> Result<String>
    where
        F: Fn(&str) -> Validation,
    {
        if let Some(value) = supplied {
            let value = value.trim().to_string();
            match validate(&value) {
                Ok(()) => return Ok(value),
                Err(message) => self.reject_supplied(prompt, message)?,
            }
        }
        ask_validated(self.prompter, prompt, default, validate)
    }

    fn resolve_masked<F>(
        &mut self,
        supplied: Option<String>,
        prompt: &str,
        allow_empty: bool,
        validate: F,
    ) -> Result<String>
    where
        F: Fn(&str) -> Validation,
    {
        if let Some(value) = supplied {
            match validate(&value) {
                Ok(()) => return Ok(value),
                Err(message) => self.reject_supplied(prompt, message)?,
            }
        }
        ask_masked(self.prompter, prompt, allow_empty, validate)
    }

    fn resolve_secret(
        &mut self,
        supplied: Option<String>,
        prompt: &str,
        requirement: Requirement,
    ) -> Result<String> {
        if let Some(value) = supplied {
            match validate_secret(&value, requirement) {
                Ok(()) => return Ok(value),
                Err(message) => self.reject_supplied(prompt, message)?,
            }
        }
        ask_secret(self.prompter, prompt, requirement)
    }

    /// Resolve a slug. Typed answers are normalized directly; a supplied value
    /// that is not a slug yet is offered, normalized, as the prompt default.
    fn resolve_slug<F>(
        &mut self,
        supplied: Option<String>,
        prompt: &str,
        default: Option<&str>,
        separator: &str,
        validate: F,
    ) -> Result<String>
    where
        F: Fn(&str) -> Validation,
    {
        let mut default = default.map(str::to_string);
        if let Some(value) = supplied {
            let normalized = slugify(&value, separator);
            if is_slug(&value, separator) && validate(&value).is_ok() {
                return Ok(value);
            }
            if !normalized.is_empty() && validate(&normalized).is_ok() {
                if !self.prompter.is_interactive() {
                    self.prompter.message(&format!(
                        "{}: \"{}\" is not a valid slug, using \"{}\".",
                        prompt, value, normalized
                    ));
                    return Ok(normalized);
                }
                default = Some(normalized);
            } else {
                self.reject_supplied(prompt, format!("\"{}\" is not a valid slug.", value))?;
            }
        }
        loop {
            let answer = self.prompter.input(prompt, default.as_deref())?;
            let slug = slugify(&answer, separator);
            let verdict = if slug.is_empty() {
                Err(format!("\"{}\" is not a valid slug.", answer))
            } else {
                validate(&slug)
            };
            match verdict {
                Ok(()) => return Ok(slug),
                Err(message) => self.reject_supplied(prompt, message)?,
            }
        }
    }

    fn resolve_choice<C: Choice>(
        &mut self,
        supplied: Option<String>,
        prompt: &str,
        default: C,
    ) -> Result<C> {
        if let Some(value) = supplied {
            if let Some(choice) = C::parse(&value) {
                return Ok(choice);
            }
            let mut message = format!("\"{}\" is not one of {}.", value, C::values().join(", "));
            if let Some(hint) = did_you_mean(&value, &C::values()) {
                message = format!("{} {}", message, hint);
            }
            self.reject_supplied(prompt, message)?;
        }
        let values = C::values();
        let default_index = values
            .iter()
            .position(|v| *v == default.as_str())
            .unwrap_or(0);
        let answer = self.prompter.select(prompt, &values, default_index)?;
        C::parse(&answer).ok_or_else(|| Error::InvalidValue {
            field: prompt.to_string(),
            message: answer,
        })
    }

    fn resolve_confirm(
        &mut self,
        supplied: Option<bool>,
        prompt: &str,
        default: Option<bool>,
    ) -> Result<bool> {
        match supplied {
            Some(value) => Ok(value),
            None => self.prompter.confirm(prompt, default),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
