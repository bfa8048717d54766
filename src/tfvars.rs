//! # Variable Assembler
//!
//! Maps a completed [`BootstrapConfig`] onto the named variable groups the
//! Terraform modules consume.
//!
//! ## Groups
//!
//! Three group families exist: `base`, `cluster` and `environment`. A family
//! may be suffixed with a stack slug (`cluster_main`) or an environment slug
//! (`environment_prod`) for variables that differ per stack or environment.
//! A group appears in the output only if at least one rule added to it.
//!
//! ## Ordering
//!
//! Groups and the variables inside them keep insertion order: the rule that
//! fires first wins the position. The JSON form handed to Terraform through
//! `TF_VAR_tfvars` preserves that order.
//!
//! ## Serialization
//!
//! Every value carries a [`TfVarValue`] tag that decides how it is written:
//! strings are quoted, booleans and numbers are bare, lists are bracketed.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::{BootstrapConfig, DeploymentType, Environment, MediaStorage};
use crate::error::Result;

pub const BASE: &str = "base";
pub const CLUSTER: &str = "cluster";
pub const ENVIRONMENT: &str = "environment";

/// A typed Terraform variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TfVarValue {
    String(String),
    Bool(bool),
    Number(i64),
    List(Vec<String>),
}

impl TfVarValue {
    pub fn string(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Quote `value` as an HCL string literal.
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for TfVarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(&quote(value)),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Number(value) => write!(f, "{}", value),
            Self::List(values) => {
                let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// Ordered variable groups, each an ordered list of `name=value` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TfVars {
    groups: Vec<(String, Vec<String>)>,
}

impl TfVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name=value` to `group`, creating the group at the end if new.
    pub fn add(&mut self, group: &str, name: &str, value: TfVarValue) {
        let line = format!("{}={}", name, value);
        match self.groups.iter_mut().find(|(g, _)| g == group) {
            Some((_, lines)) => lines.push(line),
            None => self.groups.push((group.to_string(), vec![line])),
        }
    }

    /// The lines of one group.
    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, lines)| lines.as_slice())
    }

    /// Group names in insertion order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(g, _)| g.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(g, lines)| (g.as_str(), lines.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether any group holds a variable called `name`.
    pub fn contains_var(&self, name: &str) -> bool {
        let prefix = format!("{}=", name);
        self.groups
            .iter()
            .flat_map(|(_, lines)| lines)
            .any(|line| line.starts_with(&prefix))
    }

    /// JSON object keyed by group name, in insertion order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for TfVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (group, lines) in &self.groups {
            map.serialize_entry(group, lines)?;
        }
        map.end()
    }
}

fn suffixed(family: &str, suffix: &str) -> String {
    format!("{}_{}", family, suffix)
}

/// Assemble the Terraform variable groups for `config`.
pub fn assemble(config: &BootstrapConfig) -> TfVars {
    let mut vars = TfVars::new();
    let s = TfVarValue::string;

    if let Some(domain) = &config.project_domain {
        vars.add(CLUSTER, "project_domain", s(domain));
    }
    if let Some(email) = &config.letsencrypt_certificate_email {
        vars.add(CLUSTER, "letsencrypt_certificate_email", s(email));
        vars.add(CLUSTER, "ssl_enabled", TfVarValue::Bool(true));
    }
    if config.use_redis {
        vars.add(BASE, "use_redis", TfVarValue::Bool(true));
        vars.add(ENVIRONMENT, "use_redis", TfVarValue::Bool(true));
    }
    if let Some(url) = &config.project_url_monitoring {
        vars.add(CLUSTER, "monitoring_url", s(url));
        if let Some(prefix) = &config.domain_prefix_monitoring {
            vars.add(CLUSTER, "monitoring_domain_prefix", s(prefix));
        }
    }

    match config.deployment_type {
        DeploymentType::DigitaloceanK8s => {
            if let Some(digitalocean) = &config.digitalocean {
                if config.project_domain.is_some() {
                    vars.add(
                        CLUSTER,
                        "create_domain",
                        TfVarValue::Bool(digitalocean.create_domain),
                    );
                }
                vars.add(BASE, "k8s_cluster_region", s(&digitalocean.k8s_cluster_region));
                vars.add(
                    BASE,
                    "database_cluster_region",
                    s(&digitalocean.database_cluster_region),
                );
                vars.add(
                    BASE,
                    "database_cluster_node_size",
                    s(&digitalocean.database_cluster_node_size),
                );
                if let Some(redis) = digitalocean.redis.as_ref().filter(|_| config.use_redis) {
                    vars.add(BASE, "redis_cluster_region", s(&redis.cluster_region));
                    vars.add(BASE, "redis_cluster_node_size", s(&redis.cluster_node_size));
                }
            }
        }
        DeploymentType::OtherK8s => {
            if let Some(other) = &config.other_k8s {
                vars.add(ENVIRONMENT, "postgres_image", s(&other.postgres_image));
                vars.add(
                    ENVIRONMENT,
                    "postgres_persistent_volume_capacity",
                    s(&other.postgres_persistent_volume_capacity),
                );
                vars.add(
                    ENVIRONMENT,
                    "postgres_persistent_volume_claim_capacity",
                    s(&other.postgres_persistent_volume_claim_capacity),
                );
                vars.add(
                    ENVIRONMENT,
                    "postgres_persistent_volume_host_path",
                    s(&other.postgres_persistent_volume_host_path),
                );
                if let Some(image) = other.redis_image.as_ref().filter(|_| config.use_redis) {
                    vars.add(ENVIRONMENT, "redis_image", s(image));
                }
            }
        }
    }

    if config.media_storage == MediaStorage::DigitaloceanS3 {
        vars.add(BASE, "create_s3_bucket", TfVarValue::Bool(true));
        vars.add(
            ENVIRONMENT,
            "digitalocean_spaces_bucket_available",
            TfVarValue::Bool(true),
        );
    }

    for stack in &config.stacks {
        let mut domain_prefixes = Vec::new();
        for &environment in &stack.environments {
            let settings = config.environment(environment);
            let group = suffixed(ENVIRONMENT, environment.slug());
            vars.add(
                &group,
                "basic_auth_enabled",
                TfVarValue::Bool(environment != Environment::Prod),
            );
            vars.add(&group, "project_url", s(&settings.url));
            vars.add(&group, "stack_slug", s(stack.slug));
            if let Some(prefix) = &settings.domain_prefix {
                domain_prefixes.push(prefix.clone());
                vars.add(&group, "domain_prefix", s(prefix));
            }
        }
        if !domain_prefixes.is_empty() {
            vars.add(
                &suffixed(CLUSTER, stack.slug),
                "domain_prefixes",
                TfVarValue::List(domain_prefixes),
            );
        }
    }

    log::debug!(
        "assembled terraform variable groups: {}",
        vars.group_names().collect::<Vec<_>>().join(", ")
    );
    vars
}
