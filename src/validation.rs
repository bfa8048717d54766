//! # Input Validation
//!
//! Predicates used by the collector to decide whether a value is accepted or
//! the operator is asked again. Each validator returns `Ok(())` or a short
//! corrective message meant to be shown right before the re-prompt.
//!
//! Optional fields accept the empty string; required fields never do.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::defaults::SECRET_MIN_LENGTH;

/// Whether an empty value is acceptable for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

impl Requirement {
    pub fn is_optional(self) -> bool {
        self == Requirement::Optional
    }
}

/// Outcome of a validator: `Err` carries the message shown to the operator.
pub type Validation = std::result::Result<(), String>;

/// Validate a URL: it must be absolute, carry a scheme and a host.
///
/// # Example
///
/// ```
/// use service_bootstrap::validation::{validate_url, Requirement};
///
/// assert!(validate_url("https://www.acme.com/", Requirement::Required).is_ok());
/// assert!(validate_url("www.acme.com", Requirement::Required).is_err());
/// assert!(validate_url("", Requirement::Optional).is_ok());
/// ```
pub fn validate_url(value: &str, requirement: Requirement) -> Validation {
    if value.is_empty() {
        return if requirement.is_optional() {
            Ok(())
        } else {
            Err("A URL is required.".to_string())
        };
    }
    match Url::parse(value) {
        Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => Ok(()),
        Ok(_) => Err(format!("\"{}\" is not a valid URL: missing host.", value)),
        Err(e) => Err(format!("\"{}\" is not a valid URL: {}.", value, e)),
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email regex"))
}

/// Validate an email address (syntax only).
pub fn validate_email(value: &str, requirement: Requirement) -> Validation {
    if value.is_empty() {
        return if requirement.is_optional() {
            Ok(())
        } else {
            Err("An email address is required.".to_string())
        };
    }
    if email_regex().is_match(value) {
        Ok(())
    } else {
        Err(format!("\"{}\" is not a valid email address.", value))
    }
}

/// Validate a secret (token or password).
///
/// Required secrets must be at least [`SECRET_MIN_LENGTH`] characters long.
/// Optional secrets accept the empty string; any non-empty optional secret
/// must satisfy the same minimum length.
pub fn validate_secret(value: &str, requirement: Requirement) -> Validation {
    if value.is_empty() && requirement.is_optional() {
        return Ok(());
    }
    if value.chars().count() < SECRET_MIN_LENGTH {
        return Err(format!(
            "The value must be at least {} characters long.",
            SECRET_MIN_LENGTH
        ));
    }
    Ok(())
}

/// Validate a bare domain name such as `acme.com` (no scheme, no path).
pub fn validate_domain(value: &str, requirement: Requirement) -> Validation {
    if value.is_empty() {
        return if requirement.is_optional() {
            Ok(())
        } else {
            Err("A domain is required.".to_string())
        };
    }
    let invalid = || format!("\"{}\" is not a valid domain (e.g. acme.com).", value);
    if !value.contains('.') || value.contains("://") {
        return Err(invalid());
    }
    match Url::parse(&format!("https://{}", value)) {
        Ok(url) if url.host_str() == Some(value.to_ascii_lowercase().as_str()) => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validate a TCP port number.
pub fn validate_port(value: &str) -> Validation {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(format!(
            "\"{}\" is not a valid port number (1-65535).",
            value
        )),
        Ok(_) => Ok(()),
    }
}

/// Validate a non-empty free text value.
pub fn validate_not_empty(value: &str) -> Validation {
    if value.trim().is_empty() {
        Err("A value is required.".to_string())
    } else {
        Ok(())
    }
}
