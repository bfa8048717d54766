//! End-to-end tests for interactive collection using TTY simulation.
//!
//! These tests use the `rexpect` crate to simulate an interactive terminal session,
//! which is required because `dialoguer` prompts need a real TTY.
//!
//! **Platform limitation**: `rexpect` only works on Unix-like systems (Linux, macOS, WSL).
//! These tests are automatically skipped on Windows.

#![cfg(unix)]

use std::process::Command;

use rexpect::session::{spawn_command, PtySession};
use tempfile::TempDir;

/// Every setting except the project name and the development URL.
const SUPPLIED: &[&str] = &[
    "--project-slug",
    "acme-shop",
    "--service-slug",
    "backend",
    "--project-dirname",
    "backend",
    "--internal-service-port",
    "8000",
    "--deployment-type",
    "other-k8s",
    "--project-domain",
    "",
    "--project-url-stage",
    "https://stage.acme.com",
    "--project-url-prod",
    "https://www.acme.com",
    "--letsencrypt-certificate-email",
    "",
    "--project-url-monitoring",
    "",
    "--terraform-backend",
    "terraform-cloud",
    "--terraform-cloud-hostname",
    "app.terraform.io",
    "--terraform-cloud-token",
    "mytfcT0k3N",
    "--terraform-cloud-organization",
    "acme",
    "--terraform-cloud-organization-create",
    "false",
    "--use-redis",
    "false",
    "--postgres-image",
    "postgres:14-bullseye",
    "--postgres-persistent-volume-capacity",
    "10Gi",
    "--postgres-persistent-volume-claim-capacity",
    "10Gi",
    "--postgres-persistent-volume-host-path",
    "/var/lib/postgresql/data",
    "--sentry-dsn",
    "",
    "--media-storage",
    "local",
    "--gitlab-group-slug",
    "",
];

/// Create a new PTY session running `service-bootstrap vars` in the given
/// directory.
fn spawn_vars(temp_dir: &TempDir, extra: &[&str]) -> Result<PtySession, rexpect::error::Error> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_service-bootstrap"));
    cmd.arg("--color")
        .arg("never")
        .arg("vars")
        .args(SUPPLIED)
        .args(extra)
        .current_dir(temp_dir.path());
    for var in ["OUTPUT_BASE_DIR", "UID", "GID", "SENTRY_DSN", "TFC_TOKEN"] {
        cmd.env_remove(var);
    }

    spawn_command(cmd, Some(30_000)) // 30 second timeout
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_interactive_reprompts_invalid_url() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut session = spawn_vars(&temp_dir, &[]).expect("Failed to spawn interactive session");

    session
        .exp_string("Project name")
        .expect("Should ask for the project name");
    session.send_line("Acme Shop").expect("Failed to send name");

    session
        .exp_string("Development environment complete URL")
        .expect("Should ask for the development URL");
    session.send_line("dev.acme.com").expect("Failed to send URL");
    session
        .exp_string("not a valid URL")
        .expect("Should reject a URL without scheme");

    session
        .exp_string("Development environment complete URL")
        .expect("Should ask again");
    session
        .send_line("https://dev.acme.com")
        .expect("Failed to send URL");

    session
        .exp_string("project_url=\"https://dev.acme.com\"")
        .expect("Should print the development URL");
    session.exp_eof().expect("Should exit");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_interactive_empty_input_accepts_default_url() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut session = spawn_vars(&temp_dir, &["--project-name", "Acme Shop"])
        .expect("Failed to spawn interactive session");

    session
        .exp_string("Development environment complete URL")
        .expect("Should ask for the development URL");
    session.send_line("").expect("Failed to send empty line");

    session
        .exp_string("project_url=\"https://dev.acme-shop.com\"")
        .expect("Should use the default URL");
    session.exp_eof().expect("Should exit");
}
