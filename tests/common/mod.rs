//! Shared test utilities for the E2E tests.
//!
//! This module provides a fixture with a temporary working directory, a
//! template directory, Terraform module directories and fake versions of the
//! external tools the bootstrap drives, plus helpers to build commands.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_fake_tools();
//!     fixture.command().arg("init").args(args::MINIMAL).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::args;
    pub use super::TestFixture;
}

/// Common argument sets for non-interactive runs.
#[allow(dead_code)]
pub mod args {
    /// Everything a local-storage, other-k8s, GitLab-less run needs.
    pub const MINIMAL: &[&str] = &[
        "--no-input",
        "--project-name",
        "Acme Shop",
        "--deployment-type",
        "other-k8s",
        "--terraform-backend",
        "terraform-cloud",
        "--terraform-cloud-token",
        "mytfcT0k3N",
        "--terraform-cloud-organization",
        "acme",
        "--gitlab-group-slug",
        "",
        "--media-storage",
        "local",
    ];

    /// A DigitalOcean project with a domain on the GitLab backend.
    pub const GITLAB_DOMAIN: &[&str] = &[
        "--no-input",
        "--yes",
        "--project-name",
        "Acme Shop",
        "--deployment-type",
        "digitalocean-k8s",
        "--environment-distribution",
        "2",
        "--project-domain",
        "acme.com",
        "--terraform-backend",
        "gitlab",
        "--media-storage",
        "none",
        "--gitlab-group-slug",
        "acme",
        "--gitlab-private-token",
        "mYV4l1DT0k3N",
    ];
}

/// Environment variables the CLI reads as flag fallbacks. They are removed
/// from every spawned command so the host environment cannot leak in.
const FALLBACK_ENV_VARS: &[&str] = &[
    "OUTPUT_BASE_DIR",
    "GITLAB_PRIVATE_TOKEN",
    "TFC_TOKEN",
    "DIGITALOCEAN_TOKEN",
    "KUBERNETES_TOKEN",
    "SENTRY_DSN",
    "S3_ACCESS_ID",
    "S3_SECRET_KEY",
    "UID",
    "GID",
];

/// A test fixture that provides a temporary working directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    bin_dir: Option<PathBuf>,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            bin_dir: None,
        }
    }

    /// Add a template directory and the Terraform module directories.
    pub fn with_template(self) -> Self {
        for dir in ["template", "terraform/gitlab", "terraform/terraform-cloud"] {
            self.temp_dir
                .child(dir)
                .create_dir_all()
                .expect("Failed to create directory");
        }
        self.temp_dir
            .child("template/cookiecutter.json")
            .write_str("{}")
            .expect("Failed to write template");
        self
    }

    /// Install fake `cookiecutter`, `black`, `pip-compile`, `terraform` and
    /// `chown` executables that append their invocation to `calls.log`.
    ///
    /// The fake renderer creates the service directory with an env template
    /// and a requirements input. The fake `terraform` exits 1 for the phases
    /// listed in a `fail-<phase>` marker file.
    #[cfg(unix)]
    pub fn with_fake_tools(mut self) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.temp_dir.path().join("bin");
        fs::create_dir_all(&bin).expect("Failed to create bin directory");
        let log = self.calls_log();
        let root = self.temp_dir.path().to_path_buf();
        let scripts = [
            (
                "cookiecutter",
                format!(
                    r#"echo "cookiecutter $*" >> "{log}"
out=""; dir=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output-dir) out="$2"; shift ;;
    project_dirname=*) dir="${{1#project_dirname=}}" ;;
  esac
  shift
done
mkdir -p "$out/$dir/requirements"
printf 'SECRET_KEY=__SECRETKEY__\nPASSWORD=__PASSWORD__\n' > "$out/$dir/.env_template"
echo django > "$out/$dir/requirements/base.in"
"#,
                    log = log.display()
                ),
            ),
            ("black", format!(r#"echo "black $*" >> "{}""#, log.display())),
            (
                "pip-compile",
                format!(
                    r#"echo "pip-compile $*" >> "{}"
touch "$4""#,
                    log.display()
                ),
            ),
            (
                "terraform",
                format!(
                    r#"echo "terraform $1 $(pwd) $TF_VAR_service_slug" >> "{log}"
echo "terraform $1 output"
if [ -f "{root}/fail-$1" ]; then echo "terraform $1 failed" >&2; exit 1; fi
"#,
                    log = log.display(),
                    root = root.display()
                ),
            ),
            ("chown", format!(r#"echo "chown $*" >> "{}""#, log.display())),
        ];
        for (name, body) in scripts {
            let path = bin.join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("Failed to make script executable");
        }
        self.bin_dir = Some(bin);
        self
    }

    /// Make the fake `terraform` fail in `phase` (init, apply or destroy).
    #[allow(dead_code)]
    pub fn failing_terraform(self, phase: &str) -> Self {
        self.temp_dir
            .child(format!("fail-{}", phase))
            .touch()
            .expect("Failed to create marker");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the fake tools record their invocations.
    pub fn calls_log(&self) -> PathBuf {
        self.temp_dir.path().join("calls.log")
    }

    /// Recorded fake tool invocations, one per line.
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.calls_log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory, with
    /// the fake tools first on `PATH` when installed.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("service-bootstrap");
        cmd.current_dir(self.path());
        for var in FALLBACK_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        if let Some(bin) = &self.bin_dir {
            let path = std::env::var("PATH").unwrap_or_default();
            cmd.env("PATH", format!("{}:{}", bin.display(), path));
        }
        cmd
    }

    /// An `init` command pointing at the fixture's template and modules.
    #[allow(dead_code)]
    pub fn init_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("init")
            .arg("--template")
            .arg(self.path().join("template"))
            .arg("--terraform-modules-dir")
            .arg(self.path().join("terraform"))
            .arg("--terraform-dir")
            .arg(self.path().join(".terraform/1"))
            .arg("--logs-dir")
            .arg(self.path().join(".logs/1"))
            .arg("--output-dir")
            .arg(self.path().join("out"));
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_template() {
        let fixture = TestFixture::new().with_template();
        assert!(fixture.path().join("template").is_dir());
        assert!(fixture.path().join("terraform/gitlab").is_dir());
    }

    #[test]
    fn test_calls_empty_without_log() {
        assert!(TestFixture::new().calls().is_empty());
    }
}
