//! # Terraform Driver
//!
//! Runs one Terraform module through `init` and `apply`, keeping a local
//! state file and per-phase logs for the service being bootstrapped.
//!
//! ## Layout
//!
//! For service `backend` and module `gitlab`:
//!
//! ```text
//! <terraform_dir>/backend/gitlab/              TF_DATA_DIR
//! <terraform_dir>/backend/gitlab/state.tfstate local backend state
//! <logs_dir>/backend/terraform/gitlab/init.log          TF_LOG_PATH
//! <logs_dir>/backend/terraform/gitlab/init-stdout.log
//! <logs_dir>/backend/terraform/gitlab/init-stderr.log   (on failure)
//! ```
//!
//! and the same three files for `apply` and `destroy`.
//!
//! ## Failure policy
//!
//! - `init` fails: nothing else runs, [`Error::TerraformInit`] carries the
//!   init stderr and log paths.
//! - `apply` fails: a compensating `destroy` runs, then
//!   [`Error::TerraformApply`] carries the apply paths and, if the destroy
//!   failed as well, the destroy paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::process::{CommandRunner, CommandSpec};

/// Name of the local state file inside the module data directory.
pub const STATE_FILE: &str = "state.tfstate";

/// A Terraform phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Apply,
    Destroy,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Apply => "apply",
            Phase::Destroy => "destroy",
        }
    }
}

/// Log files of one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseLogs {
    pub log: PathBuf,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

impl PhaseLogs {
    fn new(dir: &Path, phase: Phase) -> Self {
        let name = phase.as_str();
        Self {
            log: dir.join(format!("{}.log", name)),
            stdout: dir.join(format!("{}-stdout.log", name)),
            stderr: dir.join(format!("{}-stderr.log", name)),
        }
    }
}

/// What every phase of one module run shares.
struct Invocation<'b> {
    module_dir: &'b Path,
    logs_dir: &'b Path,
    env: Vec<(String, String)>,
    spinner: Option<ProgressBar>,
}

/// Runs Terraform modules for one service.
pub struct TerraformDriver<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    terraform_dir: PathBuf,
    logs_dir: PathBuf,
    service_slug: String,
    show_progress: bool,
}

impl<'a, R: CommandRunner + ?Sized> TerraformDriver<'a, R> {
    pub fn new(runner: &'a R, terraform_dir: &Path, logs_dir: &Path, service_slug: &str) -> Self {
        Self {
            runner,
            terraform_dir: terraform_dir.to_path_buf(),
            logs_dir: logs_dir.to_path_buf(),
            service_slug: service_slug.to_string(),
            show_progress: false,
        }
    }

    /// Show a spinner while Terraform runs.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Data directory of `module`.
    pub fn data_dir(&self, module: &str) -> PathBuf {
        self.terraform_dir.join(&self.service_slug).join(module)
    }

    /// Log directory of `module`.
    pub fn module_logs_dir(&self, module: &str) -> PathBuf {
        self.logs_dir
            .join(&self.service_slug)
            .join("terraform")
            .join(module)
    }

    /// Log files of one phase of `module`.
    pub fn phase_logs(&self, module: &str, phase: Phase) -> PhaseLogs {
        PhaseLogs::new(&self.module_logs_dir(module), phase)
    }

    /// Init and apply `module` from `module_dir`, passing `variables` as
    /// `TF_VAR_<name>`.
    pub fn run_module(
        &self,
        module: &str,
        module_dir: &Path,
        variables: &[(String, String)],
    ) -> Result<()> {
        let data_dir = std::path::absolute(self.data_dir(module))?;
        let logs_dir = std::path::absolute(self.module_logs_dir(module))?;
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&logs_dir)?;

        let mut env = vec![
            (
                "PATH".to_string(),
                std::env::var("PATH").unwrap_or_default(),
            ),
            ("TF_DATA_DIR".to_string(), data_dir.display().to_string()),
            ("TF_LOG".to_string(), "INFO".to_string()),
        ];
        env.extend(
            variables
                .iter()
                .map(|(name, value)| (format!("TF_VAR_{}", name), value.clone())),
        );

        let invocation = Invocation {
            module_dir,
            logs_dir: &logs_dir,
            env,
            spinner: self.spinner(module),
        };
        let result = self.init_apply(module, &data_dir, &invocation);
        if let Some(spinner) = &invocation.spinner {
            spinner.finish_and_clear();
        }
        if result.is_ok() {
            log::info!("terraform {} applied", module);
        }
        result
    }

    fn init_apply(&self, module: &str, data_dir: &Path, invocation: &Invocation<'_>) -> Result<()> {
        let state_path = data_dir.join(STATE_FILE);
        let init_args = vec![
            "-backend-config".to_string(),
            format!("path={}", state_path.display()),
            "-input=false".to_string(),
            "-no-color".to_string(),
        ];
        if let Err(logs) = self.run_phase(Phase::Init, &init_args, invocation)? {
            return Err(Error::TerraformInit {
                module: module.to_string(),
                stderr_path: logs.stderr,
                log_path: logs.log,
            });
        }

        let auto_args: Vec<String> = ["-auto-approve", "-input=false", "-no-color"]
            .iter()
            .map(|a| a.to_string())
            .collect();
        let Err(apply_logs) = self.run_phase(Phase::Apply, &auto_args, invocation)? else {
            return Ok(());
        };
        log::error!(
            "terraform apply failed for {} (check {} and {}), destroying",
            module,
            apply_logs.stderr.display(),
            apply_logs.log.display()
        );

        let destroy_failure = match self.run_phase(Phase::Destroy, &auto_args, invocation) {
            Ok(Ok(_)) => None,
            Ok(Err(logs)) => Some((logs.stderr, logs.log)),
            Err(err) => {
                log::error!("terraform destroy could not run for {}: {}", module, err);
                let logs = PhaseLogs::new(invocation.logs_dir, Phase::Destroy);
                Some((logs.stderr, logs.log))
            }
        };
        Err(Error::TerraformApply {
            module: module.to_string(),
            stderr_path: apply_logs.stderr,
            log_path: apply_logs.log,
            destroy_failure,
        })
    }

    /// Run one phase. The outer `Result` fails only on I/O or when
    /// Terraform cannot be started; the inner one carries the phase logs of
    /// a non-zero exit.
    fn run_phase(
        &self,
        phase: Phase,
        args: &[String],
        invocation: &Invocation<'_>,
    ) -> Result<std::result::Result<PhaseLogs, PhaseLogs>> {
        let logs = PhaseLogs::new(invocation.logs_dir, phase);
        if let Some(spinner) = &invocation.spinner {
            spinner.set_message(format!("terraform {}", phase.as_str()));
        }
        let mut env = invocation.env.clone();
        env.push(("TF_LOG_PATH".to_string(), logs.log.display().to_string()));

        let command = CommandSpec::new("terraform")
            .arg(phase.as_str())
            .args(args)
            .current_dir(invocation.module_dir)
            .clear_env_with(env);
        let output = self.runner.run(&command)?;
        fs::write(&logs.stdout, &output.stdout)?;
        if output.success() {
            log::debug!("terraform {} succeeded", phase.as_str());
            Ok(Ok(logs))
        } else {
            fs::write(&logs.stderr, &output.stderr)?;
            log::debug!(
                "terraform {} exited with {:?}",
                phase.as_str(),
                output.code
            );
            Ok(Err(logs))
        }
    }

    fn spinner(&self, module: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {prefix} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_prefix(module.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::RecordingRunner;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
            }
        }

        fn driver<'a>(&self, runner: &'a RecordingRunner) -> TerraformDriver<'a, RecordingRunner> {
            TerraformDriver::new(
                runner,
                &self.temp.path().join(".terraform/1700000000"),
                &self.temp.path().join(".logs/1700000000"),
                "backend",
            )
        }

        fn module_dir(&self) -> PathBuf {
            self.temp.path().join("terraform/gitlab")
        }
    }

    fn variables() -> Vec<(String, String)> {
        vec![("project_slug".to_string(), "acme".to_string())]
    }

    #[test]
    fn test_init_then_apply() {
        let fixture = Fixture::new();
        let runner = RecordingRunner::new();
        let driver = fixture.driver(&runner);
        driver
            .run_module("gitlab", &fixture.module_dir(), &variables())
            .unwrap();

        assert_eq!(
            runner.call_summaries(),
            vec!["terraform init", "terraform apply"]
        );
        let calls = runner.calls();
        let init = &calls[0];
        let state = driver.data_dir("gitlab").join(STATE_FILE);
        assert!(init
            .args_lossy()
            .contains(&format!("path={}", state.display())));
        assert_eq!(init.cwd.as_deref(), Some(fixture.module_dir().as_path()));
        assert_eq!(init.env_var("TF_LOG"), Some("INFO"));
        assert_eq!(init.env_var("TF_VAR_project_slug"), Some("acme"));
        assert!(init.env_var("TF_LOG_PATH").unwrap().ends_with("init.log"));
        assert!(calls[1].env_var("TF_LOG_PATH").unwrap().ends_with("apply.log"));
        assert!(calls[1].args_lossy().contains(&"-auto-approve".to_string()));

        let logs = driver.phase_logs("gitlab", Phase::Apply);
        assert!(logs.stdout.is_file());
        assert!(!logs.stderr.exists());
        assert!(driver.data_dir("gitlab").is_dir());
    }

    #[test]
    fn test_init_failure_skips_apply() {
        let fixture = Fixture::new();
        let runner = RecordingRunner::new().fail("terraform", Some("init"), 1, "backend error");
        let driver = fixture.driver(&runner);
        let err = driver
            .run_module("gitlab", &fixture.module_dir(), &variables())
            .unwrap_err();

        assert_eq!(runner.call_summaries(), vec!["terraform init"]);
        let logs = driver.phase_logs("gitlab", Phase::Init);
        match &err {
            Error::TerraformInit {
                module,
                stderr_path,
                log_path,
            } => {
                assert_eq!(module, "gitlab");
                assert!(stderr_path.ends_with("gitlab/init-stderr.log"));
                assert!(log_path.ends_with("gitlab/init.log"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(logs.stderr).unwrap(), "backend error");
        assert!(err.to_string().contains("init-stderr.log"));
    }

    #[test]
    fn test_apply_failure_runs_destroy() {
        let fixture = Fixture::new();
        let runner = RecordingRunner::new().fail("terraform", Some("apply"), 1, "quota");
        let driver = fixture.driver(&runner);
        let err = driver
            .run_module("gitlab", &fixture.module_dir(), &variables())
            .unwrap_err();

        assert_eq!(
            runner.call_summaries(),
            vec!["terraform init", "terraform apply", "terraform destroy"]
        );
        match err {
            Error::TerraformApply {
                stderr_path,
                destroy_failure,
                ..
            } => {
                assert!(stderr_path.ends_with("apply-stderr.log"));
                assert!(destroy_failure.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_destroy_failure_reports_both_log_sets() {
        let fixture = Fixture::new();
        let runner = RecordingRunner::new()
            .fail("terraform", Some("apply"), 1, "quota")
            .fail("terraform", Some("destroy"), 1, "locked");
        let driver = fixture.driver(&runner);
        let err = driver
            .run_module("gitlab", &fixture.module_dir(), &variables())
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("apply-stderr.log"));
        assert!(message.contains("destroy-stderr.log"));
        assert!(message.contains("destroy.log"));
        let destroy = driver.phase_logs("gitlab", Phase::Destroy);
        assert_eq!(fs::read_to_string(destroy.stderr).unwrap(), "locked");
    }

    #[test]
    fn test_destroy_start_failure_keeps_apply_logs() {
        let fixture = Fixture::new();
        let runner = RecordingRunner::new()
            .fail("terraform", Some("apply"), 1, "quota")
            .fail_to_start("terraform", "destroy");
        let driver = fixture.driver(&runner);
        let err = driver
            .run_module("gitlab", &fixture.module_dir(), &variables())
            .unwrap_err();

        match err {
            Error::TerraformApply {
                stderr_path,
                destroy_failure,
                ..
            } => {
                assert!(stderr_path.ends_with("apply-stderr.log"));
                let (destroy_stderr, _) = destroy_failure.unwrap();
                assert!(destroy_stderr.ends_with("destroy-stderr.log"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_terraform_is_a_tool_error() {
        let fixture = Fixture::new();
        let runner = RecordingRunner::new().missing("terraform");
        let err = fixture
            .driver(&runner)
            .run_module("gitlab", &fixture.module_dir(), &variables())
            .unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
    }
}
