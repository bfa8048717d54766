//! # External Processes
//!
//! Every external tool the bootstrap drives (the template renderer, the code
//! formatter, the requirements compiler, `terraform`, `chown`) is started
//! through the [`CommandRunner`] trait. `SystemCommandRunner` wraps
//! `std::process::Command`; tests substitute a recording runner with scripted
//! exit codes, so failure handling can be exercised without the tools
//! installed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// A command to run: program, arguments, working directory and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// When set, the child starts from an empty environment plus these pairs.
    pub env: Option<Vec<(String, String)>>,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: None,
            env: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn clear_env_with(mut self, env: Vec<(String, String)>) -> Self {
        self.env = Some(env);
        self
    }

    /// Arguments as lossy UTF-8, for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Value of an environment variable passed to the child, if any.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .as_ref()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Shell-like rendering, for log lines.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args_lossy());
        parts.join(" ")
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands - allows mocking in tests
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion, capturing its output.
    ///
    /// A non-zero exit is not an error at this level: it is reported through
    /// [`CommandOutput::code`]. Failing to start the program is.
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands on the host with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("running: {}", command.display());
        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(cwd) = &command.cwd {
            process.current_dir(cwd);
        }
        if let Some(env) = &command.env {
            process.env_clear();
            process.envs(env.iter().map(|(k, v)| (k, v)));
        }
        let output = process.output().map_err(|e| Error::Tool {
            tool: command.program.clone(),
            message: if e.kind() == std::io::ErrorKind::NotFound {
                format!("`{}` not found in PATH", command.program)
            } else {
                e.to_string()
            },
        })?;
        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log::debug!("{} exited with {:?}", command.program, result.code);
        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("pip-compile")
            .args(["-q", "-U", "-o"])
            .arg("base.txt")
            .arg(PathBuf::from("base.in"))
            .current_dir(Path::new("/tmp"));
        assert_eq!(spec.display(), "pip-compile -q -U -o base.txt base.in");
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/tmp")));
        assert_eq!(spec.env_var("PATH"), None);
    }

    #[test]
    fn test_env_var_lookup() {
        let spec = CommandSpec::new("terraform")
            .clear_env_with(vec![("TF_LOG".to_string(), "INFO".to_string())]);
        assert_eq!(spec.env_var("TF_LOG"), Some("INFO"));
        assert_eq!(spec.env_var("HOME"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output_and_exit_code() {
        let output = SystemCommandRunner
            .run(&CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_clears_environment() {
        let output = SystemCommandRunner
            .run(
                &CommandSpec::new("/bin/sh")
                    .args(["-c", "echo \"$ONLY:$HOME\""])
                    .clear_env_with(vec![("ONLY".to_string(), "yes".to_string())]),
            )
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "yes:\n");
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let err = SystemCommandRunner
            .run(&CommandSpec::new("service-bootstrap-no-such-tool"))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
