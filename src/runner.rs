//! # Bootstrap Runner
//!
//! Executes the side-effecting steps of a bootstrap, in order, for a
//! validated [`BootstrapConfig`]:
//!
//! 1. remove the previous service directory (deletion was confirmed during
//!    collection);
//! 2. render the template with `cookiecutter`;
//! 3. write `.env` from `.env_template` with fresh secrets;
//! 4. format the generated code with `black`;
//! 5. compile every `requirements/*.in` with `pip-compile`;
//! 6. create `static/` (and `media/` for local media storage);
//! 7. provision the GitLab project through the `gitlab` Terraform module;
//! 8. provision Terraform Cloud through the `terraform-cloud` module;
//! 9. hand the generated tree to `uid[:gid]` unless the uid is root.
//!
//! Rendering and provisioning failures abort the run. The formatter and the
//! requirements compiler only return an exit status, so their failures are
//! reported as warnings.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BootstrapConfig, MediaStorage, TerraformBackend};
use crate::defaults::{TERRAFORM_MODULE_GITLAB, TERRAFORM_MODULE_TERRAFORM_CLOUD};
use crate::error::{Error, Result};
use crate::gitlab::gitlab_variables;
use crate::output::{highlight, info, warning};
use crate::process::{CommandRunner, CommandSpec};
use crate::secret::{random_token, PASSWORD_LENGTH, SECRET_KEY_LENGTH};
use crate::terraform::TerraformDriver;
use crate::tfvars::assemble;

/// Placeholder for the framework secret key in `.env_template`.
pub const SECRET_KEY_PLACEHOLDER: &str = "__SECRETKEY__";

/// Placeholder for the service password in `.env_template`.
pub const PASSWORD_PLACEHOLDER: &str = "__PASSWORD__";

/// Where the runner finds its inputs and writes Terraform state and logs.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Template handed to the renderer.
    pub template: PathBuf,
    /// Directory holding one sub-directory per Terraform module.
    pub terraform_modules_dir: PathBuf,
    pub terraform_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Show a spinner while Terraform runs.
    pub show_progress: bool,
}

/// The flat context handed to the template renderer, in a stable order.
pub fn template_context(config: &BootstrapConfig) -> Vec<(String, String)> {
    let mut context = vec![
        ("deployment_type", config.deployment_type.to_string()),
        (
            "internal_service_port",
            config.internal_service_port.to_string(),
        ),
        ("media_storage", config.media_storage.to_string()),
        ("project_dirname", config.project_dirname.clone()),
        ("project_name", config.project_name.clone()),
        ("project_slug", config.project_slug.clone()),
    ];
    for settings in &config.environments {
        context.push((
            match settings.environment.slug() {
                "dev" => "project_url_dev",
                "stage" => "project_url_stage",
                _ => "project_url_prod",
            },
            settings.url.clone(),
        ));
    }
    context.extend([
        ("service_slug", config.service_slug.clone()),
        ("terraform_backend", config.terraform_backend.to_string()),
        (
            "terraform_cloud_organization",
            config
                .terraform_cloud
                .as_ref()
                .map(|tfc| tfc.organization.clone())
                .unwrap_or_default(),
        ),
        // Templates compare against the capitalized literals.
        (
            "use_redis",
            if config.use_redis { "True" } else { "False" }.to_string(),
        ),
    ]);
    context
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Runs the bootstrap steps through a [`CommandRunner`].
pub struct Runner<'a, R: CommandRunner + ?Sized> {
    config: &'a BootstrapConfig,
    settings: &'a RunnerSettings,
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> Runner<'a, R> {
    pub fn new(config: &'a BootstrapConfig, settings: &'a RunnerSettings, runner: &'a R) -> Self {
        Self {
            config,
            settings,
            runner,
        }
    }

    /// Run every step in order, stopping at the first hard failure.
    pub fn run(&self) -> Result<()> {
        eprintln!(
            "{}",
            highlight(&format!(
                "Initializing the {} service:",
                self.config.service_slug
            ))
        );
        self.remove_service_dir()?;
        self.render_template()?;
        self.create_env_file()?;
        self.format_files()?;
        self.compile_requirements()?;
        self.create_directories()?;
        if self.config.gitlab.is_some() {
            self.init_gitlab()?;
        }
        if self.config.terraform_backend == TerraformBackend::TerraformCloud {
            self.init_terraform_cloud()?;
        }
        self.change_owner()?;
        log::info!(
            "bootstrap of {} completed in {}",
            self.config.service_slug,
            self.config.service_dir.display()
        );
        Ok(())
    }

    fn step(&self, message: &str) {
        eprintln!("{}", info(message));
        log::info!("{}", message.trim_start_matches('.'));
    }

    fn remove_service_dir(&self) -> Result<()> {
        if self.config.replace_service_dir && self.config.service_dir.is_dir() {
            self.step(&format!(
                "...removing the existing \"{}\" directory",
                self.config.service_dir.display()
            ));
            fs::remove_dir_all(&self.config.service_dir)?;
        }
        Ok(())
    }

    fn render_template(&self) -> Result<()> {
        self.step("...rendering the service template");
        let context = template_context(self.config);
        let command = CommandSpec::new("cookiecutter")
            .arg(self.settings.template.as_os_str())
            .arg("--no-input")
            .arg("--output-dir")
            .arg(self.config.output_dir.as_os_str())
            .args(context.iter().map(|(k, v)| format!("{}={}", k, v)));
        let output = self.runner.run(&command)?;
        if !output.success() {
            return Err(Error::Tool {
                tool: "cookiecutter".to_string(),
                message: first_line_or_code(&output.stderr, output.code),
            });
        }
        if !self.config.service_dir.is_dir() {
            return Err(Error::TemplateOutput {
                message: format!(
                    "the renderer did not create {}",
                    self.config.service_dir.display()
                ),
            });
        }
        Ok(())
    }

    fn create_env_file(&self) -> Result<()> {
        self.step("...generating the .env file");
        let template_path = self.config.service_dir.join(".env_template");
        if !template_path.is_file() {
            log::warn!("{} not found, skipping .env", template_path.display());
            return Ok(());
        }
        let text = fs::read_to_string(&template_path)?
            .replace(SECRET_KEY_PLACEHOLDER, &random_token(SECRET_KEY_LENGTH))
            .replace(PASSWORD_PLACEHOLDER, &random_token(PASSWORD_LENGTH));
        fs::write(self.config.service_dir.join(".env"), text)?;
        Ok(())
    }

    fn format_files(&self) -> Result<()> {
        self.step("...formatting the generated python code");
        let command = CommandSpec::new("black")
            .arg("-q")
            .arg(self.config.service_dir.as_os_str());
        self.run_best_effort(&command)
    }

    fn compile_requirements(&self) -> Result<()> {
        self.step("...compiling the requirements files");
        let requirements_dir = self.config.service_dir.join("requirements");
        let pattern = requirements_dir.join("*.in");
        let mut inputs: Vec<PathBuf> =
            glob::glob(&pattern.to_string_lossy())?.filter_map(|entry| entry.ok()).collect();
        inputs.sort();
        for input in inputs {
            let output = input.with_extension("txt");
            let command = CommandSpec::new("pip-compile")
                .args(["-q", "-U", "-o"])
                .arg(output.as_os_str())
                .arg(input.as_os_str());
            self.run_best_effort(&command)?;
            if let Some(name) = output.file_name() {
                eprintln!("{}", info(&format!("\t- {}", name.to_string_lossy())));
            }
        }
        Ok(())
    }

    fn create_directories(&self) -> Result<()> {
        self.step("...creating the '/static' directory");
        fs::create_dir_all(self.config.service_dir.join("static"))?;
        if self.config.media_storage == MediaStorage::Local {
            self.step("...creating the '/media' directory");
            fs::create_dir_all(self.config.service_dir.join("media"))?;
        }
        Ok(())
    }

    fn terraform(&self) -> TerraformDriver<'_, R> {
        TerraformDriver::new(
            self.runner,
            &self.settings.terraform_dir,
            &self.settings.logs_dir,
            &self.config.service_slug,
        )
        .with_progress(self.settings.show_progress)
    }

    fn module_dir(&self, module: &str) -> PathBuf {
        self.settings.terraform_modules_dir.join(module)
    }

    fn init_gitlab(&self) -> Result<()> {
        let Some(gitlab) = &self.config.gitlab else {
            return Ok(());
        };
        self.step("...creating the GitLab repository and associated resources");
        let variables = gitlab_variables(self.config)?;
        let inputs = vec![
            ("gitlab_group_slug".to_string(), gitlab.group_slug.clone()),
            ("gitlab_token".to_string(), gitlab.private_token.clone()),
            (
                "gitlab_group_variables".to_string(),
                variables.group.to_hcl(),
            ),
            (
                "gitlab_project_variables".to_string(),
                variables.project.to_hcl(),
            ),
            ("project_name".to_string(), self.config.project_name.clone()),
            ("project_slug".to_string(), self.config.project_slug.clone()),
            (
                "service_dir".to_string(),
                self.config.service_dir.display().to_string(),
            ),
            ("service_slug".to_string(), self.config.service_slug.clone()),
        ];
        self.terraform().run_module(
            TERRAFORM_MODULE_GITLAB,
            &self.module_dir(TERRAFORM_MODULE_GITLAB),
            &inputs,
        )
    }

    fn init_terraform_cloud(&self) -> Result<()> {
        let Some(tfc) = &self.config.terraform_cloud else {
            return Ok(());
        };
        self.step("...creating the Terraform Cloud resources");
        let stacks: Vec<&str> = self.config.stacks.iter().map(|s| s.slug).collect();
        let inputs = vec![
            ("hostname".to_string(), tfc.hostname.clone()),
            ("terraform_cloud_token".to_string(), tfc.token.clone()),
            ("organization_name".to_string(), tfc.organization.clone()),
            (
                "create_organization".to_string(),
                tfc.create_organization.to_string(),
            ),
            ("admin_email".to_string(), tfc.admin_email.clone()),
            ("project_name".to_string(), self.config.project_name.clone()),
            ("project_slug".to_string(), self.config.project_slug.clone()),
            ("service_slug".to_string(), self.config.service_slug.clone()),
            ("stacks".to_string(), serde_json::to_string(&stacks)?),
            ("tfvars".to_string(), assemble(self.config).to_json()?),
        ];
        self.terraform().run_module(
            TERRAFORM_MODULE_TERRAFORM_CLOUD,
            &self.module_dir(TERRAFORM_MODULE_TERRAFORM_CLOUD),
            &inputs,
        )
    }

    fn change_owner(&self) -> Result<()> {
        let Some(uid) = self.config.uid.filter(|&uid| uid != 0) else {
            return Ok(());
        };
        let owner = match self.config.gid {
            Some(gid) => format!("{}:{}", uid, gid),
            None => uid.to_string(),
        };
        self.step(&format!("...changing the owner to {}", owner));
        let command = CommandSpec::new("chown")
            .arg("-R")
            .arg(owner)
            .arg(self.config.service_dir.as_os_str());
        let output = self.runner.run(&command)?;
        if output.success() {
            Ok(())
        } else {
            Err(Error::Tool {
                tool: "chown".to_string(),
                message: first_line_or_code(&output.stderr, output.code),
            })
        }
    }

    /// Run a step whose failure does not stop the bootstrap.
    fn run_best_effort(&self, command: &CommandSpec) -> Result<()> {
        let outcome = self.runner.run(command);
        let message = match outcome {
            Ok(output) if output.success() => return Ok(()),
            Ok(output) => first_line_or_code(&output.stderr, output.code),
            Err(Error::Tool { message, .. }) => message,
            Err(other) => return Err(other),
        };
        eprintln!(
            "{}",
            warning(&format!("{} failed: {}", command.program, message))
        );
        log::warn!("{} failed: {}", command.display(), message);
        Ok(())
    }
}

fn first_line_or_code(stderr: &str, code: Option<i32>) -> String {
    match stderr.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => line.trim().to_string(),
        None => match code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        },
    }
}

/// Check that the template and the Terraform modules the run needs exist.
pub fn missing_inputs(config: &BootstrapConfig, settings: &RunnerSettings) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    if !settings.template.is_dir() {
        missing.push(settings.template.clone());
    }
    let mut modules = Vec::new();
    if config.gitlab.is_some() {
        modules.push(TERRAFORM_MODULE_GITLAB);
    }
    if config.terraform_backend == TerraformBackend::TerraformCloud {
        modules.push(TERRAFORM_MODULE_TERRAFORM_CLOUD);
    }
    missing.extend(
        modules
            .into_iter()
            .map(|module| settings.terraform_modules_dir.join(module))
            .filter(|dir| !Path::new(dir).is_dir()),
    );
    missing
}
