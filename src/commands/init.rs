//! # Init Command Implementation
//!
//! This module implements the `init` subcommand, which bootstraps a service
//! end to end.
//!
//! ## Functionality
//!
//! - **Collect**: resolves every setting from flags, environment variables
//!   and prompts.
//! - **Generate**: renders the template and prepares the generated service.
//! - **Provision**: runs the GitLab and Terraform Cloud Terraform modules,
//!   keeping their state and logs under per-run directories.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Args;

use service_bootstrap::defaults::{
    default_logs_dir, default_terraform_dir, TEMPLATE_DIR, TERRAFORM_MODULES_DIR,
};
use service_bootstrap::output::{highlight, symbol, OutputConfig};
use service_bootstrap::process::SystemCommandRunner;
use service_bootstrap::runner::{missing_inputs, Runner, RunnerSettings};
use service_bootstrap::suggestions;

use super::collect::CollectArgs;

/// Bootstrap a service from the template
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub collect: CollectArgs,

    /// Template directory handed to the renderer
    #[arg(long, value_name = "PATH", default_value = TEMPLATE_DIR)]
    pub template: PathBuf,

    /// Directory holding the Terraform modules (defaults to ./terraform)
    #[arg(long, value_name = "PATH", default_value = TERRAFORM_MODULES_DIR)]
    pub terraform_modules_dir: PathBuf,

    /// Terraform data directory (defaults to .terraform/<run id>)
    #[arg(long, value_name = "PATH")]
    pub terraform_dir: Option<PathBuf>,

    /// Log directory (defaults to .logs/<run id>)
    #[arg(long, value_name = "PATH")]
    pub logs_dir: Option<PathBuf>,
}

/// Identifier of this run: seconds since the UNIX epoch.
fn run_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, output: &OutputConfig) -> Result<()> {
    if !args.template.is_dir() {
        return Err(suggestions::template_not_found(&args.template));
    }
    let run_id = run_id();
    let settings = RunnerSettings {
        template: args.template,
        terraform_modules_dir: args.terraform_modules_dir,
        terraform_dir: args
            .terraform_dir
            .unwrap_or_else(|| default_terraform_dir(&run_id)),
        logs_dir: args.logs_dir.unwrap_or_else(|| default_logs_dir(&run_id)),
        show_progress: output.use_color && console::Term::stderr().is_term(),
    };
    log::info!("run {}", run_id);

    let config = args.collect.collect()?;

    if let Some(missing) = missing_inputs(&config, &settings).into_iter().next() {
        let module = missing
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(suggestions::terraform_modules_not_found(
            &settings.terraform_modules_dir,
            &module,
        ));
    }

    Runner::new(&config, &settings, &SystemCommandRunner).run()?;

    eprintln!(
        "{}",
        highlight(&format!(
            "{} The {} service is ready in {}",
            symbol(output, "✓", "[OK]"),
            config.service_slug,
            config.service_dir.display()
        ))
    );
    Ok(())
}
