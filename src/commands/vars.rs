//! # Vars Command Implementation
//!
//! Collects the service settings like `init` does, then prints the Terraform
//! variable groups they produce instead of running anything. Useful to review
//! what a bootstrap would provision, or to feed the groups to another tool
//! with `--format json`.

use anyhow::Result;
use clap::Args;

use service_bootstrap::suggestions;
use service_bootstrap::tfvars::{assemble, TfVars};

use super::collect::CollectArgs;

const FORMATS: &[&str] = &["text", "json"];

/// Print the Terraform variables for a set of service settings
#[derive(Args, Debug)]
pub struct VarsArgs {
    #[command(flatten)]
    pub collect: CollectArgs,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,
}

/// Execute the `vars` command.
pub fn execute(args: VarsArgs) -> Result<()> {
    let format = args.format.to_lowercase();
    if !FORMATS.contains(&format.as_str()) {
        return Err(suggestions::unknown_format(&args.format, FORMATS));
    }
    let config = args.collect.collect()?;
    let vars = assemble(&config);
    match format.as_str() {
        "json" => println!("{}", vars.to_json()?),
        _ => print!("{}", render_text(&vars)),
    }
    Ok(())
}

/// One `[group]` header per group followed by its `name=value` lines.
fn render_text(vars: &TfVars) -> String {
    let mut text = String::new();
    for (index, (group, lines)) in vars.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        text.push_str(&format!("[{}]\n", group));
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
    }
    text
}
