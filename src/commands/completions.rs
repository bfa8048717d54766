//! # Completions Command Implementation
//!
//! Prints a shell completion script for `service-bootstrap` on stdout. The
//! script covers every subcommand and the long list of settings flags, which
//! makes it the easiest way to discover them.
//!
//! ```bash
//! service-bootstrap completions bash > ~/.local/share/bash-completion/completions/service-bootstrap
//! service-bootstrap completions zsh > ~/.zfunc/_service-bootstrap
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}
