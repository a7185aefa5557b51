//! `completions` command.
use std::io::{self, Write};

use anyhow::Result;
use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::cli::Cli;

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    generate(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

/// Write the completion script for `shell` to `out`.
pub fn generate(shell: Shell, out: &mut dyn Write) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_subcommands() {
        let mut out = Vec::new();
        generate(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("dotts"));
        assert!(script.contains("machines"));
        assert!(script.contains("dependencies"));
    }

    #[test]
    fn every_shell_generates_something() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let mut out = Vec::new();
            generate(shell, &mut out);
            assert!(!out.is_empty(), "{shell}");
        }
    }
}
