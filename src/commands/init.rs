//! `init` command.
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::Path;

use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::DottsPaths;
use crate::logging::Log;
use crate::vcs::Vcs;

const GITIGNORE_TEMPLATE: &str = "";
const SETTINGS_TEMPLATE: &str = "{}\n";

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the root cannot be created, `.dottsrc` is invalid,
/// the collaborator is unavailable, or scaffolding fails.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    fs::create_dir_all(setup.paths.root())
        .with_context(|| format!("failed to create {}", setup.paths.root().display()))?;
    let vcs = setup.connect()?;
    init_with(&setup.paths, vcs.as_ref(), log)
}

/// Initialise the repository through `vcs`, then lay down the scaffolding.
///
/// Existing files are left untouched, so running this twice is harmless.
///
/// # Errors
///
/// Returns an error if the collaborator fails or a file cannot be created.
pub fn init_with(paths: &DottsPaths, vcs: &dyn Vcs, log: &dyn Log) -> Result<()> {
    log.stage(&format!("Initialising {}", paths.root().display()));
    vcs.init()?;

    create_if_missing(&paths.gitignore(), GITIGNORE_TEMPLATE, log)?;
    create_if_missing(&paths.settings_file(), SETTINGS_TEMPLATE, log)?;
    let registry_dir = paths.registry_dir();
    fs::create_dir_all(&registry_dir)
        .with_context(|| format!("failed to create {}", registry_dir.display()))?;
    log.info("Dotfiles repository ready");
    Ok(())
}

fn create_if_missing(path: &Path, contents: &str, log: &dyn Log) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(contents.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            log.info(&format!("Created {}", path.display()));
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            log.debug(&format!("{} already exists, kept", path.display()));
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("failed to create {}", path.display())),
    }
}
