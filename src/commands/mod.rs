//! Subcommand orchestration.
//!
//! Every handler resolves the dotfiles root and `.dottsrc` through
//! [`CommandSetup`], then drives the registries or the sync engine.  Handlers
//! that touch version control are split into a `run` entry point and a
//! `*_with` function taking the collaborator, so tests can substitute one.
pub mod completions;
pub mod init;
pub mod push;
pub mod registry;
pub mod status;
pub mod sync;
pub mod version;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{DottsPaths, Settings};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::vcs::{self, Vcs};

/// Shared state produced by the common command setup sequence.
#[derive(Debug, Clone)]
pub struct CommandSetup {
    /// Resolved dotfiles paths.
    pub paths: DottsPaths,
    /// Settings from `.dottsrc`, or defaults.
    pub settings: Settings,
}

impl CommandSetup {
    /// Resolve the dotfiles root and load `.dottsrc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined or `.dottsrc` is
    /// unparsable.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let paths = DottsPaths::resolve(global.root.as_deref())?;
        log.debug(&format!("dotfiles root: {}", paths.root().display()));
        let settings = Settings::load(&paths.settings_file())?;
        log.debug(&format!(
            "remote: {}, backend: {}",
            settings.remote, settings.backend
        ));
        Ok(Self { paths, settings })
    }

    /// Connect the configured collaborator, running `git` as a real process.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured backend is unavailable.
    pub fn connect(&self) -> Result<Box<dyn Vcs>> {
        self.connect_with(Arc::new(SystemExecutor))
    }

    /// Connect the configured collaborator through `executor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured backend is unavailable.
    pub fn connect_with(&self, executor: Arc<dyn Executor>) -> Result<Box<dyn Vcs>> {
        vcs::connect(&self.paths, &self.settings, executor)
            .with_context(|| format!("cannot use {} backend", self.settings.backend))
    }
}
