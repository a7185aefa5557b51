//! `sync` command.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, SyncOpts};
use crate::logging::Log;
use crate::sync::{ReconcileOutcome, SyncEngine};
use crate::vcs::Vcs;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if setup fails or the collaborator reports a failure.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let vcs = setup.connect()?;
    log.stage(&format!("Syncing {}", setup.paths.root().display()));
    sync_with(vcs.as_ref(), &setup.settings.remote, opts, log)
}

/// Reconcile through `vcs`, or only report under `--dry-run`.
///
/// # Errors
///
/// Returns an error if the status cannot be read or the pull fails.
pub fn sync_with(vcs: &dyn Vcs, remote: &str, opts: &SyncOpts, log: &dyn Log) -> Result<()> {
    let engine = SyncEngine::new(vcs, remote, log);
    if opts.dry_run {
        engine.reconcile_dry_run()?;
        return Ok(());
    }
    if let ReconcileOutcome::Pulled { .. } = engine.reconcile()? {
        log.info("Sync complete");
    }
    Ok(())
}
