//! `push` command.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, PushOpts};
use crate::logging::Log;
use crate::sync::{PublishOutcome, SyncEngine};
use crate::vcs::Vcs;

/// Run the push command.
///
/// # Errors
///
/// Returns an error if setup fails or any of add, commit or push fails.
pub fn run(global: &GlobalOpts, opts: &PushOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let vcs = setup.connect()?;
    let message = opts
        .message
        .as_deref()
        .unwrap_or(&setup.settings.commit_message);
    log.stage(&format!("Publishing {}", setup.paths.root().display()));
    push_with(vcs.as_ref(), &setup.settings.remote, message, log)?;
    Ok(())
}

/// Commit (when dirty) and push through `vcs`.
///
/// # Errors
///
/// Returns an error if any collaborator step fails. A commit made before a
/// failed push is kept.
pub fn push_with(
    vcs: &dyn Vcs,
    remote: &str,
    message: &str,
    log: &dyn Log,
) -> Result<PublishOutcome> {
    let outcome = SyncEngine::new(vcs, remote, log).publish(message)?;
    log.info("Push complete");
    Ok(outcome)
}
