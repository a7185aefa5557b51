//! `status` command.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::sync::{StatusReport, SyncEngine, SyncState};
use crate::vcs::Vcs;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if setup fails or the status or branch cannot be read.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let vcs = setup.connect()?;
    status_with(vcs.as_ref(), &setup.settings.remote, log)?;
    Ok(())
}

/// Take a snapshot through `vcs` and log it.
///
/// # Errors
///
/// Returns an error if the status or branch cannot be read.
pub fn status_with(vcs: &dyn Vcs, remote: &str, log: &dyn Log) -> Result<StatusReport> {
    let report = SyncEngine::new(vcs, remote, log).snapshot()?;
    for line in render(&report, remote) {
        log.info(&line);
    }
    Ok(report)
}

/// Human-readable lines for a status report.
#[must_use]
pub fn render(report: &StatusReport, remote: &str) -> Vec<String> {
    let mut lines = vec![format!("On branch {}", report.branch)];
    let upstream = format!("{remote}/{}", report.branch);
    match report.divergence {
        Some(d) if d.is_even() => lines.push(format!("Up to date with {upstream}")),
        Some(d) => {
            lines.push(format!("{d} {upstream}"));
            if d.is_diverged() {
                lines.push(format!(
                    "Diverged from {upstream}: sync will not fast-forward"
                ));
            }
        }
        None => lines.push(format!("No upstream {upstream}")),
    }
    match report.state {
        SyncState::Clean => lines.push("Working tree clean".to_string()),
        SyncState::Dirty => {
            lines.push(format!(
                "Working tree dirty: {} changed path(s)",
                report.changes.len()
            ));
            lines.extend(report.changes.iter().map(|c| format!("  {c}")));
        }
    }
    lines
}
