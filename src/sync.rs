//! Repository state and reconciliation with the remote.
//!
//! Nothing is cached: every call asks the [`Vcs`] again, so a state read a
//! moment ago is never trusted for the next decision.
use std::fmt;
use std::path::PathBuf;

use crate::error::VcsError;
use crate::logging::Log;
use crate::vcs::{ChangedPath, Divergence, Vcs};

/// Whether the working tree has uncommitted changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No changed paths.
    Clean,
    /// At least one changed path, untracked files included.
    Dirty,
}

impl SyncState {
    /// Derive the state from a change-list.
    #[must_use]
    pub const fn from_changes(changes: &[ChangedPath]) -> Self {
        if changes.is_empty() {
            Self::Clean
        } else {
            Self::Dirty
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => f.write_str("clean"),
            Self::Dirty => f.write_str("dirty"),
        }
    }
}

/// What [`SyncEngine::reconcile`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The tree was clean; nothing was pulled.
    UpToDate,
    /// The tree was dirty and one pull ran.
    Pulled {
        /// The collaborator's summary of the pull.
        summary: String,
    },
}

/// Everything the `status` command shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Dirty or clean.
    pub state: SyncState,
    /// The change-list the state was derived from.
    pub changes: Vec<ChangedPath>,
    /// The checked-out branch.
    pub branch: String,
    /// Commit counts against the remote-tracking branch, `None` when there
    /// is no upstream to compare with.
    pub divergence: Option<Divergence>,
}

/// What [`SyncEngine::publish`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Whether a commit was created before pushing.
    pub committed: bool,
    /// Number of changed paths that went into the commit.
    pub changes: usize,
}

/// Decides when to talk to the remote, and does so through a [`Vcs`].
pub struct SyncEngine<'a> {
    vcs: &'a dyn Vcs,
    remote: &'a str,
    log: &'a dyn Log,
}

impl fmt::Debug for SyncEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl<'a> SyncEngine<'a> {
    /// Create an engine syncing with `remote`.
    #[must_use]
    pub fn new(vcs: &'a dyn Vcs, remote: &'a str, log: &'a dyn Log) -> Self {
        Self { vcs, remote, log }
    }

    /// The remote this engine syncs with.
    #[must_use]
    pub const fn remote(&self) -> &str {
        self.remote
    }

    /// The current change-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator cannot read the status.
    pub fn changes(&self) -> Result<Vec<ChangedPath>, VcsError> {
        let changes = self.vcs.status()?;
        tracing::debug!("{} changed path(s)", changes.len());
        Ok(changes)
    }

    /// Dirty iff the change-list is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator cannot read the status.
    pub fn check_status(&self) -> Result<SyncState, VcsError> {
        Ok(SyncState::from_changes(&self.changes()?))
    }

    /// Pull once if the tree is dirty; report up to date otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::SyncFailed`] with the collaborator's message if
    /// the pull fails. The pull is not retried.
    pub fn reconcile(&self) -> Result<ReconcileOutcome, VcsError> {
        match self.check_status()? {
            SyncState::Clean => {
                self.log.info("Already up to date");
                Ok(ReconcileOutcome::UpToDate)
            }
            SyncState::Dirty => {
                self.log.info(&format!("Pulling from {}", self.remote));
                let summary = self.vcs.pull()?;
                if !summary.is_empty() {
                    self.log.info(&summary);
                }
                Ok(ReconcileOutcome::Pulled { summary })
            }
        }
    }

    /// Report what [`reconcile`](Self::reconcile) would do without pulling.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator cannot read the status.
    pub fn reconcile_dry_run(&self) -> Result<SyncState, VcsError> {
        let state = self.check_status()?;
        match state {
            SyncState::Clean => self.log.info("Already up to date"),
            SyncState::Dirty => self.log.dry_run(&format!("Would pull from {}", self.remote)),
        }
        Ok(state)
    }

    /// Commit counts between the current branch and `<remote>/<branch>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the branch cannot be determined or the upstream
    /// does not resolve.
    pub fn divergence(&self) -> Result<Divergence, VcsError> {
        let branch = self.vcs.current_branch()?;
        self.divergence_of(&branch)
    }

    fn divergence_of(&self, branch: &str) -> Result<Divergence, VcsError> {
        let upstream = format!("{}/{branch}", self.remote);
        self.vcs.ahead_behind(&upstream, branch)
    }

    /// Change-list, branch and divergence in one report.
    ///
    /// A divergence that cannot be computed (typically: no upstream yet) is
    /// logged as a warning and reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the status or the branch cannot be read.
    pub fn snapshot(&self) -> Result<StatusReport, VcsError> {
        let changes = self.changes()?;
        let branch = self.vcs.current_branch()?;
        let divergence = match self.divergence_of(&branch) {
            Ok(divergence) => Some(divergence),
            Err(e) => {
                self.log
                    .warn(&format!("Cannot compare with {}/{branch}: {e}", self.remote));
                None
            }
        };
        Ok(StatusReport {
            state: SyncState::from_changes(&changes),
            changes,
            branch,
            divergence,
        })
    }

    /// Stage everything, commit with `message` when there is something to
    /// commit, then push.
    ///
    /// A push failure after a successful commit leaves the commit in place.
    ///
    /// # Errors
    ///
    /// Returns an error from whichever collaborator step failed.
    pub fn publish(&self, message: &str) -> Result<PublishOutcome, VcsError> {
        let changes = self.changes()?;
        let committed = !changes.is_empty();
        if committed {
            self.log
                .info(&format!("Committing {} change(s)", changes.len()));
            self.vcs.add(&[PathBuf::from(".")])?;
            self.vcs.commit(message)?;
        } else {
            self.log.debug("Nothing to commit");
        }
        self.log.info(&format!("Pushing to {}", self.remote));
        if let Err(e) = self.vcs.push() {
            if committed {
                self.log.error(&format!(
                    "Push to {} failed; the new commit stays in the local history",
                    self.remote
                ));
            }
            return Err(e);
        }
        Ok(PublishOutcome {
            committed,
            changes: changes.len(),
        })
    }
}
