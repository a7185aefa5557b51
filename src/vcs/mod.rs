//! The version-control collaborator.
//!
//! Everything dotts needs from version control goes through the [`Vcs`]
//! trait.  Two implementations exist: [`GitCli`] shells out to the `git`
//! binary, [`LibGit`] links libgit2.  Both are bound to the repository root
//! when constructed and re-read repository state on every call.
pub mod git;
pub mod libgit;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Backend, DottsPaths, Settings};
use crate::error::VcsError;
use crate::exec::Executor;

pub use git::GitCli;
pub use libgit::LibGit;

/// One entry of the working tree's change-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    /// Two-character status code in `git status --porcelain` form
    /// (e.g. `" M"`, `"A "`, `"??"`).
    pub code: String,
    /// Path relative to the repository root.
    pub path: PathBuf,
}

impl fmt::Display for ChangedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.path.display())
    }
}

/// Commit counts between a local branch and its upstream.
///
/// Both counts are kept: a branch can be ahead and behind at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence {
    /// Commits on the local branch missing from the upstream.
    pub ahead: usize,
    /// Commits on the upstream missing from the local branch.
    pub behind: usize,
}

impl Divergence {
    /// Whether the two histories have each gained commits the other lacks.
    #[must_use]
    pub const fn is_diverged(&self) -> bool {
        self.ahead > 0 && self.behind > 0
    }

    /// Whether local and upstream point at the same history.
    #[must_use]
    pub const fn is_even(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ahead, {} behind", self.ahead, self.behind)
    }
}

/// Operations dotts needs from a version-control system.
///
/// Every call blocks until the underlying operation finishes.  Any failure
/// is final for that operation; nothing is retried.
#[cfg_attr(test, mockall::automock)]
pub trait Vcs {
    /// Create a repository at the root.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CommandFailed`] if initialisation fails.
    fn init(&self) -> Result<(), VcsError>;

    /// Uncommitted changes in the working tree, untracked files included.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CommandFailed`] if the status cannot be read.
    fn status(&self) -> Result<Vec<ChangedPath>, VcsError>;

    /// Pull from the remote, returning the collaborator's summary.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::SyncFailed`] with the collaborator's message.
    fn pull(&self) -> Result<String, VcsError>;

    /// Stage `paths` (relative to the root).
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CommandFailed`] if staging fails.
    fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError>;

    /// Commit the staged changes.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::SyncFailed`] with the collaborator's message.
    fn commit(&self, message: &str) -> Result<(), VcsError>;

    /// Push the current branch.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::SyncFailed`] with the collaborator's message.
    fn push(&self) -> Result<(), VcsError>;

    /// Name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CommandFailed`] if HEAD is detached or unreadable.
    fn current_branch(&self) -> Result<String, VcsError>;

    /// Commit counts between `local` and `upstream` (both revision specs).
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CommandFailed`] if either revision does not
    /// resolve.
    fn ahead_behind(&self, upstream: &str, local: &str) -> Result<Divergence, VcsError>;
}

/// Build the collaborator selected by `settings` for the repository at
/// `paths.root()`.
///
/// # Errors
///
/// Returns [`VcsError::CollaboratorMissing`] when the `git` backend is
/// selected and `git` is not on `PATH`.
pub fn connect(
    paths: &DottsPaths,
    settings: &Settings,
    executor: Arc<dyn Executor>,
) -> Result<Box<dyn Vcs>, VcsError> {
    let vcs: Box<dyn Vcs> = match settings.backend {
        Backend::Git => Box::new(GitCli::new(paths.root(), &settings.remote, executor)?),
        Backend::Libgit2 => Box::new(LibGit::new(paths.root(), &settings.remote)),
    };
    Ok(vcs)
}
