//! [`Vcs`] implementation linked against libgit2.
//!
//! Needs no `git` binary.  Pull only fast-forwards; anything that would need
//! a merge is reported as a sync failure.
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    Config, Cred, CredentialType, ErrorCode, FetchOptions, IndexAddOption, PushOptions,
    RemoteCallbacks, Repository, Status, StatusOptions,
};

use super::{ChangedPath, Divergence, Vcs};
use crate::error::VcsError;

/// Credential callback invocations allowed per network operation.
///
/// libgit2 keeps asking while the callback keeps answering, so a rejected
/// key would otherwise loop forever.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Operates on the repository at `root` through libgit2.
#[derive(Debug, Clone)]
pub struct LibGit {
    root: PathBuf,
    remote: String,
}

impl LibGit {
    /// Bind to the repository at `root`, syncing with `remote`.
    ///
    /// The repository is opened lazily on every call.
    #[must_use]
    pub fn new(root: &Path, remote: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            remote: remote.to_string(),
        }
    }

    fn open(&self, operation: &'static str) -> Result<Repository, VcsError> {
        Repository::open(&self.root).map_err(command_failed(operation))
    }

    /// Fast-forward the current branch to its remote-tracking branch.
    fn fast_forward(&self, repo: &Repository) -> Result<String, git2::Error> {
        let branch = head_branch(repo)?;
        let mut remote = repo.find_remote(&self.remote)?;
        let config = repo.config()?;
        let mut options = FetchOptions::new();
        options.remote_callbacks(remote_callbacks(&config));
        remote.fetch::<&str>(&[], Some(&mut options), None)?;

        let upstream_name = format!("refs/remotes/{}/{branch}", self.remote);
        let upstream = repo.find_reference(&upstream_name).map_err(|_| {
            git2::Error::from_str(&format!(
                "no branch '{branch}' on remote '{}'",
                self.remote
            ))
        })?;
        let incoming = repo.reference_to_annotated_commit(&upstream)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;
        let target = incoming.id();
        let local_name = format!("refs/heads/{branch}");

        if analysis.is_up_to_date() {
            return Ok("Already up to date.".to_string());
        }
        if analysis.is_unborn() {
            repo.reference(&local_name, target, true, "dotts: initial pull")?;
            repo.set_head(&local_name)?;
            repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;
            return Ok(format!("Checked out {}", short_id(target)));
        }
        if !analysis.is_fast_forward() {
            return Err(git2::Error::from_str(&format!(
                "'{branch}' and '{}/{branch}' have diverged; fast-forward not possible",
                self.remote
            )));
        }

        let mut local = repo.find_reference(&local_name)?;
        let previous = local.target();
        // Update the working tree first so a conflicting local edit leaves
        // the branch where it was.
        let object = repo.find_object(target, None)?;
        repo.checkout_tree(&object, Some(CheckoutBuilder::new().safe()))?;
        local.set_target(target, "dotts: fast-forward")?;
        repo.set_head(&local_name)?;
        Ok(match previous {
            Some(from) => format!("Fast-forward {}..{}", short_id(from), short_id(target)),
            None => format!("Fast-forward to {}", short_id(target)),
        })
    }

    fn push_branch(&self, repo: &Repository) -> Result<(), git2::Error> {
        let branch = head_branch(repo)?;
        let mut remote = repo.find_remote(&self.remote)?;
        let config = repo.config()?;
        let mut callbacks = remote_callbacks(&config);
        callbacks.push_update_reference(|refname, status| match status {
            Some(reason) => Err(git2::Error::from_str(&format!(
                "{refname} rejected: {reason}"
            ))),
            None => Ok(()),
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote.push(&[refspec.as_str()], Some(&mut options))
    }

    fn commit_index(repo: &Repository, message: &str) -> Result<(), git2::Error> {
        let signature = repo.signature()?;
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e),
        };
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(())
    }
}

impl Vcs for LibGit {
    fn init(&self) -> Result<(), VcsError> {
        Repository::init(&self.root).map_err(command_failed("init"))?;
        Ok(())
    }

    fn status(&self) -> Result<Vec<ChangedPath>, VcsError> {
        let repo = self.open("status")?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        let statuses = repo
            .statuses(Some(&mut options))
            .map_err(command_failed("status"))?;
        Ok(statuses
            .iter()
            .filter(|entry| !entry.status().is_ignored())
            .map(|entry| ChangedPath {
                code: porcelain_code(entry.status()),
                path: PathBuf::from(String::from_utf8_lossy(entry.path_bytes()).into_owned()),
            })
            .collect())
    }

    fn pull(&self) -> Result<String, VcsError> {
        let repo = self.open("pull")?;
        self.fast_forward(&repo).map_err(sync_failed("pull"))
    }

    fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError> {
        let repo = self.open("add")?;
        let mut index = repo.index().map_err(command_failed("add"))?;
        let specs = paths.iter().map(PathBuf::as_path);
        index
            .add_all(specs.clone(), IndexAddOption::DEFAULT, None)
            .and_then(|()| index.update_all(specs, None))
            .and_then(|()| index.write())
            .map_err(command_failed("add"))
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        let repo = self.open("commit")?;
        Self::commit_index(&repo, message).map_err(sync_failed("commit"))
    }

    fn push(&self) -> Result<(), VcsError> {
        let repo = self.open("push")?;
        self.push_branch(&repo).map_err(sync_failed("push"))
    }

    fn current_branch(&self) -> Result<String, VcsError> {
        let repo = self.open("current branch")?;
        head_branch(&repo).map_err(command_failed("current branch"))
    }

    fn ahead_behind(&self, upstream: &str, local: &str) -> Result<Divergence, VcsError> {
        let repo = self.open("ahead/behind count")?;
        let resolve = |spec: &str| -> Result<git2::Oid, git2::Error> {
            Ok(repo.revparse_single(spec)?.peel_to_commit()?.id())
        };
        let counts = resolve(local)
            .and_then(|l| resolve(upstream).map(|u| (l, u)))
            .and_then(|(l, u)| repo.graph_ahead_behind(l, u))
            .map_err(command_failed("ahead/behind count"))?;
        Ok(Divergence {
            ahead: counts.0,
            behind: counts.1,
        })
    }
}

/// Name of the checked-out branch, including an unborn one.
fn head_branch(repo: &Repository) -> Result<String, git2::Error> {
    match repo.head() {
        Ok(head) if head.is_branch() => head
            .shorthand()
            .map(str::to_string)
            .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8")),
        Ok(_) => Err(git2::Error::from_str("HEAD is detached")),
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo.find_reference("HEAD")?;
            head.symbolic_target()
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .map(str::to_string)
                .ok_or_else(|| git2::Error::from_str("HEAD does not name a branch"))
        }
        Err(e) => Err(e),
    }
}

/// Credentials from the SSH agent, then git's credential helpers, then the
/// platform default.
fn remote_callbacks(config: &Config) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication failed for {url}"
            )));
        }
        if allowed.contains(CredentialType::SSH_KEY)
            && let Some(user) = username
        {
            return Cred::ssh_key_from_agent(user);
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Cred::credential_helper(config, url, username);
        }
        Cred::default()
    });
    callbacks
}

/// Two-character porcelain code for a libgit2 status.
fn porcelain_code(status: Status) -> String {
    if status.is_conflicted() {
        return "UU".to_string();
    }
    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };
    if status.is_wt_new() && index == ' ' {
        return "??".to_string();
    }
    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };
    format!("{index}{worktree}")
}

fn short_id(oid: git2::Oid) -> String {
    let mut id = oid.to_string();
    id.truncate(7);
    id
}

fn command_failed(operation: &'static str) -> impl Fn(git2::Error) -> VcsError {
    move |e| VcsError::CommandFailed {
        operation,
        message: e.message().to_string(),
    }
}

fn sync_failed(operation: &'static str) -> impl Fn(git2::Error) -> VcsError {
    move |e| VcsError::SyncFailed {
        operation,
        message: e.message().to_string(),
    }
}
