//! [`Vcs`] implementation that shells out to the `git` binary.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ChangedPath, Divergence, Vcs};
use crate::error::VcsError;
use crate::exec::{ExecResult, Executor};

const GIT: &str = "git";

/// Runs `git` in the repository root through an [`Executor`].
///
/// Pull and push name the remote and the current branch explicitly, so the
/// branch's configured upstream (if any) plays no part.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    remote: String,
    executor: Arc<dyn Executor>,
}

impl GitCli {
    /// Bind to the repository at `root`, syncing with `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CollaboratorMissing`] if `git` is not on `PATH`.
    pub fn new(root: &Path, remote: &str, executor: Arc<dyn Executor>) -> Result<Self, VcsError> {
        if !executor.which(GIT) {
            return Err(VcsError::CollaboratorMissing {
                program: GIT.to_string(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
            remote: remote.to_string(),
            executor,
        })
    }

    /// The repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The remote pulled from and pushed to.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Run git and turn any failure into the error built by `fail`.
    fn git_or(
        &self,
        args: &[&str],
        fail: impl Fn(String) -> VcsError,
    ) -> Result<ExecResult, VcsError> {
        let result = self
            .executor
            .run_in_unchecked(&self.root, GIT, args)
            .map_err(|e| fail(format!("{e:#}")))?;
        if result.success {
            Ok(result)
        } else {
            Err(fail(result.diagnostic().to_string()))
        }
    }

    fn git(&self, operation: &'static str, args: &[&str]) -> Result<ExecResult, VcsError> {
        self.git_or(args, |message| VcsError::CommandFailed { operation, message })
    }

    fn git_sync(&self, operation: &'static str, args: &[&str]) -> Result<ExecResult, VcsError> {
        self.git_or(args, |message| VcsError::SyncFailed { operation, message })
    }
}

impl Vcs for GitCli {
    fn init(&self) -> Result<(), VcsError> {
        self.git("init", &["init"])?;
        Ok(())
    }

    fn status(&self) -> Result<Vec<ChangedPath>, VcsError> {
        let result = self.git(
            "status",
            &["status", "--porcelain=v1", "-z", "--untracked-files=all"],
        )?;
        Ok(parse_porcelain(&result.stdout))
    }

    fn pull(&self) -> Result<String, VcsError> {
        let branch = self.current_branch()?;
        let result = self.git_sync("pull", &["pull", "--ff-only", &self.remote, &branch])?;
        Ok(result.stdout.trim().to_string())
    }

    fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut args = vec!["add", "--all", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.git("add", &args)?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        self.git_sync("commit", &["commit", "-m", message])?;
        Ok(())
    }

    fn push(&self) -> Result<(), VcsError> {
        let branch = self.current_branch()?;
        self.git_sync("push", &["push", &self.remote, &branch])?;
        Ok(())
    }

    fn current_branch(&self) -> Result<String, VcsError> {
        // symbolic-ref also works on an unborn branch, unlike rev-parse.
        let result = self.git("current branch", &["symbolic-ref", "--short", "HEAD"])?;
        Ok(result.stdout.trim().to_string())
    }

    fn ahead_behind(&self, upstream: &str, local: &str) -> Result<Divergence, VcsError> {
        let range = format!("{local}...{upstream}");
        let result = self.git(
            "ahead/behind count",
            &["rev-list", "--left-right", "--count", &range],
        )?;
        parse_left_right_count(&result.stdout).ok_or_else(|| VcsError::CommandFailed {
            operation: "ahead/behind count",
            message: format!("unexpected rev-list output: {:?}", result.stdout.trim()),
        })
    }
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// Entries are NUL-terminated `XY path` records; a rename or copy is
/// followed by one extra record holding the original path, which is skipped.
fn parse_porcelain(output: &str) -> Vec<ChangedPath> {
    let mut changes = Vec::new();
    let mut records = output.split('\0').filter(|r| !r.is_empty());
    while let Some(record) = records.next() {
        let (Some(code), Some(path)) = (record.get(..2), record.get(3..)) else {
            continue;
        };
        if code.starts_with(['R', 'C']) {
            records.next();
        }
        changes.push(ChangedPath {
            code: code.to_string(),
            path: PathBuf::from(path),
        });
    }
    changes
}

/// Parse `rev-list --left-right --count` output: `<left>\t<right>`.
fn parse_left_right_count(output: &str) -> Option<Divergence> {
    let mut counts = output.split_whitespace().map(str::parse::<usize>);
    let ahead = counts.next()?.ok()?;
    let behind = counts.next()?.ok()?;
    if counts.next().is_some() {
        return None;
    }
    Some(Divergence { ahead, behind })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    fn git_with(responses: Vec<(bool, &str)>) -> (GitCli, Arc<MockExecutor>) {
        let executor = Arc::new(MockExecutor::with_responses(responses));
        let git = GitCli::new(
            Path::new("/cfg"),
            "origin",
            Arc::clone(&executor) as Arc<dyn Executor>,
        )
        .expect("git is available in the mock");
        (git, executor)
    }

    #[test]
    fn new_fails_when_git_missing() {
        let executor = Arc::new(MockExecutor::with_responses(vec![]).with_which(false));
        let err = GitCli::new(Path::new("/cfg"), "origin", executor).unwrap_err();
        assert!(matches!(err, VcsError::CollaboratorMissing { .. }));
    }

    #[test]
    fn parse_porcelain_empty_is_clean() {
        assert!(parse_porcelain("").is_empty());
    }

    #[test]
    fn parse_porcelain_reads_codes_and_paths() {
        let out = " M nvim/init.lua\0?? kitty/kitty.conf\0A  zsh/.zshrc\0";
        let changes = parse_porcelain(out);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].code, " M");
        assert_eq!(changes[0].path, PathBuf::from("nvim/init.lua"));
        assert_eq!(changes[1].code, "??");
        assert_eq!(changes[2].path, PathBuf::from("zsh/.zshrc"));
    }

    #[test]
    fn parse_porcelain_skips_rename_source() {
        let out = "R  new name.conf\0old name.conf\0 D gone.txt\0";
        let changes = parse_porcelain(out);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path, PathBuf::from("new name.conf"));
        assert_eq!(changes[1].code, " D");
    }

    #[test]
    fn parse_left_right_count_keeps_both_sides() {
        assert_eq!(
            parse_left_right_count("3\t2\n"),
            Some(Divergence { ahead: 3, behind: 2 })
        );
    }

    #[test]
    fn parse_left_right_count_rejects_garbage() {
        assert_eq!(parse_left_right_count("fatal"), None);
        assert_eq!(parse_left_right_count("1"), None);
        assert_eq!(parse_left_right_count("1\t2\t3"), None);
    }

    #[test]
    fn status_runs_porcelain_and_parses() {
        let (git, executor) = git_with(vec![(true, "?? a.txt\0")]);
        let changes = git.status().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(
            executor.calls()[0],
            vec!["git", "status", "--porcelain=v1", "-z", "--untracked-files=all"]
        );
    }

    #[test]
    fn pull_failure_is_sync_failed_with_verbatim_message() {
        let stderr = "fatal: Not possible to fast-forward, aborting.";
        let (git, _executor) = git_with(vec![(true, "main\n"), (false, stderr)]);
        let err = git.pull().unwrap_err();
        assert!(matches!(
            err,
            VcsError::SyncFailed { operation: "pull", ref message } if message == stderr
        ));
    }

    #[test]
    fn pull_names_remote_and_current_branch() {
        let (git, executor) = git_with(vec![
            (true, "dotfiles\n"),
            (true, "Updating 1a2b..3c4d\nFast-forward\n"),
        ]);
        assert_eq!(git.pull().unwrap(), "Updating 1a2b..3c4d\nFast-forward");
        assert_eq!(
            executor.calls(),
            vec![
                vec!["git", "symbolic-ref", "--short", "HEAD"],
                vec!["git", "pull", "--ff-only", "origin", "dotfiles"],
            ]
        );
    }

    #[test]
    fn push_targets_configured_remote() {
        let executor = Arc::new(MockExecutor::with_responses(vec![(true, "main\n"), (true, "")]));
        let git = GitCli::new(
            Path::new("/cfg"),
            "upstream",
            Arc::clone(&executor) as Arc<dyn Executor>,
        )
        .unwrap();
        assert_eq!(git.remote(), "upstream");
        git.push().unwrap();
        assert_eq!(executor.calls()[1], vec!["git", "push", "upstream", "main"]);
    }

    #[test]
    fn push_on_detached_head_runs_nothing_else() {
        let (git, executor) = git_with(vec![(false, "fatal: ref HEAD is not a symbolic ref")]);
        assert!(matches!(
            git.push().unwrap_err(),
            VcsError::CommandFailed { .. }
        ));
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn push_and_commit_failures_are_sync_failed() {
        let (git, _executor) = git_with(vec![
            (true, "main\n"),
            (false, "rejected"),
            (false, "nothing to commit"),
        ]);
        assert!(matches!(
            git.push().unwrap_err(),
            VcsError::SyncFailed { operation: "push", .. }
        ));
        assert!(matches!(
            git.commit("msg").unwrap_err(),
            VcsError::SyncFailed { operation: "commit", .. }
        ));
    }

    #[test]
    fn status_failure_is_command_failed() {
        let (git, _executor) = git_with(vec![(false, "fatal: not a git repository")]);
        assert!(matches!(
            git.status().unwrap_err(),
            VcsError::CommandFailed { operation: "status", .. }
        ));
    }

    #[test]
    fn add_passes_paths_after_separator() {
        let (git, executor) = git_with(vec![(true, "")]);
        git.add(&[PathBuf::from("."), PathBuf::from("-odd")]).unwrap();
        assert_eq!(
            executor.calls()[0],
            vec!["git", "add", "--all", "--", ".", "-odd"]
        );
    }

    #[test]
    fn current_branch_is_trimmed() {
        let (git, _executor) = git_with(vec![(true, "main\n")]);
        assert_eq!(git.current_branch().unwrap(), "main");
    }

    #[test]
    fn ahead_behind_uses_symmetric_range() {
        let (git, executor) = git_with(vec![(true, "3\t2\n")]);
        let d = git.ahead_behind("origin/main", "main").unwrap();
        assert_eq!(d, Divergence { ahead: 3, behind: 2 });
        assert_eq!(
            executor.calls()[0],
            vec!["git", "rev-list", "--left-right", "--count", "main...origin/main"]
        );
    }

    #[test]
    fn ahead_behind_without_upstream_is_command_failed() {
        let (git, _executor) = git_with(vec![(
            false,
            "fatal: ambiguous argument 'main...origin/main': unknown revision",
        )]);
        assert!(matches!(
            git.ahead_behind("origin/main", "main").unwrap_err(),
            VcsError::CommandFailed { .. }
        ));
    }
}
