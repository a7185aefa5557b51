// Shared helpers for integration tests.
//
// Provides a temporary dotfiles root, a fluent builder for seeding it, and a
// bare-origin git fixture for exercising real repositories.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use dotts::config::DottsPaths;
use dotts::registry::Domain;
use git2::{Repository, RepositoryInitOptions, Signature};

/// An isolated dotfiles root backed by a [`tempfile::TempDir`].
pub struct TestEnv {
    /// Temporary directory acting as the dotfiles root.
    pub root: tempfile::TempDir,
}

impl TestEnv {
    /// An empty root.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the dotfiles root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Paths rooted at this environment.
    pub fn paths(&self) -> DottsPaths {
        DottsPaths::new(self.root.path())
    }

    /// Raw contents of a registry document.
    pub fn registry_text(&self, domain: Domain) -> String {
        fs::read_to_string(self.paths().registry_file(domain)).expect("read registry file")
    }
}

/// Fluent builder for [`TestEnv`].
pub struct TestEnvBuilder {
    env: TestEnv,
}

impl TestEnvBuilder {
    /// Begin building from an empty root.
    pub fn new() -> Self {
        Self {
            env: TestEnv::new(),
        }
    }

    /// Write `content` verbatim as the document of `domain`.
    pub fn with_registry(self, domain: Domain, content: &str) -> Self {
        let path = self.env.paths().registry_file(domain);
        fs::create_dir_all(path.parent().expect("registry file has a parent"))
            .expect("create registry dir");
        fs::write(path, content).expect("write registry file");
        self
    }

    /// Write `content` as `.dottsrc`.
    pub fn with_settings(self, content: &str) -> Self {
        fs::write(self.env.paths().settings_file(), content).expect("write .dottsrc");
        self
    }

    /// Write an arbitrary file relative to the root.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.env.root_path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, content).expect("write file");
        self
    }

    /// Finish building.
    pub fn build(self) -> TestEnv {
        self.env
    }
}

/// A bare `origin` repository with one commit on `main`, plus helpers to
/// clone it and commit into clones.
pub struct GitFixture {
    /// Holds the origin and every clone.
    pub dir: tempfile::TempDir,
}

impl GitFixture {
    /// Create the origin and seed it with a README commit.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut options = RepositoryInitOptions::new();
        options.bare(true).initial_head("main");
        Repository::init_opts(dir.path().join("origin.git"), &options).expect("init origin");

        let fixture = Self { dir };
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let seed = Repository::init_opts(fixture.dir.path().join("seed"), &options)
            .expect("init seed");
        commit_file(&seed, "README.md", "dotfiles\n", "initial");
        seed.remote("origin", &fixture.origin_url())
            .expect("add origin")
            .push(&["refs/heads/main:refs/heads/main"], None)
            .expect("seed origin");
        fixture
    }

    /// Location of the bare origin, usable as a remote URL.
    pub fn origin_url(&self) -> String {
        self.dir
            .path()
            .join("origin.git")
            .to_string_lossy()
            .into_owned()
    }

    /// Clone the origin into `name` with a committer identity configured.
    pub fn clone_as(&self, name: &str) -> Repository {
        let repo = Repository::clone(&self.origin_url(), self.dir.path().join(name))
            .expect("clone origin");
        let mut config = repo.config().expect("repo config");
        config
            .set_str("user.name", "Dotts Test")
            .expect("set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("set user.email");
        repo
    }

    /// Working directory of a clone.
    pub fn workdir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Write `name`, stage it and commit on HEAD.
pub fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> git2::Oid {
    let workdir = repo.workdir().expect("non-bare repo");
    fs::write(workdir.join(name), contents).expect("write file");
    let mut index = repo.index().expect("index");
    index.add_path(Path::new(name)).expect("stage file");
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("find tree");
    let signature = Signature::now("Dotts Test", "test@example.com").expect("signature");
    let parent = repo
        .head()
        .ok()
        .map(|h| h.peel_to_commit().expect("head commit"));
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("commit")
}

/// Push `main` of `repo` to its `origin`.
pub fn push_main(repo: &Repository) {
    repo.find_remote("origin")
        .expect("origin remote")
        .push(&["refs/heads/main:refs/heads/main"], None)
        .expect("push main");
}

/// Update the remote-tracking branches of `repo`.
pub fn fetch(repo: &Repository) {
    repo.find_remote("origin")
        .expect("origin remote")
        .fetch::<&str>(&[], None, None)
        .expect("fetch origin");
}
