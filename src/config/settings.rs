//! The `.dottsrc` settings document.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which version-control collaborator implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Shell out to the `git` binary.
    #[default]
    Git,
    /// Use libgit2 in-process.
    Libgit2,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => f.write_str("git"),
            Self::Libgit2 => f.write_str("libgit2"),
        }
    }
}

/// Settings read from `.dottsrc` at startup.
///
/// Every key is optional and unknown keys are ignored, so a file written for
/// a newer version still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remote whose tracking branch divergence is measured against.
    pub remote: String,
    /// Version-control backend.
    pub backend: Backend,
    /// Commit message used by `push` when none is given.
    pub commit_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            backend: Backend::Git,
            commit_message: "Update dotfiles".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file, or one that is empty (as left by a bare `touch`),
    /// yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// settings object.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidSettings {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_rc(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".dottsrc");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(".dottsrc")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let (_dir, path) = write_rc("");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn empty_object_gives_defaults() {
        let (_dir, path) = write_rc("{}");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn partial_object_overrides_only_given_keys() {
        let (_dir, path) = write_rc(r#"{"remote": "upstream", "backend": "libgit2"}"#);
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.remote, "upstream");
        assert_eq!(settings.backend, Backend::Libgit2);
        assert_eq!(settings.commit_message, Settings::default().commit_message);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (_dir, path) = write_rc(r#"{"theme": "cyberpunk"}"#);
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let (_dir, path) = write_rc("{remote: origin");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSettings { .. }));
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let (_dir, path) = write_rc(r#"{"backend": "hg"}"#);
        assert!(Settings::load(&path).is_err());
    }
}
