//! Fixed locations inside the dotfiles root.
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::registry::Domain;

/// Name of the settings file at the dotfiles root.
pub const SETTINGS_FILE: &str = ".dottsrc";

/// Directory (relative to the root) holding the registry documents.
pub const REGISTRY_DIR: &str = "dotts";

/// Locations of everything dotts reads and writes.
///
/// The root is the version-controlled dotfiles directory itself (by default
/// the user's config directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottsPaths {
    root: PathBuf,
}

impl DottsPaths {
    /// Use `root` as the dotfiles root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the dotfiles root.
    ///
    /// An explicit override wins (canonicalized when it already exists);
    /// otherwise `$XDG_CONFIG_HOME`, then `$HOME/.config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no override is given and
    /// neither environment variable is set.
    pub fn resolve(root_override: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(root) = root_override {
            let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
            return Ok(Self::new(root));
        }
        Self::from_env(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
    }

    /// Pick the root from already-read environment values.
    fn from_env(xdg_config: Option<PathBuf>, home: Option<PathBuf>) -> Result<Self, ConfigError> {
        xdg_config
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| {
                home.filter(|p| !p.as_os_str().is_empty())
                    .map(|h| h.join(".config"))
            })
            .map(Self::new)
            .ok_or(ConfigError::NoConfigDir)
    }

    /// The dotfiles root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.dottsrc` settings file.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// The `.gitignore` at the root.
    #[must_use]
    pub fn gitignore(&self) -> PathBuf {
        self.root.join(".gitignore")
    }

    /// Directory holding the registry documents.
    #[must_use]
    pub fn registry_dir(&self) -> PathBuf {
        self.root.join(REGISTRY_DIR)
    }

    /// Backing file for one registry domain.
    #[must_use]
    pub fn registry_file(&self, domain: Domain) -> PathBuf {
        self.registry_dir().join(domain.file_name())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn xdg_config_home_wins_over_home() {
        let paths = DottsPaths::from_env(
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/u")),
        )
        .unwrap();
        assert_eq!(paths.root(), Path::new("/xdg"));
    }

    #[test]
    fn falls_back_to_home_dot_config() {
        let paths = DottsPaths::from_env(None, Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(paths.root(), Path::new("/home/u/.config"));
    }

    #[test]
    fn empty_xdg_is_ignored() {
        let paths =
            DottsPaths::from_env(Some(PathBuf::new()), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(paths.root(), Path::new("/home/u/.config"));
    }

    #[test]
    fn no_env_is_an_error() {
        let err = DottsPaths::from_env(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::NoConfigDir));
    }

    #[test]
    fn override_is_used_even_when_missing() {
        let paths = DottsPaths::resolve(Some(Path::new("/does/not/exist/dotts-root"))).unwrap();
        assert_eq!(paths.root(), Path::new("/does/not/exist/dotts-root"));
    }

    #[test]
    fn registry_files_live_under_registry_dir() {
        let paths = DottsPaths::new("/cfg");
        assert_eq!(
            paths.registry_file(Domain::Dependencies),
            PathBuf::from("/cfg/dotts/dependencies.json")
        );
        assert_eq!(
            paths.registry_file(Domain::Machines),
            PathBuf::from("/cfg/dotts/machines.json")
        );
        assert_eq!(paths.settings_file(), PathBuf::from("/cfg/.dottsrc"));
    }
}
