//! Domain-specific error types for dotts.
//!
//! Internal modules return typed errors ([`RegistryError`], [`VcsError`],
//! [`ConfigError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DottsError
//! ├── Registry(RegistryError) — corrupt files, duplicate adds, missing keys
//! ├── Vcs(VcsError)           — sync failures, missing git binary
//! └── Config(ConfigError)     — root resolution, .dottsrc parsing
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for dotts.
#[derive(Error, Debug)]
pub enum DottsError {
    /// Registry load, save, or lookup error.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Version-control collaborator error.
    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the registry store and manager.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The backing file exists but does not hold a valid registry document.
    #[error("registry file {} is corrupt: {source}", path.display())]
    CorruptRegistry {
        /// Path of the unparsable file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The name is already registered and the domain rejects duplicate adds.
    #[error("{registry} '{name}' already exists")]
    AlreadyExists {
        /// Domain label (e.g. `"machine"`).
        registry: &'static str,
        /// The duplicate name.
        name: String,
    },

    /// The name is not present in the registry.
    #[error("{registry} '{name}' not found")]
    NotFound {
        /// Domain label (e.g. `"dependency"`).
        registry: &'static str,
        /// The missing name.
        name: String,
    },

    /// A filesystem operation on a registry path failed.
    #[error("IO error on registry file {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The in-memory mapping could not be serialized.
    #[error("failed to serialize registry {}: {source}", path.display())]
    Serialize {
        /// Destination path.
        path: PathBuf,
        /// Underlying serialization error.
        source: serde_json::Error,
    },
}

/// Errors raised by the version-control collaborator.
#[derive(Error, Debug)]
pub enum VcsError {
    /// The version-control binary is not installed or not invocable.
    #[error("'{program}' is not installed or not on PATH")]
    CollaboratorMissing {
        /// Name of the missing program.
        program: String,
    },

    /// A pull, push, or commit failed. `message` is the collaborator's
    /// diagnostic, unmodified.
    #[error("{operation} failed: {message}")]
    SyncFailed {
        /// Operation that failed (`"pull"`, `"push"`, `"commit"`).
        operation: &'static str,
        /// Diagnostic reported by the collaborator.
        message: String,
    },

    /// Any other collaborator operation failed.
    #[error("{operation} failed: {message}")]
    CommandFailed {
        /// Operation that failed (e.g. `"status"`).
        operation: &'static str,
        /// Diagnostic reported by the collaborator.
        message: String,
    },
}

/// Errors raised while resolving paths and reading `.dottsrc`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("cannot determine the config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,

    /// `.dottsrc` exists but is not a valid settings document.
    #[error("invalid settings file {}: {source}", path.display())]
    InvalidSettings {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// An I/O error occurred while reading a settings file.
    #[error("IO error reading settings file {}: {source}", path.display())]
    Io {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
