//! JSON-backed registries: dependencies, plugins, environment variables and
//! machines.
//!
//! Each registry is a flat `name -> value` document managed by a
//! [`RegistryManager`].  Three domains map a name to a method string; the
//! machine registry maps a name to an attribute object and rejects duplicate
//! adds.
pub mod manager;
pub mod store;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::DottsPaths;

pub use manager::{AddOutcome, AddPolicy, RegistryManager};
pub use store::{Mapping, RegistryStore, parse_mapping};

/// A value type that can live in a registry.
pub trait RegistryValue: Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug {
    /// Text shown after the name when listing, if any.
    fn summary(&self) -> Option<String>;
}

impl RegistryValue for String {
    fn summary(&self) -> Option<String> {
        Some(self.clone())
    }
}

/// Attributes recorded for a machine. Currently always empty, persisted as
/// `{}`; keys already present on disk are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineAttributes(pub serde_json::Map<String, serde_json::Value>);

impl RegistryValue for MachineAttributes {
    fn summary(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            serde_json::to_string(&self.0).ok()
        }
    }
}

/// Registry whose values are installation methods (or env var values).
pub type MethodRegistry = RegistryManager<String>;

/// The machine registry.
pub type MachineRegistry = RegistryManager<MachineAttributes>;

/// The four registry domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Packages the dotfiles depend on, keyed by name, valued by install method.
    Dependencies,
    /// Shell/editor plugins, keyed by name, valued by install method.
    Plugins,
    /// Environment variables, keyed by name, valued by value.
    EnvVars,
    /// Machines sharing these dotfiles.
    Machines,
}

impl Domain {
    /// Every domain, in display order.
    pub const ALL: [Self; 4] = [Self::Dependencies, Self::Plugins, Self::EnvVars, Self::Machines];

    /// File name of the backing document.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies.json",
            Self::Plugins => "plugins.json",
            Self::EnvVars => "env.json",
            Self::Machines => "machines.json",
        }
    }

    /// Singular label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dependencies => "dependency",
            Self::Plugins => "plugin",
            Self::EnvVars => "env var",
            Self::Machines => "machine",
        }
    }

    /// How `add` treats an existing name.
    #[must_use]
    pub const fn add_policy(self) -> AddPolicy {
        match self {
            Self::Machines => AddPolicy::RejectDuplicate,
            Self::Dependencies | Self::Plugins | Self::EnvVars => AddPolicy::Upsert,
        }
    }

    fn manager<V: RegistryValue>(self, paths: &DottsPaths) -> RegistryManager<V> {
        RegistryManager::new(
            RegistryStore::new(paths.registry_file(self)),
            self.label(),
            self.add_policy(),
        )
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dependencies => "dependencies",
            Self::Plugins => "plugins",
            Self::EnvVars => "env",
            Self::Machines => "machines",
        };
        f.write_str(name)
    }
}

impl MethodRegistry {
    /// The dependency registry under `paths`.
    #[must_use]
    pub fn dependencies(paths: &DottsPaths) -> Self {
        Domain::Dependencies.manager(paths)
    }

    /// The plugin registry under `paths`.
    #[must_use]
    pub fn plugins(paths: &DottsPaths) -> Self {
        Domain::Plugins.manager(paths)
    }

    /// The environment-variable registry under `paths`.
    #[must_use]
    pub fn env_vars(paths: &DottsPaths) -> Self {
        Domain::EnvVars.manager(paths)
    }
}

impl MachineRegistry {
    /// The machine registry under `paths`.
    #[must_use]
    pub fn machines(paths: &DottsPaths) -> Self {
        Domain::Machines.manager(paths)
    }
}

/// Render one entry the way `list` prints it: `name: value`, or just the
/// name when the value has nothing to show.
#[must_use]
pub fn format_entry<V: RegistryValue>(name: &str, value: &V) -> String {
    value
        .summary()
        .map_or_else(|| name.to_string(), |summary| format!("{name}: {summary}"))
}
