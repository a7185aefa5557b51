//! Add / modify / remove / list over a [`RegistryStore`].
use crate::error::RegistryError;

use super::RegistryValue;
use super::store::{Mapping, RegistryStore};

/// How [`RegistryManager::add`] treats a name that is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPolicy {
    /// Overwrite the existing value.
    Upsert,
    /// Fail with [`RegistryError::AlreadyExists`].
    RejectDuplicate,
}

/// What [`RegistryManager::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The name was new.
    Inserted,
    /// The name existed and its value was overwritten.
    Replaced,
}

/// Domain-level operations on one registry.
///
/// Every mutation is a full read-modify-write of the backing document; a
/// failing operation never writes.  Nothing guards against two processes
/// mutating the same file at once (the last writer wins).
#[derive(Debug, Clone)]
pub struct RegistryManager<V> {
    store: RegistryStore<V>,
    label: &'static str,
    policy: AddPolicy,
}

impl<V: RegistryValue> RegistryManager<V> {
    /// Wrap `store`. `label` names one entry in messages (e.g. `"machine"`).
    #[must_use]
    pub const fn new(store: RegistryStore<V>, label: &'static str, policy: AddPolicy) -> Self {
        Self {
            store,
            label,
            policy,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &RegistryStore<V> {
        &self.store
    }

    /// Singular label for one entry.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// The add policy in force.
    #[must_use]
    pub const fn policy(&self) -> AddPolicy {
        self.policy
    }

    /// Register `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyExists`] when `name` is present and the
    /// policy is [`AddPolicy::RejectDuplicate`]; the file is left untouched.
    /// Load and save errors propagate.
    pub fn add(&self, name: &str, value: V) -> Result<AddOutcome, RegistryError> {
        let mut mapping = self.store.load()?;
        if mapping.contains_key(name) && self.policy == AddPolicy::RejectDuplicate {
            return Err(self.already_exists(name));
        }
        let outcome = match mapping.insert(name.to_string(), value) {
            Some(_) => AddOutcome::Replaced,
            None => AddOutcome::Inserted,
        };
        self.store.save(&mapping)?;
        Ok(outcome)
    }

    /// Overwrite the value of an existing `name`, returning the old value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when `name` is absent; the file is
    /// left untouched.
    pub fn modify(&self, name: &str, value: V) -> Result<V, RegistryError> {
        let mut mapping = self.store.load()?;
        let Some(slot) = mapping.get_mut(name) else {
            return Err(self.not_found(name));
        };
        let previous = std::mem::replace(slot, value);
        self.store.save(&mapping)?;
        Ok(previous)
    }

    /// Delete `name`, returning its value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when `name` is absent; the file is
    /// left untouched.
    pub fn remove(&self, name: &str) -> Result<V, RegistryError> {
        let mut mapping = self.store.load()?;
        let removed = mapping.remove(name).ok_or_else(|| self.not_found(name))?;
        self.store.save(&mapping)?;
        Ok(removed)
    }

    /// Look up a single entry.
    ///
    /// # Errors
    ///
    /// Propagates load errors.
    pub fn get(&self, name: &str) -> Result<Option<V>, RegistryError> {
        Ok(self.store.load()?.remove(name))
    }

    /// All entries, sorted by name.
    ///
    /// # Errors
    ///
    /// Propagates load errors.
    pub fn list(&self) -> Result<Vec<(String, V)>, RegistryError> {
        Ok(self.store.load()?.into_iter().collect())
    }

    /// Add every entry of `entries` in one read-modify-write, returning how
    /// many were written.
    ///
    /// Under [`AddPolicy::RejectDuplicate`] the first clash aborts the whole
    /// import and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyExists`] on a rejected duplicate, or
    /// propagates load and save errors.
    pub fn import(&self, entries: Mapping<V>) -> Result<usize, RegistryError> {
        let mut mapping = self.store.load()?;
        if self.policy == AddPolicy::RejectDuplicate
            && let Some(name) = entries.keys().find(|name| mapping.contains_key(*name))
        {
            return Err(self.already_exists(name));
        }
        let count = entries.len();
        mapping.extend(entries);
        self.store.save(&mapping)?;
        Ok(count)
    }

    fn not_found(&self, name: &str) -> RegistryError {
        RegistryError::NotFound {
            registry: self.label,
            name: name.to_string(),
        }
    }

    fn already_exists(&self, name: &str) -> RegistryError {
        RegistryError::AlreadyExists {
            registry: self.label,
            name: name.to_string(),
        }
    }
}
