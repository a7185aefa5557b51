//! `dependencies`, `plugins`, `env`, `machines` and `dependency` commands.
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::{EnvAction, GlobalOpts, MachineAction, MethodAction};
use crate::config::DottsPaths;
use crate::logging::Log;
use crate::registry::{
    AddOutcome, MachineAttributes, Mapping, MethodRegistry, RegistryManager, RegistryValue,
    format_entry, parse_mapping,
};

/// A registry operation, independent of which registry it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction<V> {
    /// Add (or, for upsert registries, replace) an entry.
    Add {
        /// Entry name.
        name: String,
        /// Entry value.
        value: V,
    },
    /// Overwrite an existing entry.
    Modify {
        /// Entry name.
        name: String,
        /// New value.
        value: V,
    },
    /// Delete an existing entry.
    Remove {
        /// Entry name.
        name: String,
    },
    /// Print every entry.
    List,
}

impl From<MethodAction> for EntryAction<String> {
    fn from(action: MethodAction) -> Self {
        match action {
            MethodAction::Add { name, method } => Self::Add {
                name,
                value: method,
            },
            MethodAction::Mod { name, method } => Self::Modify {
                name,
                value: method,
            },
            MethodAction::Remove { name } => Self::Remove { name },
            MethodAction::List => Self::List,
        }
    }
}

impl From<EnvAction> for EntryAction<String> {
    fn from(action: EnvAction) -> Self {
        match action {
            EnvAction::Add { name, value } => Self::Add { name, value },
            EnvAction::Mod { name, value } => Self::Modify { name, value },
            EnvAction::Remove { name } => Self::Remove { name },
            EnvAction::List => Self::List,
        }
    }
}

impl From<MachineAction> for EntryAction<MachineAttributes> {
    fn from(action: MachineAction) -> Self {
        match action {
            MachineAction::Add { name } => Self::Add {
                name,
                value: MachineAttributes::default(),
            },
            MachineAction::Remove { name } => Self::Remove { name },
            MachineAction::List => Self::List,
        }
    }
}

/// Run a registry subcommand against the registry `open` builds.
///
/// # Errors
///
/// Returns an error if setup fails or the registry operation fails.
pub fn run<V: RegistryValue>(
    global: &GlobalOpts,
    open: fn(&DottsPaths) -> RegistryManager<V>,
    action: EntryAction<V>,
    log: &dyn Log,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let registry = open(&setup.paths);
    log.debug(&format!("registry file: {}", registry.store().path().display()));
    apply(&registry, action, log, &mut io::stdout().lock())
}

/// Apply `action` to `registry`; `list` output goes to `out`.
///
/// # Errors
///
/// Returns an error if the registry cannot be read or written, or the
/// operation is rejected (`AlreadyExists`, `NotFound`).
pub fn apply<V: RegistryValue>(
    registry: &RegistryManager<V>,
    action: EntryAction<V>,
    log: &dyn Log,
    out: &mut dyn Write,
) -> Result<()> {
    let label = registry.label();
    match action {
        EntryAction::Add { name, value } => {
            let old = registry.get(&name)?.as_ref().and_then(RegistryValue::summary);
            let new = value.summary();
            match (registry.add(&name, value)?, old, new) {
                (AddOutcome::Inserted, ..) => log.info(&format!("Added {label} '{name}'")),
                (AddOutcome::Replaced, Some(old), Some(new)) => {
                    log.info(&format!("Replaced {label} '{name}': {old} -> {new}"));
                }
                (AddOutcome::Replaced, ..) => log.info(&format!("Replaced {label} '{name}'")),
            }
        }
        EntryAction::Modify { name, value } => {
            let shown = value.summary();
            let previous = registry.modify(&name, value)?;
            match (previous.summary(), shown) {
                (Some(old), Some(new)) => {
                    log.info(&format!("Changed {label} '{name}': {old} -> {new}"));
                }
                _ => log.info(&format!("Changed {label} '{name}'")),
            }
        }
        EntryAction::Remove { name } => {
            registry.remove(&name)?;
            log.info(&format!("Removed {label} '{name}'"));
        }
        EntryAction::List => {
            let entries = registry.list()?;
            if entries.is_empty() {
                log.info(&format!("No entries in {}", registry.store().path().display()));
            }
            for (name, value) in &entries {
                writeln!(out, "{}", format_entry(name, value))?;
            }
        }
    }
    Ok(())
}

/// Import a JSON `name -> method` file into the dependency registry.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the registry
/// cannot be written.
pub fn import(global: &GlobalOpts, file: &Path, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let registry = MethodRegistry::dependencies(&setup.paths);
    import_into(&registry, file, log)?;
    Ok(())
}

/// Import `file` into `registry`, returning the number of entries written.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON object of
/// strings, or the registry cannot be written.
pub fn import_into(registry: &MethodRegistry, file: &Path, log: &dyn Log) -> Result<usize> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let entries: Mapping<String> = parse_mapping(&content)
        .with_context(|| format!("{} is not a JSON object of name -> method", file.display()))?;
    let count = registry.import(entries)?;
    log.info(&format!(
        "Imported {count} {} entr{} from {}",
        registry.label(),
        if count == 1 { "y" } else { "ies" },
        file.display()
    ));
    Ok(count)
}
