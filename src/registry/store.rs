//! JSON persistence for a single registry document.
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write as _};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RegistryError;

/// In-memory form of a registry: unique names to values.
pub type Mapping<V> = BTreeMap<String, V>;

/// Parse a registry document.
///
/// Unlike deserializing straight into a [`Mapping`], a name that appears
/// twice is an error instead of the last occurrence winning.
///
/// # Errors
///
/// Returns an error if `content` is not a JSON object of `V` values or
/// repeats a key.
pub fn parse_mapping<V: DeserializeOwned>(content: &str) -> serde_json::Result<Mapping<V>> {
    serde_json::from_str::<UniqueKeys<V>>(content).map(|document| document.0)
}

struct UniqueKeys<V>(Mapping<V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueKeys<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectVisitor<V>(PhantomData<fn() -> V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for ObjectVisitor<V> {
            type Value = Mapping<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object with unique names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut mapping = Mapping::new();
                while let Some((name, value)) = access.next_entry::<String, V>()? {
                    match mapping.entry(name) {
                        Entry::Occupied(entry) => {
                            return Err(de::Error::custom(format_args!(
                                "duplicate name '{}'",
                                entry.key()
                            )));
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(value);
                        }
                    }
                }
                Ok(mapping)
            }
        }

        deserializer
            .deserialize_map(ObjectVisitor(PhantomData))
            .map(Self)
    }
}

/// Loads and saves one registry document at a fixed path.
#[derive(Debug, Clone)]
pub struct RegistryStore<V> {
    path: PathBuf,
    _value: PhantomData<fn() -> V>,
}

impl<V: Serialize + DeserializeOwned> RegistryStore<V> {
    /// Create a store backed by `path`. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the mapping from disk.
    ///
    /// A missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CorruptRegistry`] if the file exists but is
    /// not a JSON object of the expected shape (an empty file included), or
    /// [`RegistryError::Io`] if it cannot be read.
    pub fn load(&self) -> Result<Mapping<V>, RegistryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("registry {} not found, starting empty", self.path.display());
                return Ok(Mapping::new());
            }
            Err(source) => {
                return Err(RegistryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        parse_mapping(&content).map_err(|source| RegistryError::CorruptRegistry {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the mapping to disk, replacing the previous document atomically.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the document cannot be
    /// written.
    pub fn save(&self, mapping: &Mapping<V>) -> Result<(), RegistryError> {
        let mut serialized =
            serde_json::to_string_pretty(mapping).map_err(|source| RegistryError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        serialized.push('\n');

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| RegistryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        write_atomic(&self.path, serialized.as_bytes()).map_err(|source| RegistryError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            "saved {} entries to {}",
            mapping.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Temp file next to `path`, unique per process.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "registry".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Write `bytes` to a sibling temp file, fsync it, then rename it over `path`.
///
/// The temp file is removed if any step fails.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = write_then_rename(&tmp, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}
