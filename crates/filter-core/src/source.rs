//! Named key/value property sources

use std::collections::BTreeMap;
use std::path::Path;

use filter_fs::{ConfigStore, properties};

use crate::Result;

/// An ordered, named key/value map consulted during placeholder resolution.
///
/// Keys are kept sorted so anything derived from a source (merged sets,
/// serialized output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySource {
    name: String,
    entries: BTreeMap<String, String>,
}

impl PropertySource {
    /// Create an empty source with a diagnostic name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Create a source from key/value pairs.
    pub fn from_entries<K, V>(name: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a source from a property file (`.properties`, TOML, JSON or YAML).
    pub fn from_file(path: &Path) -> Result<Self> {
        let entries = ConfigStore::new().load_properties(path)?;
        Ok(Self {
            name: path.display().to_string(),
            entries,
        })
    }

    /// Snapshot the process environment.
    ///
    /// This is the usual stand-in for "system properties" handed to a
    /// resolver. Variables that are not valid UTF-8 are skipped.
    pub fn from_process_env() -> Self {
        Self {
            name: "environment".into(),
            entries: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Copy every entry of `other` into this source, replacing existing keys.
    pub fn extend_from(&mut self, other: &PropertySource) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }

    /// Render the entries as `.properties` text in sorted key order.
    pub fn to_properties_string(&self) -> String {
        properties::to_string(&self.entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertySource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries("inline", iter)
    }
}
