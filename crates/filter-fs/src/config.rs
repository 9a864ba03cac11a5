//! Format-agnostic loading of option files and property files

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result, properties, text};

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension and handles deserialization
/// transparently.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn is_structured(extension: &str) -> bool {
    matches!(extension, "toml" | "json" | "yaml" | "yml")
}

fn parse_structured<T: DeserializeOwned>(path: &Path, extension: &str, content: &str) -> Result<T> {
    match extension {
        "toml" => toml::from_str(content).map_err(|e| parse_error(path, "TOML", e)),
        "json" => serde_json::from_str(content).map_err(|e| parse_error(path, "JSON", e)),
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| parse_error(path, "YAML", e)),
        _ => Err(Error::UnsupportedFormat {
            extension: extension.to_string(),
        }),
    }
}

fn parse_error(path: &Path, format: &str, message: impl ToString) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        format: format.into(),
        message: message.to_string(),
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a structured document from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let extension = extension_of(path);
        if !is_structured(&extension) {
            return Err(Error::UnsupportedFormat { extension });
        }
        let content = read_text(path)?;
        parse_structured(path, &extension, &content)
    }

    /// Load a flat key/value property set from a file.
    ///
    /// `.properties` files (and files without an extension) use Java
    /// properties syntax and are decoded as UTF-8, or as windows-1252 when
    /// they are not valid UTF-8. TOML, JSON and YAML documents are flattened into
    /// dotted keys: `[db] port = 5432` becomes `db.port=5432` and array
    /// elements are keyed by index (`hosts.0`, `hosts.1`).
    pub fn load_properties(&self, path: &Path) -> Result<BTreeMap<String, String>> {
        let extension = extension_of(path);
        if extension.is_empty() || extension == "properties" {
            let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
            let content = text::decode_lenient(&bytes);
            return properties::parse(&content).map_err(|e| parse_error(path, "properties", e));
        }
        if !is_structured(&extension) {
            return Err(Error::UnsupportedFormat { extension });
        }

        let content = read_text(path)?;
        let document: Value = parse_structured(path, &extension, &content)?;
        let Value::Object(_) = document else {
            return Err(parse_error(
                path,
                &extension.to_uppercase(),
                "expected a table of properties at the top level",
            ));
        };

        let mut entries = BTreeMap::new();
        flatten("", &document, &mut entries);
        tracing::debug!(?path, count = entries.len(), "Loaded structured properties");
        Ok(entries)
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    let child = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}.{segment}")
        }
    };

    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&child(key), nested, out);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten(&child(&index.to_string()), nested, out);
            }
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
