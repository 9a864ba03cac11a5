//! Filter configuration surface

use std::path::Path;

use filter_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_FILE_ENCODING, DEFAULT_FLUSH_LINE_THRESHOLD};
use crate::resolver::{DEFAULT_PLACEHOLDER_PREFIX, DEFAULT_PLACEHOLDER_SUFFIX, DEFAULT_VALUE_SEPARATOR};
use crate::{FileFilter, LineFilterEngine, PlaceholderResolver, PropertySource, Result, SystemPropertiesMode};

/// Every recognized filtering option, with defaults for anything omitted.
///
/// Field names serialize in camelCase, so a TOML options file reads:
///
/// ```toml
/// placeholderPrefix = "@{"
/// systemPropertiesMode = "OVERRIDE"
/// filenameRegex = ".*\\.xml"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    pub placeholder_prefix: String,
    pub placeholder_suffix: String,
    /// Separator for inline defaults (`${key:default}`); `None` disables them.
    pub value_separator: Option<String>,
    pub system_properties_mode: SystemPropertiesMode,
    pub file_encoding: String,
    pub flush_line_threshold: usize,
    pub recurse: bool,
    pub directory_name_regex: Option<String>,
    pub filename_regex: Option<String>,
    pub ignore_source_location_not_found: bool,
    pub ignore_location_to_filter_not_found: bool,
    pub include_source_properties: bool,
    /// Fail on unresolved placeholders instead of passing them through.
    pub strict: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.into(),
            placeholder_suffix: DEFAULT_PLACEHOLDER_SUFFIX.into(),
            value_separator: Some(DEFAULT_VALUE_SEPARATOR.into()),
            system_properties_mode: SystemPropertiesMode::default(),
            file_encoding: DEFAULT_FILE_ENCODING.into(),
            flush_line_threshold: DEFAULT_FLUSH_LINE_THRESHOLD,
            recurse: true,
            directory_name_regex: None,
            filename_regex: None,
            ignore_source_location_not_found: false,
            ignore_location_to_filter_not_found: false,
            include_source_properties: false,
            strict: false,
        }
    }
}

impl FilterOptions {
    /// Load options from a `.toml`, `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let options = ConfigStore::new().load(path)?;
        tracing::debug!(?path, "Loaded filter options");
        Ok(options)
    }

    /// Build the resolver described by these options.
    pub fn resolver(&self, system_properties: PropertySource) -> Result<PlaceholderResolver> {
        Ok(
            PlaceholderResolver::new(&self.placeholder_prefix, &self.placeholder_suffix)?
                .with_value_separator(self.value_separator.as_deref())
                .with_system_properties(system_properties)
                .with_strict(self.strict),
        )
    }

    /// Build the line filter engine described by these options.
    pub fn engine(&self, system_properties: PropertySource) -> Result<LineFilterEngine> {
        LineFilterEngine::new(self.resolver(system_properties)?)
            .with_mode(self.system_properties_mode)
            .with_encoding(&self.file_encoding)?
            .with_flush_line_threshold(self.flush_line_threshold)
    }

    /// Build the directory/file name predicate described by these options.
    pub fn file_filter(&self) -> Result<FileFilter> {
        FileFilter::new(
            self.directory_name_regex.as_deref(),
            self.filename_regex.as_deref(),
        )
    }

    /// Check every option that can be invalid, surfacing the first problem.
    pub fn validate(&self) -> Result<()> {
        self.engine(PropertySource::default())?;
        self.file_filter()?;
        Ok(())
    }
}
