//! Layered property set assembly
//!
//! Builds one property set from a source layer and a to-filter layer:
//!
//! 1. source = explicit source properties, then each source location in order
//! 2. to-filter = explicit to-filter properties, then each location in order
//! 3. optionally seed the result with the unfiltered source layer
//! 4. resolve every to-filter key *and* value against the source layer and
//!    write it into the result, overriding seeded entries with the same key
//!
//! Later layers override earlier ones within a step. Missing locations are
//! fatal unless the matching `ignore*NotFound` option is set.

use std::path::{Path, PathBuf};
use std::slice;

use crate::{Error, FilterOptions, PlaceholderResolver, PropertySource, Result, SystemPropertiesMode};

/// Loads a property set from a resource location.
pub trait PropertyLoader {
    /// # Errors
    ///
    /// Must report a missing location as [`Error::ResourceNotFound`] so the
    /// merger can honour the `ignore*NotFound` options.
    fn load(&self, location: &Path) -> Result<PropertySource>;
}

/// Loads property files from the local filesystem by extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemLoader;

impl PropertyLoader for FileSystemLoader {
    fn load(&self, location: &Path) -> Result<PropertySource> {
        PropertySource::from_file(location)
    }
}

/// Assembles filtered property sets.
#[derive(Debug, Clone)]
pub struct PropertySetMerger<L = FileSystemLoader> {
    loader: L,
    system_properties: PropertySource,
}

impl PropertySetMerger {
    pub fn new() -> Self {
        Self::with_loader(FileSystemLoader)
    }
}

impl Default for PropertySetMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: PropertyLoader> PropertySetMerger<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            system_properties: PropertySource::new("system"),
        }
    }

    /// Inject the source consulted as "system properties" during filtering.
    pub fn with_system_properties(mut self, system_properties: PropertySource) -> Self {
        self.system_properties = system_properties;
        self
    }

    /// Build the merged, filtered property set.
    ///
    /// Uses `placeholderPrefix`, `placeholderSuffix`, `valueSeparator`,
    /// `systemPropertiesMode`, `strict`, `includeSourceProperties` and both
    /// `ignore*NotFound` flags from `options`.
    ///
    /// # Errors
    ///
    /// - [`Error::ResourceNotFound`] for a missing location whose ignore
    ///   flag is off
    /// - [`Error::Configuration`] for invalid delimiters or unreadable files
    /// - any resolution error
    pub fn build(
        &self,
        source_properties: &PropertySource,
        source_locations: &[PathBuf],
        properties_to_filter: &PropertySource,
        locations_to_filter: &[PathBuf],
        options: &FilterOptions,
    ) -> Result<PropertySource> {
        let resolver = options.resolver(self.system_properties.clone())?;

        let source = self.layer(
            "source",
            source_properties,
            source_locations,
            options.ignore_source_location_not_found,
        )?;
        let to_filter = self.layer(
            "to-filter",
            properties_to_filter,
            locations_to_filter,
            options.ignore_location_to_filter_not_found,
        )?;

        let mut result = PropertySource::new("merged");
        if options.include_source_properties {
            result.extend_from(&source);
        }
        if !to_filter.is_empty() {
            filter_properties(
                &resolver,
                options.system_properties_mode,
                &to_filter,
                &source,
                &mut result,
            )?;
        }

        tracing::debug!(
            source = source.len(),
            to_filter = to_filter.len(),
            merged = result.len(),
            "Built filtered property set"
        );
        Ok(result)
    }

    fn layer(
        &self,
        name: &str,
        explicit: &PropertySource,
        locations: &[PathBuf],
        ignore_not_found: bool,
    ) -> Result<PropertySource> {
        let mut layer = PropertySource::new(name);
        layer.extend_from(explicit);

        for location in locations {
            match self.loader.load(location) {
                Ok(loaded) => {
                    tracing::debug!(?location, layer = name, count = loaded.len(), "Loaded property location");
                    layer.extend_from(&loaded);
                }
                Err(Error::ResourceNotFound { path }) if ignore_not_found => {
                    tracing::debug!(?path, layer = name, "Skipping missing property location");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(layer)
    }
}

/// Resolve each key and value of `to_filter` against `source` into
/// `destination`.
///
/// With an empty `source` the entries are copied through unfiltered.
pub fn filter_properties(
    resolver: &PlaceholderResolver,
    mode: SystemPropertiesMode,
    to_filter: &PropertySource,
    source: &PropertySource,
    destination: &mut PropertySource,
) -> Result<()> {
    if source.is_empty() {
        destination.extend_from(to_filter);
        return Ok(());
    }

    let sources = slice::from_ref(source);
    for (key, value) in to_filter.iter() {
        let filtered_key = resolver.resolve(key, sources, mode)?;
        let filtered_value = resolver.resolve(value, sources, mode)?;
        destination.insert(filtered_key, filtered_value);
    }
    Ok(())
}
