//! Placeholder resolution over layered property sources
//!
//! Resolves `prefix + key + suffix` spans against an ordered list of
//! [`PropertySource`]s plus an injected system property source whose priority
//! is set by [`SystemPropertiesMode`].
//!
//! ```text
//! sources:  db.host=localhost, url=jdbc://${db.host}:${db.port:5432}
//! template: connect ${url}
//! result:   connect jdbc://localhost:5432
//! ```
//!
//! Resolution is nesting-aware: a resolved value is itself resolved, and a
//! key may contain placeholders (`${db.${env}.url}`). The chain of keys being
//! resolved is tracked so a self-referencing definition fails with
//! [`Error::CircularPlaceholder`] instead of recursing forever, and a chain
//! longer than [`MAX_NESTING_DEPTH`] fails with [`Error::NestingTooDeep`].
//! Placeholders that resolve nowhere stay in the output verbatim unless strict
//! mode is on.

use crate::{Error, PropertySource, Result, SystemPropertiesMode};

pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "${";
pub const DEFAULT_PLACEHOLDER_SUFFIX: &str = "}";
pub const DEFAULT_VALUE_SEPARATOR: &str = ":";

/// Deepest chain of nested placeholders resolved before giving up.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Pure string-substitution engine. Holds configuration only; every call to
/// [`PlaceholderResolver::resolve`] is independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderResolver {
    prefix: String,
    suffix: String,
    /// Opening token that starts a nested level inside a span.
    simple_prefix: String,
    value_separator: Option<String>,
    system_properties: PropertySource,
    strict: bool,
}

impl Default for PlaceholderResolver {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PLACEHOLDER_PREFIX.into(),
            suffix: DEFAULT_PLACEHOLDER_SUFFIX.into(),
            simple_prefix: simple_prefix(DEFAULT_PLACEHOLDER_PREFIX, DEFAULT_PLACEHOLDER_SUFFIX),
            value_separator: Some(DEFAULT_VALUE_SEPARATOR.into()),
            system_properties: PropertySource::new("system"),
            strict: false,
        }
    }
}

fn simple_prefix(prefix: &str, suffix: &str) -> String {
    let opener = match suffix {
        "}" => Some("{"),
        "]" => Some("["),
        ")" => Some("("),
        _ => None,
    };
    match opener {
        Some(open) if prefix.ends_with(open) => open.to_string(),
        _ => prefix.to_string(),
    }
}

impl PlaceholderResolver {
    /// Create a resolver with custom delimiters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either delimiter is empty.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        if prefix.is_empty() {
            return Err(Error::configuration("Placeholder prefix must not be empty"));
        }
        if suffix.is_empty() {
            return Err(Error::configuration("Placeholder suffix must not be empty"));
        }

        Ok(Self {
            simple_prefix: simple_prefix(&prefix, &suffix),
            prefix,
            suffix,
            ..Self::default()
        })
    }

    /// Set the separator between a key and its inline default value.
    /// `None` or an empty separator disables defaults.
    pub fn with_value_separator(mut self, separator: Option<impl Into<String>>) -> Self {
        self.value_separator = separator.map(Into::into).filter(|s: &String| !s.is_empty());
        self
    }

    /// Inject the source consulted as "system properties".
    pub fn with_system_properties(mut self, system_properties: PropertySource) -> Self {
        self.system_properties = system_properties;
        self
    }

    /// Fail on unresolved placeholders instead of leaving them verbatim.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn system_properties(&self) -> &PropertySource {
        &self.system_properties
    }

    /// Resolve every placeholder in `template`.
    ///
    /// `sources` are searched in order and the first hit wins; system
    /// properties are consulted before (`Override`), after (`Fallback`) or
    /// not at all (`Never`).
    ///
    /// # Errors
    ///
    /// - [`Error::CircularPlaceholder`] when a key appears in its own
    ///   resolution chain
    /// - [`Error::UnresolvedPlaceholder`] in strict mode when a key resolves
    ///   nowhere
    /// - [`Error::NestingTooDeep`] when placeholders nest more than
    ///   [`MAX_NESTING_DEPTH`] levels
    pub fn resolve(
        &self,
        template: &str,
        sources: &[PropertySource],
        mode: SystemPropertiesMode,
    ) -> Result<String> {
        let mut chain = Vec::new();
        self.parse(template, sources, mode, &mut chain)
    }

    fn parse(
        &self,
        value: &str,
        sources: &[PropertySource],
        mode: SystemPropertiesMode,
        chain: &mut Vec<String>,
    ) -> Result<String> {
        let Some(mut start) = value.find(&self.prefix) else {
            return Ok(value.to_string());
        };

        let mut result = value.to_string();
        loop {
            let Some(end) = self.find_placeholder_end(&result, start) else {
                break;
            };

            let placeholder = result[start + self.prefix.len()..end].to_string();
            if chain.contains(&placeholder) {
                return Err(Error::CircularPlaceholder { key: placeholder });
            }
            if chain.len() >= MAX_NESTING_DEPTH {
                return Err(Error::NestingTooDeep {
                    key: placeholder,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            chain.push(placeholder.clone());

            let key = self.parse(&placeholder, sources, mode, chain)?;
            let found = self
                .lookup(&key, sources, mode)
                .or_else(|| self.lookup_with_default(&key, sources, mode));

            let resume_at = match found {
                Some(raw) => {
                    let resolved = self.parse(&raw, sources, mode, chain)?;
                    result.replace_range(start..end + self.suffix.len(), &resolved);
                    tracing::trace!(%key, "Resolved placeholder");
                    start + resolved.len()
                }
                None if self.strict => return Err(Error::UnresolvedPlaceholder { key }),
                None => end + self.suffix.len(),
            };
            chain.pop();

            match result[resume_at..].find(&self.prefix) {
                Some(offset) => start = resume_at + offset,
                None => break,
            }
        }

        Ok(result)
    }

    /// Byte index of the suffix closing the span that opens at `start`.
    fn find_placeholder_end(&self, buf: &str, start: usize) -> Option<usize> {
        let mut index = start + self.prefix.len();
        let mut nesting = 0usize;

        while index < buf.len() {
            let rest = &buf[index..];
            if rest.starts_with(&self.suffix) {
                if nesting == 0 {
                    return Some(index);
                }
                nesting -= 1;
                index += self.suffix.len();
            } else if rest.starts_with(&self.simple_prefix) {
                nesting += 1;
                index += self.simple_prefix.len();
            } else {
                index += rest.chars().next().map_or(1, char::len_utf8);
            }
        }

        None
    }

    fn lookup(&self, key: &str, sources: &[PropertySource], mode: SystemPropertiesMode) -> Option<String> {
        let supplied = || sources.iter().find_map(|source| source.get(key));
        let system = || self.system_properties.get(key);

        let hit = match mode {
            SystemPropertiesMode::Never => supplied(),
            SystemPropertiesMode::Fallback => supplied().or_else(system),
            SystemPropertiesMode::Override => system().or_else(supplied),
        };
        hit.map(str::to_string)
    }

    /// Handle `name<separator>default` keys.
    fn lookup_with_default(
        &self,
        key: &str,
        sources: &[PropertySource],
        mode: SystemPropertiesMode,
    ) -> Option<String> {
        let separator = self.value_separator.as_deref()?;
        let (name, default) = key.split_once(separator)?;
        self.lookup(name, sources, mode)
            .or_else(|| Some(default.to_string()))
    }
}
