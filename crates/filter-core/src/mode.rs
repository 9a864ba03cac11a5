//! System properties participation policy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Controls whether, and at what priority, the system property source takes
/// part in placeholder resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum SystemPropertiesMode {
    /// Never consult system properties.
    Never,
    /// Consult supplied sources first, system properties second.
    #[default]
    Fallback,
    /// Consult system properties before supplied sources.
    Override,
}

const LONG_FORM_PREFIX: &str = "SYSTEM_PROPERTIES_MODE_";

impl SystemPropertiesMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "NEVER",
            Self::Fallback => "FALLBACK",
            Self::Override => "OVERRIDE",
        }
    }
}

impl FromStr for SystemPropertiesMode {
    type Err = Error;

    /// Accepts `NEVER`, `FALLBACK`, `OVERRIDE` and their
    /// `SYSTEM_PROPERTIES_MODE_*` long forms, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::configuration("No system properties mode given"));
        }

        let upper = trimmed.to_ascii_uppercase();
        let short = upper.strip_prefix(LONG_FORM_PREFIX).unwrap_or(&upper);
        match short {
            "NEVER" => Ok(Self::Never),
            "FALLBACK" => Ok(Self::Fallback),
            "OVERRIDE" => Ok(Self::Override),
            _ => Err(Error::configuration(format!(
                "Unknown system properties mode: {trimmed}"
            ))),
        }
    }
}

impl TryFrom<String> for SystemPropertiesMode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SystemPropertiesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
