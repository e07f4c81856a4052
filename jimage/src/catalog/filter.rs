//! Extension filters

use crate::error::JImageError;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;

/// Which resources a catalog build selects, by extension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// Class files (`class`)
    #[default]
    Class,
    /// Property bundles (`properties`)
    Properties,
    /// Any other extension, stored lowercase without a leading dot
    Other(String),
}

impl ExtensionFilter {
    /// Canonical extension text
    pub fn as_str(&self) -> &str {
        match self {
            Self::Class => "class",
            Self::Properties => "properties",
            Self::Other(ext) => ext,
        }
    }

    /// Whether an entry extension is selected, ignoring ASCII case
    pub fn matches(&self, extension: &str) -> bool {
        extension.eq_ignore_ascii_case(self.as_str())
    }
}

impl FromStr for ExtensionFilter {
    type Err = JImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.is_empty() || trimmed.contains(|c: char| c == '/' || c == '.') {
            return Err(JImageError::InvalidFilter(String::from(s)));
        }

        let normalized = trimmed.to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "class" => Self::Class,
            "properties" => Self::Properties,
            _ => Self::Other(normalized),
        })
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
