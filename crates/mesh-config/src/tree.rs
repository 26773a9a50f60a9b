//! Ordered `Key = Value` configuration trees.
//!
//! The daemon reads one global file and one host file per node. Both use the
//! same line format: a key, optional `=`, and a value. Keys compare ASCII
//! case-insensitively and may repeat; single-value lookups see the first
//! occurrence in file order. Host files may carry a PEM-encoded public key
//! after their settings, and those blocks are skipped here.

use std::fs;
use std::sync::Arc;

use camino::Utf8Path;

use crate::error::{ConfigError, Origin};
use crate::subnet::SubnetSpec;

const PEM_BEGIN: &str = "-----BEGIN";
const PEM_END: &str = "-----END";

/// One configured `Key = Value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    key: String,
    value: String,
    origin: Origin,
}

impl ConfigEntry {
    /// Builds an entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, origin: Origin) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            origin,
        }
    }

    /// Key as written in the file.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where the entry was read from.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Interprets the value as a boolean.
    pub fn as_bool(&self) -> Result<bool, ConfigError> {
        match self.value.to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(true),
            "no" | "false" | "off" | "0" => Ok(false),
            _ => Err(self.invalid("expected yes or no")),
        }
    }

    /// Interprets the value as a signed decimal integer.
    pub fn as_int(&self) -> Result<i64, ConfigError> {
        self.value
            .parse::<i64>()
            .map_err(|error| self.invalid(error.to_string()))
    }

    /// Interprets the value as a subnet specification.
    pub fn as_subnet(&self) -> Result<SubnetSpec, ConfigError> {
        self.value
            .parse::<SubnetSpec>()
            .map_err(|error| self.invalid(error.to_string()))
    }

    /// Builds an [`ConfigError::InvalidValue`] pointing at this entry.
    #[must_use]
    pub fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.key.clone(),
            value: self.value.clone(),
            origin: self.origin.clone(),
            reason: reason.into(),
        }
    }
}

/// An ordered multi-map of configuration entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    entries: Vec<ConfigEntry>,
}

impl ConfigTree {
    /// Builds an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the file at `path`.
    pub fn read(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path.as_str(), &text)
    }

    /// Parses `text`, attributing entries to `source` in diagnostics.
    pub fn parse(source: &str, text: &str) -> Result<Self, ConfigError> {
        let source: Arc<str> = Arc::from(source);
        let mut entries = Vec::new();
        let mut in_pem = false;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if in_pem {
                in_pem = !line.starts_with(PEM_END);
                continue;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with(PEM_BEGIN) {
                in_pem = true;
                continue;
            }

            let origin = Origin::new(Arc::clone(&source), index + 1);
            let Some((key, value)) = split_line(line) else {
                return Err(ConfigError::Syntax {
                    origin,
                    text: line.to_owned(),
                });
            };
            entries.push(ConfigEntry::new(key, value, origin));
        }

        Ok(Self { entries })
    }

    /// Appends an inline entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push(ConfigEntry::new(key, value, Origin::inline()));
    }

    /// Builder-style variant of [`ConfigTree::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// First entry for `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&ConfigEntry> {
        self.lookup_all(key).next()
    }

    /// Every entry for `key`, in file order.
    pub fn lookup_all<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a ConfigEntry> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |entry| entry.key.eq_ignore_ascii_case(key))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let split = line.find(|c: char| c == '=' || c.is_whitespace())?;
    let (key, rest) = line.split_at(split);
    let rest = rest.trim_start();
    let value = rest.strip_prefix('=').unwrap_or(rest).trim();
    if key.is_empty() || value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}
