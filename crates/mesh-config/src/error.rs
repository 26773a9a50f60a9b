//! Error surface for configuration parsing and lookups.

use std::fmt;
use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Location of a configuration entry, used to point operators at bad input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    source: Arc<str>,
    line: usize,
}

impl Origin {
    /// Builds an origin for the given source name and 1-based line number.
    #[must_use]
    pub fn new(source: impl Into<Arc<str>>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }

    /// Origin used for entries inserted programmatically rather than parsed.
    #[must_use]
    pub fn inline() -> Self {
        Self::new("<inline>", 0)
    }

    /// Name of the file (or pseudo-file) the entry came from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Line number within the source, `0` for inline entries.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            formatter.write_str(&self.source)
        } else {
            write!(formatter, "{}:{}", self.source, self.line)
        }
    }
}

/// Errors raised while reading configuration files or interpreting values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// File that failed to open.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A line did not follow the `Key = Value` shape.
    #[error("{origin}: expected `Key = Value`, found '{text}'")]
    Syntax {
        /// Where the malformed line lives.
        origin: Origin,
        /// The offending line.
        text: String,
    },
    /// The node's own host configuration file could not be opened.
    #[error("cannot open host configuration file for '{name}' at '{path}': {source}")]
    HostFile {
        /// Node whose host file was requested.
        name: String,
        /// Expected host file location.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A mandatory setting was absent.
    #[error("required setting '{key}' is not configured")]
    Missing {
        /// Name of the setting.
        key: String,
    },
    /// A value could not be interpreted for the setting it was given to.
    #[error("invalid value '{value}' for '{key}' at {origin}: {reason}")]
    InvalidValue {
        /// Name of the setting.
        key: String,
        /// Raw configured value.
        value: String,
        /// Where the value was configured.
        origin: Origin,
        /// Why the value was rejected.
        reason: String,
    },
    /// A numeric value fell outside its permitted range.
    #[error("'{key}' must be {expected}, got {value}")]
    OutOfRange {
        /// Name of the setting.
        key: String,
        /// Configured value.
        value: i64,
        /// Human-readable description of the accepted range.
        expected: String,
    },
    /// A node or network name failed the identifier-safety predicate.
    #[error("invalid {what} '{name}': only ASCII letters, digits and '_' are allowed")]
    InvalidName {
        /// What kind of name was rejected (node, network, peer).
        what: &'static str,
        /// The rejected name.
        name: String,
    },
}

impl ConfigError {
    /// Name of the setting the error refers to, when there is one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Missing { key } | Self::InvalidValue { key, .. } | Self::OutOfRange { key, .. } => {
                Some(key.as_str())
            }
            Self::Read { .. }
            | Self::Syntax { .. }
            | Self::HostFile { .. }
            | Self::InvalidName { .. } => None,
        }
    }

    /// Builds a [`ConfigError::OutOfRange`] for `key`.
    #[must_use]
    pub fn out_of_range(key: &str, value: i64, expected: impl Into<String>) -> Self {
        Self::OutOfRange {
            key: key.to_owned(),
            value,
            expected: expected.into(),
        }
    }
}
