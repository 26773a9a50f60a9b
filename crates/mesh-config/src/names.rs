//! Identifier-safety predicate shared by node, peer and network names.
//!
//! Names end up as file names under `hosts/` and as values in script
//! environments, so only a conservative character set is accepted.

use crate::ConfigError;

/// Returns `true` when `name` is non-empty and contains only ASCII
/// alphanumerics and underscores.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Validates `name`, describing it as `what` in the error.
pub fn check_name(what: &'static str, name: &str) -> Result<(), ConfigError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            what,
            name: name.to_owned(),
        })
    }
}
