//! Acquisition of the local private key and of node public keys.
//!
//! Keys come from inline hex settings or from PEM files. Every file goes
//! through [`check_key_path`] before it is opened, and public key files are
//! re-read for each encoding that is tried so that one decoder's failure
//! never affects the next.

mod errors;
mod keys;
mod pem;
mod safety;

use std::fs;
use std::io;

use camino::Utf8Path;
use mesh_config::{ConfPaths, ConfigStore, Scope};
use tracing::debug;
use zeroize::Zeroizing;

pub use self::errors::{CredentialError, UnsafePathError, UnsafeReason};
pub use self::keys::{INLINE_PUBLIC_EXPONENT, Keypair, PrivateKey, PublicKey};
pub use self::pem::PublicKeyFormat;
pub use self::safety::check_key_path;

const CREDENTIALS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::credentials");

/// Reads key files; a seam so tests can observe file access.
#[cfg_attr(test, mockall::automock)]
pub trait KeyReader {
    /// Returns the full contents of the file at `path`.
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String>;
}

/// Reads key files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsKeyReader;

impl KeyReader for FsKeyReader {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Loads the local private key.
///
/// An inline `PrivateKey` exponent wins; otherwise `PrivateKeyFile` or
/// `<confbase>/rsa_key.priv` is read as PKCS#1 PEM.
pub fn load_private_key(
    config: &dyn ConfigStore,
    paths: &ConfPaths,
    reader: &dyn KeyReader,
) -> Result<PrivateKey, CredentialError> {
    if let Some(inline) = config.lookup_string(Scope::Global, "PrivateKey") {
        let inline = Zeroizing::new(inline);
        debug!(target: CREDENTIALS_TARGET, "using inline private key");
        return PrivateKey::from_exponent_hex(&inline);
    }

    let path = config
        .lookup_string(Scope::Global, "PrivateKeyFile")
        .map_or_else(|| paths.private_key_file(), Into::into);
    check_key_path(&path)?;
    let text = Zeroizing::new(read_key_file(reader, &path)?);
    let key = pem::decode_private_key(&text).map_err(|reason| {
        CredentialError::MalformedPrivateKey {
            path: path.clone(),
            reason,
        }
    })?;
    debug!(target: CREDENTIALS_TARGET, file = %path, "private key loaded");
    Ok(PrivateKey::Full(key))
}

/// Loads the public key of node `name` from its host configuration.
///
/// The first configured source is used: inline `PublicKey`, then the
/// `PublicKeyFile` setting, then `<confbase>/hosts/<name>`. Both PEM encodings
/// are tried for each file. A missing host file counts as an exhausted
/// source.
pub fn load_public_key(
    config: &dyn ConfigStore,
    name: &str,
    paths: &ConfPaths,
    reader: &dyn KeyReader,
) -> Result<PublicKey, CredentialError> {
    if let Some(inline) = config.lookup_string(Scope::Host, "PublicKey") {
        debug!(target: CREDENTIALS_TARGET, node = name, "using inline public key");
        return PublicKey::from_modulus_hex(&inline);
    }

    if let Some(file) = config.lookup_string(Scope::Host, "PublicKeyFile") {
        let path = Utf8Path::new(&file);
        return decode_public_key_file(reader, path)?.ok_or_else(|| {
            CredentialError::MalformedPublicKey {
                path: path.to_path_buf(),
            }
        });
    }

    let host_file = paths.host_file(name);
    match decode_public_key_file(reader, &host_file) {
        Ok(Some(key)) => Ok(key),
        Ok(None) => Err(CredentialError::MissingPublicKey {
            name: name.to_owned(),
        }),
        Err(CredentialError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Err(CredentialError::MissingPublicKey {
                name: name.to_owned(),
            })
        }
        Err(error) => Err(error),
    }
}

fn decode_public_key_file(
    reader: &dyn KeyReader,
    path: &Utf8Path,
) -> Result<Option<PublicKey>, CredentialError> {
    check_key_path(path)?;
    for format in PublicKeyFormat::PROBE_ORDER {
        let text = read_key_file(reader, path)?;
        if let Some(key) = format.decode(&text) {
            let key = PublicKey::new(key);
            debug!(
                target: CREDENTIALS_TARGET,
                file = %path,
                format = format.label(),
                fingerprint = %key.fingerprint(),
                "public key loaded"
            );
            return Ok(Some(key));
        }
    }
    Ok(None)
}

fn read_key_file(reader: &dyn KeyReader, path: &Utf8Path) -> Result<String, CredentialError> {
    reader
        .read_to_string(path)
        .map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests;
