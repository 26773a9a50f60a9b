//! Cipher suite negotiation for the local node.
//!
//! The data channel's cipher, digest, MAC length and compression level come
//! from the node's host file. The outbound leg of the node's own
//! control-channel connection uses [`CipherSuite::control_channel`], which is
//! not configurable.

mod algorithms;
mod ephemeral;
mod errors;

use std::time::Duration;

use mesh_config::defaults::{
    DEFAULT_COMPRESSION, DEFAULT_KEY_EXPIRE, DEFAULT_MAC_LENGTH, MAX_COMPRESSION,
};
use mesh_config::{ConfigError, ConfigStore, Scope};
use tracing::debug;

pub use self::algorithms::{Cipher, Digest};
pub use self::ephemeral::{DISABLED_KEY_LEN, EphemeralKey, key_material_len, schedule_expiry};
pub use self::errors::SuiteError;

const SUITE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::suite");

/// Value of `Cipher` or `Digest` that disables the algorithm.
pub const DISABLED: &str = "none";

/// Resolves a configured cipher name; `none` yields `Ok(None)`.
pub fn resolve_cipher(name: &str) -> Result<Option<Cipher>, SuiteError> {
    if name.eq_ignore_ascii_case(DISABLED) {
        return Ok(None);
    }
    name.parse()
        .map(Some)
        .map_err(|_| SuiteError::UnknownCipher {
            name: name.to_owned(),
        })
}

/// Resolves a configured digest name; `none` yields `Ok(None)`.
pub fn resolve_digest(name: &str) -> Result<Option<Digest>, SuiteError> {
    if name.eq_ignore_ascii_case(DISABLED) {
        return Ok(None);
    }
    name.parse()
        .map(Some)
        .map_err(|_| SuiteError::UnknownDigest {
            name: name.to_owned(),
        })
}

/// Validates a MAC length against `digest`; without a digest it is forced
/// to zero.
pub fn validate_mac_length(digest: Option<Digest>, length: i64) -> Result<usize, SuiteError> {
    let Some(digest) = digest else {
        return Ok(0);
    };
    let max = digest.output_len();
    usize::try_from(length)
        .ok()
        .filter(|length| *length <= max)
        .ok_or(SuiteError::MacLength { length, max })
}

/// Validates a compression level.
pub fn validate_compression(level: i64) -> Result<u8, SuiteError> {
    if (0..=MAX_COMPRESSION).contains(&level) {
        u8::try_from(level).map_err(|_| SuiteError::Compression { level })
    } else {
        Err(SuiteError::Compression { level })
    }
}

/// Cipher, digest, MAC length and compression for one channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSuite {
    cipher: Option<Cipher>,
    digest: Option<Digest>,
    mac_length: usize,
    compression: u8,
}

impl CipherSuite {
    /// Builds a suite, validating the MAC length and compression level.
    pub fn new(
        cipher: Option<Cipher>,
        digest: Option<Digest>,
        mac_length: i64,
        compression: i64,
    ) -> Result<Self, SuiteError> {
        Ok(Self {
            cipher,
            digest,
            mac_length: validate_mac_length(digest, mac_length)?,
            compression: validate_compression(compression)?,
        })
    }

    /// Reads the data-channel suite from the node's host settings.
    pub fn negotiate(config: &dyn ConfigStore) -> Result<Self, SuiteError> {
        let cipher = match config.lookup_string(Scope::Host, "Cipher") {
            Some(name) => resolve_cipher(&name)?,
            None => Some(Cipher::DEFAULT),
        };
        let digest = match config.lookup_string(Scope::Host, "Digest") {
            Some(name) => resolve_digest(&name)?,
            None => Some(Digest::DEFAULT),
        };
        let mac_length = config
            .lookup_int(Scope::Host, "MACLength")?
            .unwrap_or(DEFAULT_MAC_LENGTH);
        let compression = config
            .lookup_int(Scope::Host, "Compression")?
            .unwrap_or(DEFAULT_COMPRESSION);

        let suite = Self::new(cipher, digest, mac_length, compression)?;
        debug!(
            target: SUITE_TARGET,
            cipher = suite.cipher_name(),
            digest = suite.digest_name(),
            mac_length = suite.mac_length,
            compression = suite.compression,
            "data channel suite selected"
        );
        Ok(suite)
    }

    /// Fixed suite for the outbound leg of the node's own control-channel
    /// connection.
    #[must_use]
    pub const fn control_channel() -> Self {
        Self {
            cipher: Some(Cipher::BlowfishOfb),
            digest: Some(Digest::Sha1),
            mac_length: 0,
            compression: 0,
        }
    }

    /// Selected cipher, `None` when encryption is disabled.
    #[must_use]
    pub const fn cipher(&self) -> Option<Cipher> {
        self.cipher
    }

    /// Selected digest, `None` when authentication is disabled.
    #[must_use]
    pub const fn digest(&self) -> Option<Digest> {
        self.digest
    }

    /// Bytes of digest appended to each packet.
    #[must_use]
    pub const fn mac_length(&self) -> usize {
        self.mac_length
    }

    /// Compression level.
    #[must_use]
    pub const fn compression(&self) -> u8 {
        self.compression
    }

    /// Bytes of key material the cipher needs.
    #[must_use]
    pub fn key_length(&self) -> usize {
        key_material_len(self.cipher)
    }

    fn cipher_name(&self) -> &'static str {
        self.cipher.map_or(DISABLED, Into::into)
    }

    fn digest_name(&self) -> &'static str {
        self.digest.map_or(DISABLED, Into::into)
    }
}

/// Lifetime of the data-channel key from `KeyExpire`.
pub fn key_lifetime(config: &dyn ConfigStore) -> Result<Duration, SuiteError> {
    let seconds = config
        .lookup_int(Scope::Global, "KeyExpire")?
        .unwrap_or(DEFAULT_KEY_EXPIRE);
    u64::try_from(seconds)
        .ok()
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::out_of_range("KeyExpire", seconds, "greater than 0").into())
}
