//! The rotating data-channel key.

use std::fmt;
use std::time::{Duration, SystemTime};

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::algorithms::Cipher;
use super::errors::SuiteError;

/// Key material length used when encryption is disabled.
pub const DISABLED_KEY_LEN: usize = 1;

/// Bytes of key material needed for `cipher`: key plus IV, or a one-byte
/// placeholder when encryption is disabled.
#[must_use]
pub fn key_material_len(cipher: Option<Cipher>) -> usize {
    cipher.map_or(DISABLED_KEY_LEN, |cipher| cipher.key_len() + cipher.iv_len())
}

/// Returns the instant a key created at `now` stops being valid.
#[must_use]
pub fn schedule_expiry(now: SystemTime, lifetime: Duration) -> SystemTime {
    now.checked_add(lifetime).unwrap_or(now)
}

/// Random key material with an expiry; scrubbed on drop.
pub struct EphemeralKey {
    material: Zeroizing<Vec<u8>>,
    expires_at: SystemTime,
}

impl EphemeralKey {
    /// Generates fresh key material for `cipher` from the operating system's
    /// random source.
    pub fn generate(
        cipher: Option<Cipher>,
        now: SystemTime,
        lifetime: Duration,
    ) -> Result<Self, SuiteError> {
        Self::generate_with(&mut OsRng, cipher, now, lifetime)
    }

    /// Generates key material using `rng`.
    pub fn generate_with(
        rng: &mut dyn RngCore,
        cipher: Option<Cipher>,
        now: SystemTime,
        lifetime: Duration,
    ) -> Result<Self, SuiteError> {
        let mut material = Zeroizing::new(vec![0u8; key_material_len(cipher)]);
        rng.try_fill_bytes(&mut material)
            .map_err(|source| SuiteError::Random { source })?;
        Ok(Self {
            material,
            expires_at: schedule_expiry(now, lifetime),
        })
    }

    /// Raw key and IV bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }

    /// Number of bytes of key material.
    #[must_use]
    pub fn len(&self) -> usize {
        self.material.len()
    }

    /// Whether the key holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }

    /// When the key must be replaced.
    #[must_use]
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Whether `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EphemeralKey")
            .field("len", &self.material.len())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
