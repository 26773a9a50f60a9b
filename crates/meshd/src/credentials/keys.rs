//! RSA key types held by the local identity.

use std::fmt;

use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::errors::CredentialError;

/// Public exponent assumed for keys configured inline as hex.
pub const INLINE_PUBLIC_EXPONENT: u32 = 0xFFFF;

const FINGERPRINT_BYTES: usize = 8;

/// A node's RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Wraps a decoded key.
    #[must_use]
    pub fn new(key: RsaPublicKey) -> Self {
        Self(key)
    }

    /// Builds a key from a hex modulus and the fixed inline exponent.
    pub fn from_modulus_hex(modulus: &str) -> Result<Self, CredentialError> {
        let bytes = decode_hex("PublicKey", modulus)?;
        let key = RsaPublicKey::new(
            BigUint::from_bytes_be(&bytes),
            BigUint::from(INLINE_PUBLIC_EXPONENT),
        )
        .map_err(|error| CredentialError::InlineKey {
            setting: "PublicKey",
            reason: error.to_string(),
        })?;
        Ok(Self(key))
    }

    /// Underlying key.
    #[must_use]
    pub fn as_rsa(&self) -> &RsaPublicKey {
        &self.0
    }

    /// Modulus length in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.0.n().bits()
    }

    /// Short SHA-256 digest of the modulus and exponent, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.n().to_bytes_be());
        hasher.update(self.0.e().to_bytes_be());
        let digest = hasher.finalize();
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

/// The local node's private key.
pub enum PrivateKey {
    /// A complete key read from a PKCS#1 file.
    Full(RsaPrivateKey),
    /// A bare private exponent configured inline; the modulus comes from the
    /// node's public key.
    Exponent(Zeroizing<Vec<u8>>),
}

impl PrivateKey {
    /// Builds an exponent-only key from inline hex.
    pub fn from_exponent_hex(exponent: &str) -> Result<Self, CredentialError> {
        decode_hex("PrivateKey", exponent).map(Self::Exponent)
    }

    fn matches(&self, public: &RsaPublicKey) -> bool {
        match self {
            Self::Full(key) => key.n() == public.n() && key.e() == public.e(),
            Self::Exponent(exponent) => {
                let modulus = public.n();
                let witness = BigUint::from(2u8);
                if *modulus <= witness {
                    return false;
                }
                let exponent = BigUint::from_bytes_be(exponent);
                let sealed = witness.modpow(public.e(), modulus);
                sealed.modpow(&exponent, modulus) == witness
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(key) => formatter
                .debug_struct("PrivateKey::Full")
                .field("bits", &key.n().bits())
                .finish_non_exhaustive(),
            Self::Exponent(_) => formatter
                .debug_struct("PrivateKey::Exponent")
                .finish_non_exhaustive(),
        }
    }
}

/// A private key paired with the public key the node announces.
#[derive(Debug)]
pub struct Keypair {
    private: PrivateKey,
    public: PublicKey,
}

impl Keypair {
    /// Pairs the keys, refusing a private key that cannot decrypt for
    /// `public`.
    pub fn new(name: &str, private: PrivateKey, public: PublicKey) -> Result<Self, CredentialError> {
        if private.matches(public.as_rsa()) {
            Ok(Self { private, public })
        } else {
            Err(CredentialError::KeyMismatch {
                name: name.to_owned(),
            })
        }
    }

    /// Private half.
    #[must_use]
    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    /// Public half.
    #[must_use]
    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

fn decode_hex(setting: &'static str, text: &str) -> Result<Zeroizing<Vec<u8>>, CredentialError> {
    let text = text.trim();
    let padded = if text.len() % 2 == 1 {
        Zeroizing::new(format!("0{text}"))
    } else {
        Zeroizing::new(text.to_owned())
    };
    hex::decode(padded.as_str())
        .map(Zeroizing::new)
        .map_err(|error| CredentialError::InlineKey {
            setting,
            reason: error.to_string(),
        })
}
