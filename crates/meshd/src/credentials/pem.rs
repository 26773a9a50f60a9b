//! PEM decoders for the key encodings found on disk.

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// On-disk encodings of an RSA public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFormat {
    /// PKCS#1 `RSA PUBLIC KEY`.
    Pkcs1,
    /// SubjectPublicKeyInfo `PUBLIC KEY`.
    Spki,
}

impl PublicKeyFormat {
    /// Decoders in the order they are attempted against one file.
    pub const PROBE_ORDER: [Self; 2] = [Self::Pkcs1, Self::Spki];

    /// PEM label of the encoding.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pkcs1 => "RSA PUBLIC KEY",
            Self::Spki => "PUBLIC KEY",
        }
    }

    /// Decodes the first block of this encoding found in `text`.
    #[must_use]
    pub fn decode(self, text: &str) -> Option<RsaPublicKey> {
        let block = pem_block(text, self.label())?;
        match self {
            Self::Pkcs1 => RsaPublicKey::from_pkcs1_pem(block).ok(),
            Self::Spki => RsaPublicKey::from_public_key_pem(block).ok(),
        }
    }
}

/// Decodes a PKCS#1 private key block found in `text`.
pub fn decode_private_key(text: &str) -> Result<RsaPrivateKey, String> {
    let block = pem_block(text, PRIVATE_KEY_LABEL)
        .ok_or_else(|| format!("no '{PRIVATE_KEY_LABEL}' block found"))?;
    RsaPrivateKey::from_pkcs1_pem(block).map_err(|error| error.to_string())
}

/// Slices the `-----BEGIN label-----` .. `-----END label-----` block out of
/// surrounding text.
fn pem_block<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");
    let start = text.find(&begin)?;
    let rest = text.get(start..)?;
    let stop = rest.find(&end)? + end.len();
    rest.get(..stop)
}
