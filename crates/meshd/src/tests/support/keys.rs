//! Deterministic RSA keys for credential tests.
//!
//! Keys are small so that generation stays fast in debug builds; they use
//! the exponent assumed for inline keys so either encoding can describe them.

use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};

use crate::credentials::INLINE_PUBLIC_EXPONENT;

const TEST_KEY_BITS: usize = 512;

static TEST_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| generate(0x6d65_7368));
static OTHER_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| generate(0x6f74_6872));

fn generate(seed: u64) -> RsaPrivateKey {
    let mut rng = StdRng::seed_from_u64(seed);
    RsaPrivateKey::new_with_exp(
        &mut rng,
        TEST_KEY_BITS,
        &BigUint::from(INLINE_PUBLIC_EXPONENT),
    )
    .expect("test key generation")
}

/// Key of the node under test.
pub fn test_private_key() -> &'static RsaPrivateKey {
    &TEST_KEY
}

/// Unrelated key, for mismatch cases.
pub fn other_private_key() -> &'static RsaPrivateKey {
    &OTHER_KEY
}

/// [`test_private_key`] as PKCS#1 PEM.
pub fn private_pkcs1_pem() -> String {
    test_private_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("encode private key")
        .to_string()
}

/// Public half of [`test_private_key`] as PKCS#1 PEM.
pub fn public_pkcs1_pem() -> String {
    test_private_key()
        .to_public_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("encode public key")
}

/// Public half of [`test_private_key`] as SubjectPublicKeyInfo PEM.
pub fn public_spki_pem() -> String {
    test_private_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode public key")
}

/// Modulus of [`test_private_key`] as hex, for an inline `PublicKey`.
pub fn modulus_hex() -> String {
    hex::encode_upper(test_private_key().n().to_bytes_be())
}

/// Private exponent of [`test_private_key`] as hex, for an inline
/// `PrivateKey`.
pub fn exponent_hex() -> String {
    hex::encode_upper(test_private_key().d().to_bytes_be())
}

/// Public half of [`other_private_key`] as PKCS#1 PEM.
pub fn other_public_pkcs1_pem() -> String {
    other_private_key()
        .to_public_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("encode public key")
}
