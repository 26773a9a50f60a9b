//! Closed tables of the symmetric ciphers and digests the daemon accepts.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Block ciphers usable on the data channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Cipher {
    /// Blowfish, CBC mode.
    #[strum(serialize = "bf-cbc")]
    BlowfishCbc,
    /// Blowfish, CFB mode.
    #[strum(serialize = "bf-cfb")]
    BlowfishCfb,
    /// Blowfish, OFB mode.
    #[strum(serialize = "bf-ofb")]
    BlowfishOfb,
    /// AES-128, CBC mode.
    #[strum(serialize = "aes-128-cbc")]
    Aes128Cbc,
    /// AES-128, CFB mode.
    #[strum(serialize = "aes-128-cfb")]
    Aes128Cfb,
    /// AES-128, OFB mode.
    #[strum(serialize = "aes-128-ofb")]
    Aes128Ofb,
    /// AES-192, CBC mode.
    #[strum(serialize = "aes-192-cbc")]
    Aes192Cbc,
    /// AES-256, CBC mode.
    #[strum(serialize = "aes-256-cbc")]
    Aes256Cbc,
    /// AES-256, CFB mode.
    #[strum(serialize = "aes-256-cfb")]
    Aes256Cfb,
    /// AES-256, OFB mode.
    #[strum(serialize = "aes-256-ofb")]
    Aes256Ofb,
    /// Three-key triple DES, CBC mode.
    #[strum(serialize = "des-ede3-cbc")]
    TripleDesCbc,
    /// Camellia-256, CBC mode.
    #[strum(serialize = "camellia-256-cbc")]
    Camellia256Cbc,
}

impl Cipher {
    /// Cipher used when none is configured.
    pub const DEFAULT: Self = Self::BlowfishCbc;

    /// Key length in bytes.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::BlowfishCbc
            | Self::BlowfishCfb
            | Self::BlowfishOfb
            | Self::Aes128Cbc
            | Self::Aes128Cfb
            | Self::Aes128Ofb => 16,
            Self::Aes192Cbc | Self::TripleDesCbc => 24,
            Self::Aes256Cbc | Self::Aes256Cfb | Self::Aes256Ofb | Self::Camellia256Cbc => 32,
        }
    }

    /// Initialisation vector length in bytes.
    #[must_use]
    pub const fn iv_len(self) -> usize {
        match self {
            Self::BlowfishCbc | Self::BlowfishCfb | Self::BlowfishOfb | Self::TripleDesCbc => 8,
            Self::Aes128Cbc
            | Self::Aes128Cfb
            | Self::Aes128Ofb
            | Self::Aes192Cbc
            | Self::Aes256Cbc
            | Self::Aes256Cfb
            | Self::Aes256Ofb
            | Self::Camellia256Cbc => 16,
        }
    }
}

/// Message digests usable for packet authentication.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Digest {
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// RIPEMD-160.
    Ripemd160,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl Digest {
    /// Digest used when none is configured.
    pub const DEFAULT: Self = Self::Sha1;

    /// Digest output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 | Self::Ripemd160 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn cipher_names_round_trip() {
        for cipher in Cipher::iter() {
            let name: &'static str = cipher.into();
            assert_eq!(name.parse::<Cipher>().expect("known name"), cipher);
        }
    }

    #[rstest]
    #[case("AES-256-CBC", Cipher::Aes256Cbc, 48)]
    #[case("bf-cbc", Cipher::BlowfishCbc, 24)]
    #[case("des-ede3-cbc", Cipher::TripleDesCbc, 32)]
    fn key_material_covers_key_and_iv(
        #[case] name: &str,
        #[case] expected: Cipher,
        #[case] material: usize,
    ) {
        let cipher: Cipher = name.parse().expect("known cipher");
        assert_eq!(cipher, expected);
        assert_eq!(cipher.key_len() + cipher.iv_len(), material);
    }

    #[rstest]
    #[case("sha1", 20)]
    #[case("SHA512", 64)]
    #[case("ripemd160", 20)]
    fn digest_sizes(#[case] name: &str, #[case] size: usize) {
        assert_eq!(name.parse::<Digest>().expect("known digest").output_len(), size);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!("rot13".parse::<Cipher>().is_err());
        assert!("crc32".parse::<Digest>().is_err());
    }
}
