use mesh_config::ConfigError;
use thiserror::Error;

/// Errors raised while selecting the data-channel cipher suite.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The `Cipher` setting named an unsupported algorithm.
    #[error("unrecognized cipher type '{name}'")]
    UnknownCipher {
        /// Configured name.
        name: String,
    },
    /// The `Digest` setting named an unsupported algorithm.
    #[error("unrecognized digest type '{name}'")]
    UnknownDigest {
        /// Configured name.
        name: String,
    },
    /// `MACLength` was negative or longer than the digest output.
    #[error("MACLength must be between 0 and {max} for the configured digest, got {length}")]
    MacLength {
        /// Configured length.
        length: i64,
        /// Digest output size in bytes.
        max: usize,
    },
    /// `Compression` was outside 0..=11.
    #[error("Compression level must be between 0 and 11, got {level}")]
    Compression {
        /// Configured level.
        level: i64,
    },
    /// A suite setting could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The operating system's random source failed.
    #[error("failed to generate key material: {source}")]
    Random {
        /// Underlying RNG error.
        #[source]
        source: rand::Error,
    },
}

impl SuiteError {
    /// Name of the setting the error refers to, when there is one.
    #[must_use]
    pub fn setting(&self) -> Option<&str> {
        match self {
            Self::UnknownCipher { .. } => Some("Cipher"),
            Self::UnknownDigest { .. } => Some("Digest"),
            Self::MacLength { .. } => Some("MACLength"),
            Self::Compression { .. } => Some("Compression"),
            Self::Config(error) => error.key(),
            Self::Random { .. } => None,
        }
    }
}
