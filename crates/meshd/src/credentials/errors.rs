//! Error surface for key acquisition.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Why a key path failed the safety predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsafeReason {
    /// The path walks upwards with a `..` component.
    #[error("path contains a '..' component")]
    ParentTraversal,
    /// The final path component is a symbolic link.
    #[error("path is a symbolic link")]
    Symlink,
    /// The path names a directory, device or other non-regular file.
    #[error("path is not a regular file")]
    NotRegularFile,
    /// Someone other than the owner may rewrite the key.
    #[error("file mode {mode:o} allows group or world writes")]
    Writable {
        /// Permission bits of the file.
        mode: u32,
    },
    /// A directory on the way to the key is a symbolic link not owned by root.
    #[error("directory '{ancestor}' is a symbolic link")]
    SymlinkedAncestor {
        /// Offending directory.
        ancestor: Utf8PathBuf,
    },
    /// A directory on the way to the key lets others swap its entries.
    #[error("directory '{ancestor}' has mode {mode:o} and allows group or world writes")]
    WritableAncestor {
        /// Offending directory.
        ancestor: Utf8PathBuf,
        /// Permission bits of the directory.
        mode: u32,
    },
    /// File metadata could not be read for a reason other than absence.
    #[error("file metadata is unavailable ({kind})")]
    Uninspectable {
        /// Kind of the underlying IO failure.
        kind: io::ErrorKind,
    },
}

/// A key file was refused before any attempt to open it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("refusing to use key file '{path}': {reason}")]
pub struct UnsafePathError {
    /// Rejected path.
    pub path: Utf8PathBuf,
    /// Failed check.
    pub reason: UnsafeReason,
}

/// Errors raised while loading private or public keys.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A key file failed the safety predicate.
    #[error(transparent)]
    UnsafePath(#[from] UnsafePathError),
    /// A key file could not be read.
    #[error("failed to read key file '{path}': {source}")]
    Read {
        /// Key file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A private key file held no usable PKCS#1 key.
    #[error("reading private key file '{path}' failed: {reason}")]
    MalformedPrivateKey {
        /// Key file path.
        path: Utf8PathBuf,
        /// Decoder diagnostic.
        reason: String,
    },
    /// A configured public key file held neither supported encoding.
    #[error("reading public key file '{path}' failed: no PKCS#1 or SPKI block found")]
    MalformedPublicKey {
        /// Key file path.
        path: Utf8PathBuf,
    },
    /// An inline hex key value could not be decoded.
    #[error("invalid inline {setting}: {reason}")]
    InlineKey {
        /// Setting carrying the value.
        setting: &'static str,
        /// Decoder diagnostic.
        reason: String,
    },
    /// Every public key source for a node was exhausted.
    #[error("no public key for '{name}' specified")]
    MissingPublicKey {
        /// Node whose key was requested.
        name: String,
    },
    /// The private key does not belong to the node's announced public key.
    #[error("private key does not match the public key of '{name}'")]
    KeyMismatch {
        /// Local node name.
        name: String,
    },
}
