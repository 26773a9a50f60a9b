//! Error types for listener setup.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that abort listener setup as a whole.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `Port` was not a decimal port number.
    #[error("invalid port '{port}': expected a number between 0 and 65535")]
    Port {
        /// Configured port text.
        port: String,
    },
    /// The resolver itself failed.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        /// Host or wildcard being resolved.
        host: String,
        /// Port being resolved.
        port: u16,
        /// Resolver diagnostic.
        #[source]
        source: io::Error,
    },
    /// Resolution produced no address of the requested family.
    #[error("no addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Host or wildcard being resolved.
        host: String,
        /// Port being resolved.
        port: u16,
    },
    /// Every candidate address failed.
    #[error("unable to create any listening socket on port {port}")]
    NoListeners {
        /// Port every candidate tried.
        port: u16,
    },
}

/// Failure of a single candidate address; logged and skipped.
#[derive(Debug, Error)]
pub enum CandidateError {
    /// The control-channel socket could not be opened.
    #[error("failed to open TCP listener at {addr}: {source}")]
    Tcp {
        /// Candidate address.
        addr: SocketAddr,
        /// Socket error.
        #[source]
        source: io::Error,
    },
    /// The data-channel socket could not be opened.
    #[error("failed to open UDP socket at {addr}: {source}")]
    Udp {
        /// Candidate address.
        addr: SocketAddr,
        /// Socket error.
        #[source]
        source: io::Error,
    },
}
