//! Control- and data-channel listening sockets.
//!
//! The bind address is resolved into candidate addresses and each candidate
//! gets a TCP listener plus a UDP socket on the same address. A candidate is
//! only kept when both sockets open.

mod errors;
mod resolver;
mod sockets;

use std::net::{SocketAddr, TcpListener, UdpSocket};

use mesh_config::AddressFamily;
use tracing::{debug, info};

pub use self::errors::{CandidateError, ListenerError};
pub use self::resolver::{Resolver, SystemResolver, WILDCARD, wildcard_addresses};
#[cfg(test)]
pub(crate) use self::sockets::MockSocketFactory;
pub use self::sockets::{SocketFactory, SystemSocketFactory};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::listener");

/// One address with its control-channel listener and data-channel socket.
#[derive(Debug)]
pub struct ListenEndpoint {
    address: SocketAddr,
    tcp: TcpListener,
    udp: UdpSocket,
}

impl ListenEndpoint {
    /// Address both sockets are bound to.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Control-channel listener.
    #[must_use]
    pub fn tcp(&self) -> &TcpListener {
        &self.tcp
    }

    /// Data-channel socket.
    #[must_use]
    pub fn udp(&self) -> &UdpSocket {
        &self.udp
    }

    /// Hands both sockets to the caller.
    #[must_use]
    pub fn into_parts(self) -> (TcpListener, UdpSocket) {
        (self.tcp, self.udp)
    }
}

/// The daemon's listening endpoints, in resolver order.
#[derive(Debug, Default)]
pub struct ListenerSet {
    endpoints: Vec<ListenEndpoint>,
}

impl ListenerSet {
    /// Binds every address `bind_address` resolves to using the system
    /// resolver and sockets. `None` binds the wildcard address.
    pub fn bind_all(
        bind_address: Option<&str>,
        port: &str,
        family: AddressFamily,
    ) -> Result<Self, ListenerError> {
        Self::bind_all_with(
            &SystemResolver,
            &SystemSocketFactory,
            bind_address,
            port,
            family,
        )
    }

    /// Binds every resolved address through the supplied collaborators.
    ///
    /// Candidates that fail are skipped. Resolver failures and an empty
    /// result are errors.
    pub fn bind_all_with(
        resolver: &dyn Resolver,
        factory: &dyn SocketFactory,
        bind_address: Option<&str>,
        port: &str,
        family: AddressFamily,
    ) -> Result<Self, ListenerError> {
        let port_number: u16 = port.parse().map_err(|_| ListenerError::Port {
            port: port.to_owned(),
        })?;
        let host = bind_address.unwrap_or(WILDCARD);
        let candidates = resolver
            .resolve(bind_address, port_number, family)
            .map_err(|source| ListenerError::Resolve {
                host: host.to_owned(),
                port: port_number,
                source,
            })?;
        if candidates.is_empty() {
            return Err(ListenerError::ResolveEmpty {
                host: host.to_owned(),
                port: port_number,
            });
        }

        let mut endpoints = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match open_endpoint(factory, candidate) {
                Ok(endpoint) => {
                    info!(
                        target: LISTENER_TARGET,
                        address = %endpoint.address,
                        "listening on {}",
                        endpoint.address
                    );
                    endpoints.push(endpoint);
                }
                Err(error) => debug!(
                    target: LISTENER_TARGET,
                    address = %candidate,
                    error = %error,
                    "skipping listen address"
                ),
            }
        }

        if endpoints.is_empty() {
            return Err(ListenerError::NoListeners { port: port_number });
        }
        info!(
            target: LISTENER_TARGET,
            endpoints = endpoints.len(),
            "ready"
        );
        Ok(Self { endpoints })
    }

    /// Number of open endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether no endpoint is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Open endpoints in bind order.
    pub fn iter(&self) -> impl Iterator<Item = &ListenEndpoint> {
        self.endpoints.iter()
    }

    /// Closes every endpoint and returns how many were open.
    pub fn close_all(&mut self) -> usize {
        let closed = self.endpoints.len();
        for endpoint in self.endpoints.drain(..) {
            debug!(
                target: LISTENER_TARGET,
                address = %endpoint.address,
                "closing listener"
            );
        }
        closed
    }
}

fn open_endpoint(
    factory: &dyn SocketFactory,
    candidate: SocketAddr,
) -> Result<ListenEndpoint, CandidateError> {
    let tcp = factory
        .open_tcp(candidate)
        .map_err(|source| CandidateError::Tcp {
            addr: candidate,
            source,
        })?;
    // Port 0 binds resolve here so UDP lands on the same port.
    let address = tcp.local_addr().unwrap_or(candidate);
    // `tcp` is dropped, and closed, if the UDP socket fails.
    let udp = factory
        .open_udp(address)
        .map_err(|source| CandidateError::Udp {
            addr: address,
            source,
        })?;
    Ok(ListenEndpoint { address, tcp, udp })
}
