//! Bind address resolution.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};

use mesh_config::AddressFamily;

/// Host value standing for every local address.
pub const WILDCARD: &str = "*";

/// Turns a bind address into candidate socket addresses.
pub trait Resolver {
    /// Resolves `host` (or the wildcard when `None`) for `port`, keeping only
    /// addresses of `family`. Order is preserved.
    fn resolve(
        &self,
        host: Option<&str>,
        port: u16,
        family: AddressFamily,
    ) -> io::Result<Vec<SocketAddr>>;
}

/// Resolver backed by the system's name service.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(
        &self,
        host: Option<&str>,
        port: u16,
        family: AddressFamily,
    ) -> io::Result<Vec<SocketAddr>> {
        match host {
            None | Some(WILDCARD) => Ok(wildcard_addresses(port, family)),
            Some(host) => Ok((host, port)
                .to_socket_addrs()?
                .filter(|addr| matches_family(addr, family))
                .collect()),
        }
    }
}

/// Unspecified addresses for `family`, IPv4 first.
#[must_use]
pub fn wildcard_addresses(port: u16, family: AddressFamily) -> Vec<SocketAddr> {
    let v4 = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let v6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
    match family {
        AddressFamily::Any => vec![v4, v6],
        AddressFamily::Ipv4 => vec![v4],
        AddressFamily::Ipv6 => vec![v6],
    }
}

fn matches_family(addr: &SocketAddr, family: AddressFamily) -> bool {
    match family {
        AddressFamily::Any => true,
        AddressFamily::Ipv4 => addr.is_ipv4(),
        AddressFamily::Ipv6 => addr.is_ipv6(),
    }
}
