//! Subnet specifications owned by mesh nodes.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{Ipv4Net, Ipv6Net};
use thiserror::Error;

/// Ethernet hardware address, used by `Subnet` entries in switch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Builds an address from raw octets.
    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Raw octets.
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    fn parse(input: &str) -> Option<Self> {
        let mut octets = [0u8; 6];
        let mut parts = input.split(':');
        for octet in &mut octets {
            let part = parts.next()?;
            if part.is_empty() || part.len() > 2 {
                return None;
            }
            *octet = u8::from_str_radix(part, 16).ok()?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, f] = self.0;
        write!(formatter, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{f:02x}")
    }
}

/// A network range (or hardware address) a node claims ownership of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubnetSpec {
    /// A single Ethernet address.
    Mac(MacAddress),
    /// An IPv4 network.
    Ipv4(Ipv4Net),
    /// An IPv6 network.
    Ipv6(Ipv6Net),
}

/// Reasons a subnet string is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubnetParseError {
    /// The address part was neither a MAC nor an IP address.
    #[error("'{0}' is not a MAC, IPv4 or IPv6 address")]
    Address(String),
    /// The prefix length was not a number or too long for the family.
    #[error("invalid prefix length '{0}'")]
    Prefix(String),
    /// Bits beyond the prefix length were set in the address.
    #[error("network address and prefix length do not match")]
    HostBits,
    /// A prefix was given for a MAC address.
    #[error("MAC addresses do not take a prefix length")]
    MacPrefix,
}

impl FromStr for SubnetSpec {
    type Err = SubnetParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (address, prefix) = match input.split_once('/') {
            Some((address, prefix)) => (address, Some(prefix)),
            None => (input, None),
        };

        if let Some(mac) = MacAddress::parse(address) {
            return match prefix {
                Some(_) => Err(SubnetParseError::MacPrefix),
                None => Ok(Self::Mac(mac)),
            };
        }

        let ip: IpAddr = address
            .parse()
            .map_err(|_| SubnetParseError::Address(address.to_owned()))?;
        let max = match ip {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        let length = match prefix {
            Some(text) => text
                .parse::<u8>()
                .ok()
                .filter(|length| *length <= max)
                .ok_or_else(|| SubnetParseError::Prefix(text.to_owned()))?,
            None => max,
        };

        let subnet = match ip {
            IpAddr::V4(v4) => {
                let net = Ipv4Net::new(v4, length)
                    .map_err(|_| SubnetParseError::Prefix(length.to_string()))?;
                if net.trunc() != net {
                    return Err(SubnetParseError::HostBits);
                }
                Self::Ipv4(net)
            }
            IpAddr::V6(v6) => {
                let net = Ipv6Net::new(v6, length)
                    .map_err(|_| SubnetParseError::Prefix(length.to_string()))?;
                if net.trunc() != net {
                    return Err(SubnetParseError::HostBits);
                }
                Self::Ipv6(net)
            }
        };
        Ok(subnet)
    }
}

impl fmt::Display for SubnetSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mac(mac) => fmt::Display::fmt(mac, formatter),
            Self::Ipv4(net) => fmt::Display::fmt(net, formatter),
            Self::Ipv6(net) => fmt::Display::fmt(net, formatter),
        }
    }
}
