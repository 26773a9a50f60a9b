use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the daemon forwards packets between the device and peers.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoutingMode {
    /// Route by IP subnet ownership.
    #[default]
    Router,
    /// Learn and route by MAC address.
    Switch,
    /// Broadcast every packet to every peer.
    Hub,
}

/// Address families the daemon listens on and resolves peers with.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum AddressFamily {
    /// Both IPv4 and IPv6.
    #[default]
    #[strum(serialize = "any")]
    #[serde(rename = "any")]
    Any,
    /// IPv4 only.
    #[strum(serialize = "IPv4")]
    #[serde(rename = "IPv4")]
    Ipv4,
    /// IPv6 only.
    #[strum(serialize = "IPv6")]
    #[serde(rename = "IPv6")]
    Ipv6,
}

/// Errors encountered while parsing a [`RoutingMode`] or [`AddressFamily`].
pub type ModeParseError = strum::ParseError;
