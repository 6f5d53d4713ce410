//! Value Objects - Immutable domain primitives
//!
//! Address classification and the small enums that steer a lookup.

use crate::domain::errors::LookupError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP address family of a queried address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Family of an address. IPv4-mapped IPv6 addresses count as IPv4.
    pub fn of(ip: &IpAddr) -> Self {
        match ip.to_canonical() {
            IpAddr::V4(_) => Self::Ipv4,
            IpAddr::V6(_) => Self::Ipv6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying an address before any database is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressClass {
    /// 127.0.0.0/8 or ::1
    Loopback,
    /// RFC 1918 IPv4 ranges or IPv6 unique local (fc00::/7)
    Private,
    /// Anything else, routed to the database for its family
    Public(AddressFamily),
}

impl AddressClass {
    /// Classify an address. Loopback wins over private, private over public.
    pub fn of(ip: IpAddr) -> Self {
        let ip = ip.to_canonical();
        if ip.is_loopback() {
            return Self::Loopback;
        }
        let private = match ip {
            IpAddr::V4(v4) => is_private_v4(&v4),
            IpAddr::V6(v6) => is_unique_local_v6(&v6),
        };
        if private {
            Self::Private
        } else {
            Self::Public(AddressFamily::of(&ip))
        }
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_private()
}

fn is_unique_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

/// Parse a textual address. Empty and malformed input are rejected.
pub fn parse_address(address: &str) -> Result<IpAddr, LookupError> {
    address
        .parse::<IpAddr>()
        .map_err(|_| LookupError::InvalidAddress(address.to_string()))
}

/// Outcome of a country lookup.
///
/// Loopback and private addresses are answered without a database query
/// and render as the sentinel strings "Loopback address" and
/// "Private address".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryLookup {
    Loopback,
    Private,
    /// ISO 3166-1 alpha-2 code as stored in the database (may be empty)
    Code(String),
}

impl CountryLookup {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Loopback => "Loopback address",
            Self::Private => "Private address",
            Self::Code(code) => code,
        }
    }
}

impl std::fmt::Display for CountryLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do with already-fetched geo fields when reverse DNS fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnsFailurePolicy {
    /// Return the geo fields with an empty hostname.
    #[default]
    KeepGeo,
    /// Fail the whole lookup and drop the geo fields.
    Discard,
}

impl DnsFailurePolicy {
    /// Parse a policy name, falling back to `KeepGeo`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "discard" | "strict" => Self::Discard,
            _ => Self::KeepGeo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepGeo => "keep-geo",
            Self::Discard => "discard",
        }
    }
}
