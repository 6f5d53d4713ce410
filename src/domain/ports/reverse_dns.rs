//! Reverse DNS Port

use crate::domain::errors::LookupError;
use std::net::IpAddr;

/// Maps an address to its PTR names.
pub trait ReverseDnsResolver: Send + Sync {
    /// Blocking reverse lookup. Returns zero or more hostnames in resolver
    /// order.
    fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, LookupError>;
}
