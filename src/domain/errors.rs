//! Lookup Errors
//!
//! One variant per stage of a lookup that can fail.

use std::net::IpAddr;
use std::path::PathBuf;

/// Errors produced while configuring or running a lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// The input is empty or not an IPv4/IPv6 address.
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// The data directory is unreadable or has no file for the family.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to open database {}: {reason}", path.display())]
    DatabaseOpen { path: PathBuf, reason: String },

    #[error("database query for {address} failed: {reason}")]
    Query { address: IpAddr, reason: String },

    #[error("reverse DNS lookup for {address} failed: {reason}")]
    ReverseDns { address: IpAddr, reason: String },
}

impl LookupError {
    /// Short name of the stage that failed, used in log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "validate",
            Self::Configuration(_) => "configure",
            Self::DatabaseOpen { .. } => "open",
            Self::Query { .. } => "query",
            Self::ReverseDns { .. } => "reverse_dns",
        }
    }
}
