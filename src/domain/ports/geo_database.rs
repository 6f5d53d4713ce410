//! Geolocation Database Port
//!
//! Defines the interface to the external binary geolocation database reader.

use crate::domain::entities::GeoFields;
use crate::domain::errors::LookupError;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// How a provider's data files are named on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLayout {
    /// One file per family: the IPv6 file ends with `ipv6_suffix`, the IPv4
    /// file ends with `generic_suffix` but not with `ipv6_suffix`.
    PerFamily {
        ipv6_suffix: &'static str,
        generic_suffix: &'static str,
    },
    /// One file ending with `suffix` covers both families.
    DualStack { suffix: &'static str },
}

/// Opens database files.
///
/// This is an outbound port. Implementations may wrap IP2Location,
/// MaxMind, or any other reader.
pub trait GeoDatabaseProvider: Send + Sync {
    /// Provider name (for logs).
    fn name(&self) -> &'static str;

    /// File naming scheme used by discovery.
    fn layout(&self) -> FileLayout;

    /// Open the database at `path`.
    fn open(&self, path: &Path) -> Result<Arc<dyn GeoDatabase>, LookupError>;
}

/// An opened database handle.
pub trait GeoDatabase: Send + Sync {
    /// Query the record for `ip`.
    ///
    /// Returns `Ok(None)` when the database has no record for the address.
    fn query(&self, ip: IpAddr) -> Result<Option<GeoFields>, LookupError>;
}
