//! Lookup Service - Main application use case
//!
//! Orchestrates a lookup: classify the address, open the database for its
//! family, query it, reverse-resolve the hostname and merge both into a
//! `LocationRecord`.

use crate::domain::entities::{GeoFields, LocationRecord};
use crate::domain::errors::LookupError;
use crate::domain::ports::{GeoDatabase, GeoDatabaseProvider, ReverseDnsResolver};
use crate::domain::services::{discover, DataFiles};
use crate::domain::value_objects::{
    parse_address, AddressClass, AddressFamily, CountryLookup, DnsFailurePolicy,
};
use crate::infrastructure::HandlePool;
use parking_lot::RwLock;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::sync::Arc;

/// Tunables for how lookups merge their results.
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// What to do with geo fields when reverse DNS fails
    pub dns_failure_policy: DnsFailurePolicy,
    /// Separator used to join multiple PTR names into `hostname`
    pub hostname_separator: String,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            dns_failure_policy: DnsFailurePolicy::default(),
            hostname_separator: ".".to_string(),
        }
    }
}

/// Lookup service - main application use case.
///
/// Owns the data file configuration behind a read-write lock, so lookups
/// and reconfiguration can run from different threads.
pub struct LookupService {
    provider: Arc<dyn GeoDatabaseProvider>,
    reverse_dns: Arc<dyn ReverseDnsResolver>,
    data_files: RwLock<DataFiles>,
    handles: Option<HandlePool>,
    options: LookupOptions,
}

impl LookupService {
    /// Create an unconfigured service. Call [`configure`](Self::configure)
    /// before resolving.
    pub fn new(
        provider: Arc<dyn GeoDatabaseProvider>,
        reverse_dns: Arc<dyn ReverseDnsResolver>,
        options: LookupOptions,
    ) -> Self {
        Self {
            provider,
            reverse_dns,
            data_files: RwLock::new(DataFiles::default()),
            handles: None,
            options,
        }
    }

    /// Reuse opened database handles through `pool` instead of opening the
    /// file on every lookup.
    pub fn with_handle_pool(mut self, pool: HandlePool) -> Self {
        self.handles = Some(pool);
        self
    }

    /// Point the service at a data directory and discover its files.
    ///
    /// On failure the service is left configured with the directory and no
    /// files, so later lookups fail with a configuration error.
    pub fn configure(&self, directory: impl AsRef<Path>) -> Result<DataFiles, LookupError> {
        let directory = directory.as_ref();
        let result = discover(directory, &self.provider.layout());

        let files = match &result {
            Ok(files) => files.clone(),
            Err(e) => {
                tracing::warn!("data file discovery failed: {}", e);
                DataFiles::unconfigured(directory)
            }
        };

        self.replace_data_files(files);

        if let Ok(files) = &result {
            tracing::info!(
                "{} data files configured from {}: ipv4={:?} ipv6={:?}",
                self.provider.name(),
                directory.display(),
                files.ipv4,
                files.ipv6
            );
        }
        result
    }

    /// Use explicitly named data files instead of discovering them.
    pub fn set_data_files(&self, files: DataFiles) {
        self.replace_data_files(files);
    }

    // The pool is cleared under the write lock so that no lookup can pair
    // the new files with the old pool generation.
    fn replace_data_files(&self, files: DataFiles) {
        let mut current = self.data_files.write();
        *current = files;
        if let Some(pool) = &self.handles {
            pool.clear();
        }
    }

    /// Snapshot of the current data file configuration.
    pub fn data_files(&self) -> DataFiles {
        self.data_files.read().clone()
    }

    /// Look up the country code of a textual address.
    ///
    /// Loopback and private addresses return `CountryLookup::Loopback` and
    /// `CountryLookup::Private` without touching the database. A public
    /// address with no database record yields an empty code.
    pub fn lookup_country(&self, address: &str) -> Result<CountryLookup, LookupError> {
        let ip = parse_address(address)?;
        self.lookup_country_ip(ip)
    }

    /// Look up the country code of a parsed address.
    pub fn lookup_country_ip(&self, ip: IpAddr) -> Result<CountryLookup, LookupError> {
        match AddressClass::of(ip) {
            AddressClass::Loopback => Ok(CountryLookup::Loopback),
            AddressClass::Private => Ok(CountryLookup::Private),
            AddressClass::Public(family) => {
                let fields = self.query(family, ip.to_canonical())?;
                Ok(CountryLookup::Code(
                    fields.map(|f| f.country_short).unwrap_or_default(),
                ))
            }
        }
    }

    /// Resolve an address, returning the zero record on any failure.
    ///
    /// Failures are logged. Use [`try_resolve`](Self::try_resolve) to tell
    /// "no data" apart from "lookup failed".
    pub fn resolve(&self, address: &str) -> LocationRecord {
        match self.try_resolve(address) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("no location record for {}", address);
                LocationRecord::default()
            }
            Err(e) => {
                tracing::warn!(stage = e.stage(), "lookup for {:?} failed: {}", address, e);
                LocationRecord::default()
            }
        }
    }

    /// Resolve an address.
    ///
    /// Returns `Ok(None)` when the database has no record for the address.
    /// The record's `address` is `address` exactly as given.
    pub fn try_resolve(&self, address: &str) -> Result<Option<LocationRecord>, LookupError> {
        let ip = parse_address(address)?;
        match ip.to_canonical() {
            IpAddr::V4(v4) => self.resolve_v4(address, v4),
            IpAddr::V6(v6) => self.resolve_v6(address, v6),
        }
    }

    /// Resolve an address against the IPv4 database.
    pub fn resolve_v4(&self, address: &str, ip: Ipv4Addr) -> Result<Option<LocationRecord>, LookupError> {
        self.resolve_family(address, AddressFamily::Ipv4, IpAddr::V4(ip))
    }

    /// Resolve an address against the IPv6 database.
    pub fn resolve_v6(&self, address: &str, ip: Ipv6Addr) -> Result<Option<LocationRecord>, LookupError> {
        self.resolve_family(address, AddressFamily::Ipv6, IpAddr::V6(ip))
    }

    fn resolve_family(
        &self,
        address: &str,
        family: AddressFamily,
        ip: IpAddr,
    ) -> Result<Option<LocationRecord>, LookupError> {
        let Some(fields) = self.query(family, ip)? else {
            return Ok(None);
        };

        let hostnames = match self.reverse_dns.reverse_lookup(ip) {
            Ok(names) => names,
            Err(e) => match self.options.dns_failure_policy {
                DnsFailurePolicy::Discard => return Err(e),
                DnsFailurePolicy::KeepGeo => {
                    tracing::warn!("keeping geo data for {} without hostname: {}", address, e);
                    Vec::new()
                }
            },
        };

        Ok(Some(LocationRecord::merge(
            address,
            family,
            fields,
            hostnames,
            &self.options.hostname_separator,
        )))
    }

    /// Open the database for `family` and query it.
    fn query(&self, family: AddressFamily, ip: IpAddr) -> Result<Option<GeoFields>, LookupError> {
        let db = self.open(family)?;
        let fields = db.query(ip)?;
        tracing::debug!(
            "{} {} query for {}: {}",
            self.provider.name(),
            family,
            ip,
            if fields.is_some() { "hit" } else { "miss" }
        );
        Ok(fields)
    }

    fn open(&self, family: AddressFamily) -> Result<Arc<dyn GeoDatabase>, LookupError> {
        let (path, generation) = {
            let files = self.data_files.read();
            let path = files.path_for(family).ok_or_else(|| {
                LookupError::Configuration(format!(
                    "no {} database found in {:?}",
                    family,
                    files.directory
                ))
            })?;
            (path, self.handles.as_ref().map(HandlePool::generation))
        };

        match (&self.handles, generation) {
            (Some(pool), Some(generation)) => {
                pool.get_or_open(&path, generation, |p| self.provider.open(p))
            }
            _ => self.provider.open(&path),
        }
    }
}
