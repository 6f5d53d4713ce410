//! iplocate Library
//!
//! Resolves IP addresses to a geographic location and reverse-DNS hostname
//! by delegating to a binary geolocation database reader.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::outbound::{HickoryReverseDns, Ip2LocationProvider, MaxMindProvider};
pub use application::{LookupOptions, LookupService};
pub use config::{debug_logging, load_config, Config, ProviderKind};
pub use domain::entities::{GeoFields, LocationRecord};
pub use domain::errors::LookupError;
pub use domain::ports::{FileLayout, GeoDatabase, GeoDatabaseProvider, ReverseDnsResolver};
pub use domain::services::DataFiles;
pub use domain::value_objects::{AddressClass, AddressFamily, CountryLookup, DnsFailurePolicy};
pub use infrastructure::{HandlePool, PoolConfig};
