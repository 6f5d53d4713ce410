//! Domain Layer
//!
//! Entities, value objects, ports and the data file locator. Nothing here
//! depends on a concrete database reader or resolver.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{GeoFields, LocationRecord};
pub use errors::LookupError;
pub use services::DataFiles;
pub use value_objects::{AddressClass, AddressFamily, CountryLookup, DnsFailurePolicy};
