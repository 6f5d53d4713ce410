mod geo_database;
mod reverse_dns;

pub use geo_database::{FileLayout, GeoDatabase, GeoDatabaseProvider};
pub use reverse_dns::ReverseDnsResolver;
