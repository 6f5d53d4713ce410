mod hickory_reverse_dns;
mod ip2location_provider;
mod maxmind_provider;

pub use hickory_reverse_dns::HickoryReverseDns;
pub use ip2location_provider::{Ip2LocationDatabase, Ip2LocationProvider};
pub use maxmind_provider::{MaxMindDatabase, MaxMindProvider};
