//! IP2Location Database Provider
//!
//! Implements GeoDatabaseProvider for IP2Location `.BIN` files, one file per
//! address family.
//!
//! The `ip2location` reader indexes its memory map without bounds checks, so
//! a truncated or corrupt file makes it panic. Files shorter than the header
//! are rejected up front, and reader panics are turned into errors.

use crate::domain::entities::GeoFields;
use crate::domain::errors::LookupError;
use crate::domain::ports::{FileLayout, GeoDatabase, GeoDatabaseProvider};
use crate::domain::services::data_file_locator::{BIN_SUFFIX, IPV6_BIN_SUFFIX};
use ip2location::{LocationRecord, Record, DB};
use std::net::IpAddr;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// Size of the fixed BIN header (type, column, date, counts, addresses,
/// product and license codes, database size).
const BIN_HEADER_LEN: u64 = 35;

/// Opens IP2Location BIN databases.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ip2LocationProvider;

impl Ip2LocationProvider {
    pub fn new() -> Self {
        Self
    }
}

impl GeoDatabaseProvider for Ip2LocationProvider {
    fn name(&self) -> &'static str {
        "IP2Location"
    }

    fn layout(&self) -> FileLayout {
        FileLayout::PerFamily {
            ipv6_suffix: IPV6_BIN_SUFFIX,
            generic_suffix: BIN_SUFFIX,
        }
    }

    fn open(&self, path: &Path) -> Result<Arc<dyn GeoDatabase>, LookupError> {
        let open_error = |reason: String| LookupError::DatabaseOpen {
            path: path.to_path_buf(),
            reason,
        };

        let len = std::fs::metadata(path)
            .map_err(|e| open_error(e.to_string()))?
            .len();
        if len < BIN_HEADER_LEN {
            return Err(open_error(format!(
                "file is {len} bytes, shorter than the {BIN_HEADER_LEN}-byte BIN header"
            )));
        }

        let db = panic::catch_unwind(|| DB::from_file(path))
            .map_err(|_| open_error("reader panicked on a malformed header".to_string()))?
            .map_err(|e| open_error(e.to_string()))?;

        tracing::debug!("opened IP2Location database {}", path.display());
        Ok(Arc::new(Ip2LocationDatabase { db }))
    }
}

/// An open IP2Location BIN file.
pub struct Ip2LocationDatabase {
    db: DB,
}

impl GeoDatabase for Ip2LocationDatabase {
    fn query(&self, ip: IpAddr) -> Result<Option<GeoFields>, LookupError> {
        let query_error = |reason: String| LookupError::Query { address: ip, reason };

        // The record borrows the map, so it is converted inside the guard.
        let result = panic::catch_unwind(AssertUnwindSafe(|| match self.db.ip_lookup(ip) {
            Ok(Record::LocationDb(rec)) => Ok(Some(fields_from(&rec))),
            Ok(Record::ProxyDb(_)) => Err(query_error(
                "file is an IP2Proxy database, not a location database".to_string(),
            )),
            Err(ip2location::error::Error::RecordNotFound) => Ok(None),
            Err(e) => Err(query_error(e.to_string())),
        }));

        result.unwrap_or_else(|_| {
            Err(query_error(
                "reader panicked, database file is corrupt".to_string(),
            ))
        })
    }
}

/// Map an IP2Location record onto the geo fields. Columns the database
/// edition does not carry come back as `None` and map to empty values.
fn fields_from(rec: &LocationRecord<'_>) -> GeoFields {
    let (country_short, country_long) = rec
        .country
        .as_ref()
        .map(|c| (c.short_name.to_string(), c.long_name.to_string()))
        .unwrap_or_default();

    GeoFields {
        country_short,
        country_long,
        region: text(rec.region.as_deref()),
        city: text(rec.city.as_deref()),
        latitude: rec.latitude.unwrap_or_default(),
        longitude: rec.longitude.unwrap_or_default(),
        zipcode: text(rec.zip_code.as_deref()),
        timezone: text(rec.time_zone.as_deref()),
        elevation: rec
            .elevation
            .as_deref()
            .and_then(|e| e.trim().parse().ok())
            .unwrap_or_default(),
    }
}

fn text(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_default()
}
