//! MaxMind Database Provider
//!
//! Implements GeoDatabaseProvider using MaxMind GeoLite2/GeoIP2 City
//! databases. One `.mmdb` file answers both address families.

use crate::domain::entities::GeoFields;
use crate::domain::errors::LookupError;
use crate::domain::ports::{FileLayout, GeoDatabase, GeoDatabaseProvider};
use crate::domain::services::data_file_locator::MMDB_SUFFIX;
use maxminddb::{MaxMindDBError, Reader};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// Opens MaxMind `.mmdb` databases.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxMindProvider;

impl MaxMindProvider {
    pub fn new() -> Self {
        Self
    }
}

impl GeoDatabaseProvider for MaxMindProvider {
    fn name(&self) -> &'static str {
        "MaxMind"
    }

    fn layout(&self) -> FileLayout {
        FileLayout::DualStack {
            suffix: MMDB_SUFFIX,
        }
    }

    fn open(&self, path: &Path) -> Result<Arc<dyn GeoDatabase>, LookupError> {
        let reader = Reader::open_readfile(path).map_err(|e| LookupError::DatabaseOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            "opened MaxMind database {} ({})",
            path.display(),
            reader.metadata.database_type
        );
        Ok(Arc::new(MaxMindDatabase { reader }))
    }
}

/// An open MaxMind database.
pub struct MaxMindDatabase {
    reader: Reader<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
struct Names {
    names: Option<BTreeMap<String, String>>,
}

impl Names {
    fn english(&self) -> String {
        self.names
            .as_ref()
            .and_then(|n| n.get("en").cloned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Country {
    iso_code: Option<String>,
    names: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct Location {
    latitude: Option<f64>,
    longitude: Option<f64>,
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Postal {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CityResp {
    country: Option<Country>,
    city: Option<Names>,
    subdivisions: Option<Vec<Names>>,
    location: Option<Location>,
    postal: Option<Postal>,
}

impl From<CityResp> for GeoFields {
    fn from(resp: CityResp) -> Self {
        let (country_short, country_long) = resp
            .country
            .map(|c| {
                let long = c
                    .names
                    .as_ref()
                    .and_then(|n| n.get("en").cloned())
                    .unwrap_or_default();
                (c.iso_code.unwrap_or_default(), long)
            })
            .unwrap_or_default();

        let region = resp
            .subdivisions
            .as_ref()
            .and_then(|s| s.first())
            .map(Names::english)
            .unwrap_or_default();

        let city = resp.city.as_ref().map(Names::english).unwrap_or_default();

        let (latitude, longitude, timezone) = resp
            .location
            .map(|l| {
                (
                    l.latitude.unwrap_or_default() as f32,
                    l.longitude.unwrap_or_default() as f32,
                    l.time_zone.unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        GeoFields {
            country_short,
            country_long,
            region,
            city,
            latitude,
            longitude,
            zipcode: resp.postal.and_then(|p| p.code).unwrap_or_default(),
            timezone,
            // GeoIP2 City has no elevation data
            elevation: 0.0,
        }
    }
}

impl GeoDatabase for MaxMindDatabase {
    fn query(&self, ip: IpAddr) -> Result<Option<GeoFields>, LookupError> {
        match self.reader.lookup::<CityResp>(ip) {
            Ok(resp) => Ok(Some(resp.into())),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(LookupError::Query {
                address: ip,
                reason: e.to_string(),
            }),
        }
    }
}
