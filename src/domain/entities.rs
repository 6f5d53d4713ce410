//! Domain Entities - Core business objects
//!
//! `GeoFields` is what a database returns for one address. `LocationRecord`
//! is what a lookup hands back to the caller: the geo fields merged with the
//! reverse-DNS hostnames.

use crate::domain::value_objects::AddressFamily;
use serde::{Deserialize, Serialize};

/// Geographic attributes returned by a database query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoFields {
    /// Country code (ISO 3166-1 alpha-2)
    pub country_short: String,
    /// Country full name
    pub country_long: String,
    pub region: String,
    pub city: String,
    pub latitude: f32,
    pub longitude: f32,
    pub zipcode: String,
    /// Timezone as stored by the database (e.g. "-07:00" or "America/Denver")
    pub timezone: String,
    /// Meters above sea level
    pub elevation: f32,
}

/// Result of resolving one address.
///
/// `LocationRecord::default()` is the zero record returned on failure.
/// An all-empty record means "not found or failed", never a real location
/// at 0,0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// The queried address, exactly as the caller passed it
    pub address: String,
    /// Reverse-DNS names joined with the configured separator
    pub hostname: String,
    /// Reverse-DNS names in resolver order
    pub hostnames: Vec<String>,
    pub family: Option<AddressFamily>,
    pub country_short: String,
    pub country_long: String,
    pub region: String,
    pub city: String,
    pub latitude: f32,
    pub longitude: f32,
    pub zipcode: String,
    pub timezone: String,
    pub elevation: f32,
}

impl LocationRecord {
    /// Merge database fields and reverse-DNS names into a record.
    pub fn merge(
        address: &str,
        family: AddressFamily,
        fields: GeoFields,
        hostnames: Vec<String>,
        separator: &str,
    ) -> Self {
        Self {
            address: address.to_string(),
            hostname: hostnames.join(separator),
            hostnames,
            family: Some(family),
            country_short: fields.country_short,
            country_long: fields.country_long,
            region: fields.region,
            city: fields.city,
            latitude: fields.latitude,
            longitude: fields.longitude,
            zipcode: fields.zipcode,
            timezone: fields.timezone,
            elevation: fields.elevation,
        }
    }

    /// True for the zero record.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Address: {}", self.address)?;
        writeln!(f, "Hostname: {}", self.hostname)?;
        writeln!(
            f,
            "Type: {}",
            self.family.map(|fam| fam.as_str()).unwrap_or_default()
        )?;
        writeln!(f, "Country_short: {}", self.country_short)?;
        writeln!(f, "Country_long: {}", self.country_long)?;
        writeln!(f, "Region: {}", self.region)?;
        writeln!(f, "City: {}", self.city)?;
        writeln!(f, "Latitude: {:.6}", self.latitude)?;
        writeln!(f, "Longitude: {:.6}", self.longitude)?;
        writeln!(f, "Zipcode: {}", self.zipcode)?;
        writeln!(f, "Timezone: {}", self.timezone)?;
        writeln!(f, "Elevation: {:.6}", self.elevation)
    }
}
